//! Chat command parsing.

/// A recognised `/command`. Anything not starting with `/` is plain text and parses to `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Journal,
    OuraRing4j,
    /// `/recherche <mot>`; only the first word is kept.
    Recherche { keyword: Option<String> },
    Organisation,
    Delete,
    Agenda,
    Exam,
    Ressenti,
    Unknown(String),
}

impl Command {
    /// Parses `/name[@botname] [args..]`. Command names are case-insensitive.
    pub fn parse(text: &str) -> Option<Self> {
        let rest = text.trim_start().strip_prefix('/')?;
        let mut words = rest.split_whitespace();
        let head = words.next().unwrap_or_default();
        let name = head
            .split_once('@')
            .map_or(head, |(name, _bot)| name)
            .to_lowercase();

        let cmd = match name.as_str() {
            "start" => Self::Start,
            "journal" => Self::Journal,
            "oura_ring_4j" => Self::OuraRing4j,
            "recherche" => Self::Recherche {
                keyword: words.next().map(str::to_string),
            },
            "organisation" => Self::Organisation,
            "delete" => Self::Delete,
            "agenda" => Self::Agenda,
            "exam" => Self::Exam,
            "ressenti" => Self::Ressenti,
            _ => Self::Unknown(name),
        };
        Some(cmd)
    }
}
