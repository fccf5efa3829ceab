//! Routes incoming chat text to handlers and tracks the one-step wizards.
//!
//! A wizard (`/agenda`, `/exam`, `/ressenti`) sends a prompt and waits for the user's
//! next plain-text message. Pending wizards live only in memory, keyed by user id.

use crate::commands::Command;
use crate::handlers::BotHandlers;
use dashmap::DashMap;

/// Which free-text input a user is being asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wizard {
    Agenda,
    Exam,
    Ressenti,
}

impl Wizard {
    pub fn prompt(&self) -> &'static str {
        match self {
            Self::Agenda => "Entrez événement: DD-MM-YYYY : description",
            Self::Exam => "Entrez examen: DD-MM-YYYY : examen",
            Self::Ressenti => "Exprimez votre ressenti :",
        }
    }
}

pub struct Dispatcher {
    handlers: BotHandlers,
    pending: DashMap<String, Wizard>,
}

impl Dispatcher {
    pub fn new(handlers: BotHandlers) -> Self {
        Self {
            handlers,
            pending: DashMap::new(),
        }
    }

    /// Wizard currently waiting on `uid`, if any.
    pub fn pending_wizard(&self, uid: &str) -> Option<Wizard> {
        self.pending.get(uid).map(|w| *w)
    }

    /// Reply to one message from `uid`, or `None` when the message gets no answer
    /// (plain text with no wizard pending, unknown command).
    pub async fn handle(&self, uid: &str, text: &str) -> Option<String> {
        match Command::parse(text) {
            Some(cmd) => self.run_command(uid, cmd).await,
            None => {
                let (_, wizard) = self.pending.remove(uid)?;
                Some(self.complete(uid, wizard, text).await)
            }
        }
    }

    async fn run_command(&self, uid: &str, cmd: Command) -> Option<String> {
        let h = &self.handlers;
        let reply = match cmd {
            Command::Start => h.start(),
            Command::Journal => h.journal(uid),
            Command::OuraRing4j => h.oura_ring().await,
            Command::Recherche { keyword } => h.recherche(uid, keyword.as_deref()),
            Command::Organisation => h.organisation(uid),
            Command::Delete => h.delete(uid),
            Command::Agenda => self.begin(uid, Wizard::Agenda),
            Command::Exam => self.begin(uid, Wizard::Exam),
            Command::Ressenti => self.begin(uid, Wizard::Ressenti),
            Command::Unknown(name) => {
                tracing::debug!(target: "coachbot::bot", uid, command = %name, "unknown command ignored");
                return None;
            }
        };
        Some(reply)
    }

    /// Starts (or replaces) the pending wizard for `uid`.
    fn begin(&self, uid: &str, wizard: Wizard) -> String {
        if let Some(previous) = self.pending.insert(uid.to_string(), wizard) {
            tracing::debug!(target: "coachbot::bot", uid, ?previous, ?wizard, "pending wizard replaced");
        }
        wizard.prompt().to_string()
    }

    async fn complete(&self, uid: &str, wizard: Wizard, text: &str) -> String {
        match wizard {
            Wizard::Agenda => self.handlers.save_agenda(uid, text),
            Wizard::Exam => self.handlers.save_exam(uid, text),
            Wizard::Ressenti => self.handlers.save_ressenti(uid, text).await,
        }
    }
}
