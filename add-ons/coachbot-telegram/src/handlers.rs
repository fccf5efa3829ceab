//! Command handlers: one method per chat command or wizard step, each returning the reply text.
//!
//! Replies are French, matching the bot's audience. Store failures are logged and answered
//! with [`STORE_FAILURE_REPLY`]; internal error text never reaches the chat.

use coachbot_core::{today_string, StoreError, UserStore};
use coachbot_skills::{DailyRecord, MetricKind, Recommender, WearableSource};
use std::sync::Arc;

pub const HELP_TEXT: &str = "/journal\n\
Affiche la liste de tous vos ressentis enregistrés dans le journal, avec la date et le texte.\n\n\
/agenda\n\
Ajoute un événement (DD-MM-YYYY : description).\n\n\
/exam\n\
Ajoute un examen (DD-MM-YYYY : examen)\n\n\
/ressenti\n\
Saisis ton ressenti actuel, tu recevras une recommandation\n\n\
/oura_ring_4j\n\
Affiche les données de sommeil des 4 derniers jours issues de votre compte Oura.\n\n\
/recherche <mot>\n\
Recherche un mot dans tous vos ressentis et affiche les entrées correspondantes.\n\n\
/organisation\n\
Affiche un résumé de votre agenda et de vos examens enregistrés.\n\n\
/delete\n\
Supprime toutes vos données personnelles enregistrées dans le bot.";

pub const STORE_FAILURE_REPLY: &str =
    "Impossible d'enregistrer vos données pour le moment, réessayez plus tard.";

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Shared collaborators of every handler.
#[derive(Clone)]
pub struct BotHandlers {
    store: Arc<UserStore>,
    wearable: Arc<dyn WearableSource>,
    coach: Arc<dyn Recommender>,
    history_days: u32,
}

impl BotHandlers {
    pub fn new(
        store: Arc<UserStore>,
        wearable: Arc<dyn WearableSource>,
        coach: Arc<dyn Recommender>,
        history_days: u32,
    ) -> Self {
        Self {
            store,
            wearable,
            coach,
            history_days,
        }
    }

    pub fn start(&self) -> String {
        HELP_TEXT.to_string()
    }

    pub fn journal(&self, uid: &str) -> String {
        let record = self.store.get_user(uid);
        if record.journal.is_empty() {
            return "Aucun ressenti.".to_string();
        }
        record
            .journal
            .iter()
            .map(|e| e.display_line())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn recherche(&self, uid: &str, keyword: Option<&str>) -> String {
        let Some(word) = keyword.map(str::trim).filter(|w| !w.is_empty()) else {
            return "Usage: /recherche mot".to_string();
        };
        let record = self.store.get_user(uid);
        let hits: Vec<String> = record
            .search_journal(word)
            .into_iter()
            .map(|e| e.display_line())
            .collect();
        if hits.is_empty() {
            "Aucun résultat.".to_string()
        } else {
            hits.join("\n")
        }
    }

    pub fn organisation(&self, uid: &str) -> String {
        let record = self.store.get_user(uid);
        format!(
            "Agenda:\n{}\nExamens:\n{}",
            record.agenda.join("\n"),
            record.exams.join("\n")
        )
    }

    pub fn delete(&self, uid: &str) -> String {
        match self.store.clear_user(uid) {
            Ok(removed) => {
                tracing::info!(target: "coachbot::bot", uid, removed, "user data cleared");
                "Toutes vos données ont été supprimées.".to_string()
            }
            Err(e) => store_failure("delete", uid, e),
        }
    }

    /// Sleep summary for the last `history_days` days, one block per day.
    pub async fn oura_ring(&self) -> String {
        let records = self
            .wearable
            .fetch_recent(MetricKind::Sleep, self.history_days)
            .await;
        if records.is_empty() {
            return "Pas de données Oura.".to_string();
        }

        let mut blocks = Vec::with_capacity(records.len() + 1);
        blocks.push(format!("📊 Données - {} derniers jours :", self.history_days));
        blocks.extend(records.iter().map(sleep_block));
        blocks.join("\n\n")
    }

    pub fn save_agenda(&self, uid: &str, text: &str) -> String {
        match self.store.append_agenda_event(uid, text) {
            Ok(()) => "Événement ajouté.".to_string(),
            Err(e) => store_failure("agenda", uid, e),
        }
    }

    pub fn save_exam(&self, uid: &str, text: &str) -> String {
        match self.store.append_exam(uid, text) {
            Ok(()) => "Examen ajouté.".to_string(),
            Err(e) => store_failure("exam", uid, e),
        }
    }

    /// Journals the mood, then asks the coach with the latest wearable day.
    pub async fn save_ressenti(&self, uid: &str, text: &str) -> String {
        if let Err(e) = self.store.append_journal_entry(uid, text, &today_string()) {
            return store_failure("ressenti", uid, e);
        }

        let (sleep, readiness, activity) = tokio::join!(
            self.wearable.latest(MetricKind::Sleep),
            self.wearable.latest(MetricKind::Readiness),
            self.wearable.latest(MetricKind::Activity),
        );
        let reco = self
            .coach
            .generate(text, &sleep, &readiness, &activity)
            .await;
        format!("Ressenti enregistré.\n\n{}", reco)
    }
}

fn sleep_block(day: &DailyRecord) -> String {
    let hours = |key: &str| day.number(key).unwrap_or(0.0) / SECONDS_PER_HOUR;
    format!(
        "📅 {}\n   ⏱ Total: {:.1}h | Deep: {:.1}h | REM: {:.1}h | Light: {:.1}h\n   ❤️ FC moy.: {} bpm | HRV: {} ms\n   🌡 Temp. Δ: {}",
        day.day().unwrap_or("?"),
        hours("total_sleep_duration"),
        hours("deep_sleep_duration"),
        hours("rem_sleep_duration"),
        hours("light_sleep_duration"),
        day.metric_text(&["average_heart_rate"]),
        day.metric_text(&["average_hrv"]),
        day.metric_text(&["readiness", "temperature_deviation"]),
    )
}

fn store_failure(action: &str, uid: &str, e: StoreError) -> String {
    tracing::error!(target: "coachbot::bot", action, uid, error = %e, "store write failed");
    STORE_FAILURE_REPLY.to_string()
}
