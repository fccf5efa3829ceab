//! Coaching recommendations from Cohere Chat v2.
//!
//! One system message fixes the coaching role; the user message carries the mood text
//! and the latest wearable scores. Failures never reach the caller: they are logged and
//! replaced by [`RECOMMENDATION_SENTINEL`].

use crate::error::{ClientInitError, CoachCallError};
use crate::oura_client::DailyRecord;
use async_trait::async_trait;
use coachbot_core::{required_env, CoreConfig, ENV_COHERE_API_KEY};
use serde::{Deserialize, Serialize};

/// Returned instead of a recommendation when the remote call fails.
pub const RECOMMENDATION_SENTINEL: &str = "Erreur";

const SYSTEM_PROMPT: &str = "Tu es un coach pour étudiants stressés.";

/// Produces a short recommendation. Never fails: failure is the sentinel string.
#[async_trait]
pub trait Recommender: Send + Sync {
    async fn generate(
        &self,
        mood: &str,
        sleep: &DailyRecord,
        readiness: &DailyRecord,
        activity: &DailyRecord,
    ) -> String;
}

/// User prompt for one recommendation. Missing metrics read `N/A`.
pub fn build_prompt(
    mood: &str,
    sleep: &DailyRecord,
    readiness: &DailyRecord,
    activity: &DailyRecord,
) -> String {
    let hrv = if readiness.lookup(&["hrv"]).is_some() {
        readiness.metric_text(&["hrv"])
    } else {
        readiness.metric_text(&["contributors", "hrv_balance"])
    };
    format!(
        "Un étudiant exprime ce ressenti : \"{mood}\"\n\n\
         Données Oura :\n\
         - Score sommeil : {sleep}\n\
         - HRV : {hrv}\n\
         - Readiness : {readiness}\n\
         - Score activité : {activity}\n\
         En te basant sur ces infos, donne des recommandations pratiques \
         sur : Organisation et gestion du temps, Activité physique régulière, \
         Techniques de relaxation, Qualité du sommeil, Aménagement environnement, \
         Pauses et micro-siestes.",
        mood = mood,
        sleep = sleep.metric_text(&["score"]),
        hrv = hrv,
        readiness = readiness.metric_text(&["score"]),
        activity = activity.metric_text(&["score"]),
    )
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

/// Cohere v2 chat client. The API key is never logged.
pub struct CohereCoach {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl CohereCoach {
    /// Client with an explicit key; model and sampling from `cfg`.
    pub fn new(api_key: impl Into<String>, cfg: &CoreConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(cfg.http_timeout())
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            api_key: api_key.into().trim().to_string(),
            base_url: cfg.cohere_base_url.trim_end_matches('/').to_string(),
            model: cfg.cohere_model.clone(),
            max_tokens: cfg.max_tokens,
            temperature: cfg.temperature,
        }
    }

    /// Build from `COHERE_API_KEY`; a missing key is a fatal init error.
    pub fn from_env(cfg: &CoreConfig) -> Result<Self, ClientInitError> {
        let key = required_env(ENV_COHERE_API_KEY)?;
        Ok(Self::new(key, cfg))
    }

    async fn chat(&self, prompt: &str) -> Result<String, CoachCallError> {
        let url = format!("{}/v2/chat", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(CoachCallError::Status {
                status,
                body: body.chars().take(200).collect(),
            });
        }

        let parsed: ChatResponse = res.json().await?;
        parsed
            .message
            .content
            .into_iter()
            .next()
            .and_then(|block| block.text)
            .map(|text| text.trim().to_string())
            .ok_or(CoachCallError::EmptyContent)
    }
}

#[async_trait]
impl Recommender for CohereCoach {
    async fn generate(
        &self,
        mood: &str,
        sleep: &DailyRecord,
        readiness: &DailyRecord,
        activity: &DailyRecord,
    ) -> String {
        let prompt = build_prompt(mood, sleep, readiness, activity);
        match self.chat(&prompt).await {
            Ok(text) => {
                tracing::debug!(target: "coachbot::coach", chars = text.len(), "recommendation generated");
                text
            }
            Err(e) => {
                tracing::warn!(target: "coachbot::coach", error = %e, "Cohere call failed, returning sentinel");
                RECOMMENDATION_SENTINEL.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: serde_json::Value) -> DailyRecord {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn prompt_embeds_mood_and_scores() {
        let prompt = build_prompt(
            "stressé par les partiels",
            &record(json!({"score": 71})),
            &record(json!({"score": 80, "hrv": 45})),
            &record(json!({"score": 90})),
        );
        assert!(
            prompt.starts_with("Un étudiant exprime ce ressenti : \"stressé par les partiels\"")
        );
        assert!(prompt.contains("- Score sommeil : 71\n"));
        assert!(prompt.contains("- HRV : 45\n"));
        assert!(prompt.contains("- Readiness : 80\n"));
        assert!(prompt.contains("- Score activité : 90\n"));
        assert!(prompt.ends_with("Pauses et micro-siestes."));
    }

    #[test]
    fn prompt_marks_missing_metrics() {
        let empty = DailyRecord::default();
        let prompt = build_prompt("ok", &empty, &empty, &empty);
        assert!(prompt.contains("- Score sommeil : N/A\n"));
        assert!(prompt.contains("- HRV : N/A\n"));
        assert!(prompt.contains("- Readiness : N/A\n"));
        assert!(prompt.contains("- Score activité : N/A\n"));
    }

    #[test]
    fn hrv_falls_back_to_contributor_balance() {
        let readiness = record(json!({"score": 77, "contributors": {"hrv_balance": 62}}));
        let prompt = build_prompt(
            "ok",
            &DailyRecord::default(),
            &readiness,
            &DailyRecord::default(),
        );
        assert!(prompt.contains("- HRV : 62\n"));
    }
}
