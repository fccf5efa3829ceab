//! **Oura Cloud v2**: sleep, readiness and daily activity for the last few days.
//!
//! `GET {base}/{sleep|readiness|daily_activity}?start_date=..&end_date=..` with a
//! bearer token; the body is `{ "data": [ ...records ] }`. Any failure (non-200,
//! transport, bad JSON) is logged and reads as "no data": callers never see an error.

use async_trait::async_trait;
use chrono::{Days, Local, NaiveDate};
use coachbot_core::{required_env, ENV_OURA_TOKEN, JOURNAL_DATE_FORMAT};
use crate::error::ClientInitError;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;

const NOT_AVAILABLE: &str = "N/A";

/// Wearable metric families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Sleep,
    Readiness,
    Activity,
}

impl MetricKind {
    /// Path segment under the `usercollection` base.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Sleep => "sleep",
            Self::Readiness => "readiness",
            Self::Activity => "daily_activity",
        }
    }
}

/// One dated record from the wearable API: metric name to numeric or textual value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct DailyRecord(pub Map<String, Value>);

impl DailyRecord {
    /// Calendar day of the record (`day`, or the older `summary_date`).
    pub fn day(&self) -> Option<&str> {
        self.0
            .get("day")
            .or_else(|| self.0.get("summary_date"))
            .and_then(Value::as_str)
    }

    /// Value at a nested path, e.g. `["readiness", "temperature_deviation"]`.
    pub fn lookup(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        rest.iter()
            .try_fold(self.0.get(*first)?, |v, key| v.get(*key))
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(Value::as_f64)
    }

    /// Display form of a metric: numbers and strings as-is, `N/A` when absent or null.
    pub fn metric_text(&self, path: &[&str]) -> String {
        match self.lookup(path) {
            None | Some(Value::Null) => NOT_AVAILABLE.to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(v) => v.to_string(),
        }
    }
}

/// Source of wearable records. Implementations never fail: no data is an empty vec.
#[async_trait]
pub trait WearableSource: Send + Sync {
    /// Records of `kind` from `days` ago through today, oldest first as returned by the API.
    async fn fetch_recent(&self, kind: MetricKind, days: u32) -> Vec<DailyRecord>;

    /// First record of the last day, or an empty record when there is none.
    async fn latest(&self, kind: MetricKind) -> DailyRecord {
        self.fetch_recent(kind, 1)
            .await
            .into_iter()
            .next()
            .unwrap_or_default()
    }
}

#[derive(Deserialize)]
struct DataEnvelope {
    #[serde(default)]
    data: Vec<DailyRecord>,
}

/// Client for the Oura `usercollection` endpoints. The token is never logged.
pub struct OuraClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl OuraClient {
    pub fn new(token: impl Into<String>, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into().trim().to_string(),
        }
    }

    /// Build from `OURA_TOKEN`; a missing token is a fatal init error.
    pub fn from_env(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ClientInitError> {
        let token = required_env(ENV_OURA_TOKEN)?;
        Ok(Self::new(token, base_url, timeout))
    }

    /// Records of `kind` between two dates (inclusive, as the API interprets them).
    pub async fn fetch_range(
        &self,
        kind: MetricKind,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<DailyRecord> {
        let url = format!("{}/{}", self.base_url, kind.endpoint());
        let start_date = start.format(JOURNAL_DATE_FORMAT).to_string();
        let end_date = end.format(JOURNAL_DATE_FORMAT).to_string();

        let res = match self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(&[("start_date", &start_date), ("end_date", &end_date)])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(target: "coachbot::oura", endpoint = kind.endpoint(), error = %e, "Oura request failed");
                return Vec::new();
            }
        };

        let status = res.status();
        if status != reqwest::StatusCode::OK {
            let body = res.text().await.unwrap_or_default();
            tracing::warn!(
                target: "coachbot::oura",
                endpoint = kind.endpoint(),
                status = %status,
                body = %body.chars().take(200).collect::<String>(),
                "Oura API returned an error status"
            );
            return Vec::new();
        }

        match res.json::<DataEnvelope>().await {
            Ok(envelope) => {
                tracing::debug!(target: "coachbot::oura", endpoint = kind.endpoint(), records = envelope.data.len(), "Oura data fetched");
                envelope.data
            }
            Err(e) => {
                tracing::warn!(target: "coachbot::oura", endpoint = kind.endpoint(), error = %e, "Oura response was not the expected JSON");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl WearableSource for OuraClient {
    async fn fetch_recent(&self, kind: MetricKind, days: u32) -> Vec<DailyRecord> {
        let today = Local::now().date_naive();
        let start = today
            .checked_sub_days(Days::new(u64::from(days)))
            .unwrap_or(today);
        self.fetch_range(kind, start, today).await
    }
}
