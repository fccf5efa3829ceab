//! coachbot-skills: the remote collaborators of the bot.
//!
//! - [`OuraClient`] implements [`WearableSource`] over the Oura Cloud v2 API.
//! - [`CohereCoach`] implements [`Recommender`] over Cohere Chat v2.
//!
//! Both degrade instead of failing: no data, or the [`RECOMMENDATION_SENTINEL`].

mod coach_client;
mod error;
mod oura_client;

pub use coach_client::{build_prompt, CohereCoach, Recommender, RECOMMENDATION_SENTINEL};
pub use error::ClientInitError;
pub use oura_client::{DailyRecord, MetricKind, OuraClient, WearableSource};
