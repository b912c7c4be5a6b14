//! Typed façade over the HabitCommit REST API.
//!
//! One request per call. Failures are returned as they happen; nothing is
//! retried. A `409` on commit creation is not an error: it means the habit
//! already has a commit for that day.

use crate::models::{
    Commit, CommitRequest, Dashboard, ErrorBody, Habit, HabitRequest, HealthResponse,
    MessageResponse,
};
use chrono::NaiveDate;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error as ThisError;
use tracing::debug;
use url::Url;

#[derive(Debug, ThisError)]
pub enum ClientError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server responded {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(err) => err.status(),
            Self::InvalidInput(_) | Self::InvalidBaseUrl(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HabitApi {
    client: reqwest::Client,
    base_url: Url,
}

impl HabitApi {
    /// `base_url` is the API root, e.g. `http://localhost:5001/api`.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url)
            .map_err(|err| ClientError::InvalidBaseUrl(format!("{base_url}: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub async fn list_habits(&self) -> Result<Vec<Habit>, ClientError> {
        let resp = self.client.get(self.url(&["habits"])).send().await?;
        decode(resp).await
    }

    pub async fn get_habit(&self, id: &str) -> Result<Option<Habit>, ClientError> {
        let resp = self
            .client
            .get(self.url(&["habits", id]))
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        decode(resp).await.map(Some)
    }

    pub async fn create_habit(&self, habit: &HabitRequest) -> Result<Habit, ClientError> {
        let resp = self
            .client
            .post(self.url(&["habits"]))
            .json(habit)
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn update_habit(
        &self,
        id: &str,
        name: &str,
        color: &str,
    ) -> Result<Habit, ClientError> {
        let body = HabitRequest {
            name: Some(name.to_string()),
            color: Some(color.to_string()),
            ..Default::default()
        };
        let resp = self
            .client
            .put(self.url(&["habits", id]))
            .json(&body)
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn delete_habit(&self, id: &str) -> Result<MessageResponse, ClientError> {
        let resp = self
            .client
            .delete(self.url(&["habits", id]))
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn list_commits(&self) -> Result<Vec<Commit>, ClientError> {
        let resp = self.client.get(self.url(&["commits"])).send().await?;
        decode(resp).await
    }

    pub async fn list_habit_commits(&self, habit_id: &str) -> Result<Vec<Commit>, ClientError> {
        let resp = self
            .client
            .get(self.url(&["commits", "habit", habit_id]))
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn list_commits_on(&self, date: NaiveDate) -> Result<Vec<Commit>, ClientError> {
        let resp = self
            .client
            .get(self.url(&["commits", "today", &date.to_string()]))
            .send()
            .await?;
        decode(resp).await
    }

    /// Creates a commit. `Ok(None)` when the habit already has one for that date.
    pub async fn create_commit(&self, commit: &CommitRequest) -> Result<Option<Commit>, ClientError> {
        let resp = self
            .client
            .post(self.url(&["commits"]))
            .json(commit)
            .send()
            .await?;
        if resp.status() == StatusCode::CONFLICT {
            debug!(habit_id = ?commit.habit_id, date = ?commit.date, "commit already exists");
            return Ok(None);
        }
        decode(resp).await.map(Some)
    }

    pub async fn dashboard(
        &self,
        today: Option<NaiveDate>,
        habit: Option<&str>,
    ) -> Result<Dashboard, ClientError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(today) = today {
            query.push(("today", today.to_string()));
        }
        if let Some(habit) = habit {
            query.push(("habit", habit.to_string()));
        }
        let resp = self
            .client
            .get(self.url(&["stats"]))
            .query(&query)
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let resp = self.client.get(self.url(&["health"])).send().await?;
        decode(resp).await
    }

    /// Appends percent-encoded path segments to the API root.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // The constructor rejects cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json::<T>().await?);
    }

    let text = resp.text().await?;
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.error)
        .unwrap_or(text);
    Err(ClientError::Status { status, message })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api() -> HabitApi {
        HabitApi::new("http://localhost:5001/api/").unwrap()
    }

    #[test]
    fn ids_become_single_path_segments() {
        let url = api().url(&["habits", "a/b?c#d%"]);
        assert_eq!(url.as_str(), "http://localhost:5001/api/habits/a%2Fb%3Fc%23d%25");
    }

    #[test]
    fn trailing_slash_on_base_is_ignored() {
        let url = api().url(&["commits", "today", "2026-01-07"]);
        assert_eq!(url.as_str(), "http://localhost:5001/api/commits/today/2026-01-07");
    }

    #[test]
    fn rejects_unusable_base_urls() {
        assert!(matches!(
            HabitApi::new("not a url"),
            Err(ClientError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            HabitApi::new("mailto:someone@example.com"),
            Err(ClientError::InvalidBaseUrl(_))
        ));
    }
}
