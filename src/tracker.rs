use crate::client::{ClientError, HabitApi};
use crate::models::{Commit, CommitRequest, Dashboard, Habit, HabitData, HabitRequest};
use crate::stats::{build_dashboard, build_dashboard_at, habit_dates};
use crate::streaks::{current_streak, is_milestone};
use chrono::{NaiveDate, Utc};
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    Created {
        commit: Commit,
        streak: u32,
        milestone: bool,
    },
    AlreadyCommitted,
}

/// Client-side cache of habits and commits, kept in sync with the service.
///
/// Every mutation goes to the service first; the local copy only changes once
/// the call has succeeded.
pub struct Tracker {
    api: HabitApi,
    data: HabitData,
}

impl Tracker {
    pub fn new(api: HabitApi) -> Self {
        Self {
            api,
            data: HabitData::default(),
        }
    }

    pub async fn connect(api: HabitApi) -> Result<Self, ClientError> {
        let mut tracker = Self::new(api);
        tracker.load().await?;
        Ok(tracker)
    }

    pub fn habits(&self) -> &[Habit] {
        &self.data.habits
    }

    pub fn commits(&self) -> &[Commit] {
        &self.data.commits
    }

    pub async fn load(&mut self) -> Result<(), ClientError> {
        let habits = self.api.list_habits().await?;
        let commits = self.api.list_commits().await?;
        info!(habits = habits.len(), commits = commits.len(), "loaded tracker data");
        self.data = HabitData { habits, commits };
        Ok(())
    }

    pub async fn create_habit(&mut self, name: &str, color: &str) -> Result<Habit, ClientError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ClientError::InvalidInput("habit name is empty".into()));
        }

        let habit = self
            .api
            .create_habit(&HabitRequest {
                id: None,
                name: Some(name.to_string()),
                color: Some(color.to_string()),
                created_at: Some(Utc::now()),
            })
            .await?;
        self.data.habits.push(habit.clone());
        self.load().await?;
        Ok(habit)
    }

    pub async fn update_habit(
        &mut self,
        id: &str,
        name: &str,
        color: &str,
    ) -> Result<Habit, ClientError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ClientError::InvalidInput("habit name is empty".into()));
        }

        let updated = self.api.update_habit(id, name, color).await?;
        if let Some(habit) = self.data.habits.iter_mut().find(|h| h.id == id) {
            habit.name = updated.name.clone();
            habit.color = updated.color.clone();
        }
        self.load().await?;
        Ok(updated)
    }

    pub async fn delete_habit(&mut self, id: &str) -> Result<(), ClientError> {
        self.api.delete_habit(id).await?;
        self.data.delete_habit(id);
        Ok(())
    }

    /// Commits for the current UTC day, the same day the service uses by default.
    pub async fn commit_today(&mut self, habit_id: &str) -> Result<CommitOutcome, ClientError> {
        self.commit_on(habit_id, Utc::now().date_naive()).await
    }

    /// Records a completion for `date`, unless one is already cached or the service reports a duplicate.
    pub async fn commit_on(
        &mut self,
        habit_id: &str,
        date: NaiveDate,
    ) -> Result<CommitOutcome, ClientError> {
        if self.data.has_commit(habit_id, date) {
            return Ok(CommitOutcome::AlreadyCommitted);
        }

        let request = CommitRequest {
            id: None,
            habit_id: Some(habit_id.to_string()),
            date: Some(date.to_string()),
            timestamp: Some(Utc::now()),
        };
        let Some(commit) = self.api.create_commit(&request).await? else {
            return Ok(CommitOutcome::AlreadyCommitted);
        };

        self.data.commits.push(commit.clone());
        let streak = current_streak(&habit_dates(&self.data, habit_id), date);
        let milestone = is_milestone(streak);
        if milestone {
            info!(habit_id, streak, "streak milestone reached");
        }

        Ok(CommitOutcome::Created {
            commit,
            streak,
            milestone,
        })
    }

    pub fn dashboard(&self, today: NaiveDate, filter: Option<&str>) -> Dashboard {
        build_dashboard_at(today, Utc::now(), &self.data, filter)
    }

    pub fn dashboard_today(&self, filter: Option<&str>) -> Dashboard {
        build_dashboard(&self.data, filter)
    }
}
