//! Collection operations over [`HabitData`].
//!
//! Everything here is synchronous and works on the in-memory cache. Handlers
//! hold the state lock around these calls and persist afterwards.

use crate::errors::AppError;
use crate::models::{Commit, CommitRequest, Habit, HabitData, HabitRequest};
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

pub const DUPLICATE_COMMIT: &str = "Commit already exists for this habit today";

impl HabitData {
    /// Habits ordered by creation time.
    pub fn habits_sorted(&self) -> Vec<Habit> {
        let mut habits = self.habits.clone();
        habits.sort_by_key(|habit| habit.created_at);
        habits
    }

    pub fn habit(&self, id: &str) -> Option<&Habit> {
        self.habits.iter().find(|habit| habit.id == id)
    }

    pub fn create_habit(&mut self, request: HabitRequest) -> Result<Habit, AppError> {
        let name = required(request.name)?;
        let color = required(request.color)?;
        let id = optional_id(request.id);

        if self.habit(&id).is_some() {
            return Err(AppError::conflict(format!("Habit {id} already exists")));
        }

        let habit = Habit {
            id,
            name,
            color,
            created_at: request.created_at.unwrap_or_else(Utc::now),
        };
        self.habits.push(habit.clone());
        Ok(habit)
    }

    /// Renames or recolors a habit. `Ok(None)` means the habit does not exist.
    pub fn update_habit(
        &mut self,
        id: &str,
        request: HabitRequest,
    ) -> Result<Option<Habit>, AppError> {
        let name = required(request.name)?;
        let color = required(request.color)?;

        let Some(habit) = self.habits.iter_mut().find(|habit| habit.id == id) else {
            return Ok(None);
        };
        habit.name = name;
        habit.color = color;
        Ok(Some(habit.clone()))
    }

    /// Removes the habit and every commit it owns. Returns how many commits went with it,
    /// or `None` if the habit does not exist.
    pub fn delete_habit(&mut self, id: &str) -> Option<usize> {
        let before = self.habits.len();
        self.habits.retain(|habit| habit.id != id);
        if self.habits.len() == before {
            return None;
        }

        let commits_before = self.commits.len();
        self.commits.retain(|commit| commit.habit_id != id);
        Some(commits_before - self.commits.len())
    }

    /// All commits, newest timestamp first.
    pub fn commits_sorted(&self) -> Vec<Commit> {
        let mut commits = self.commits.clone();
        commits.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        commits
    }

    /// A habit's commits, newest date first.
    pub fn commits_for_habit(&self, habit_id: &str) -> Vec<Commit> {
        let mut commits: Vec<Commit> = self
            .commits
            .iter()
            .filter(|commit| commit.habit_id == habit_id)
            .cloned()
            .collect();
        commits.sort_by(|a, b| b.date.cmp(&a.date));
        commits
    }

    pub fn commits_on(&self, date: NaiveDate) -> Vec<Commit> {
        self.commits
            .iter()
            .filter(|commit| commit.date == date)
            .cloned()
            .collect()
    }

    pub fn has_commit(&self, habit_id: &str, date: NaiveDate) -> bool {
        self.commits
            .iter()
            .any(|commit| commit.habit_id == habit_id && commit.date == date)
    }

    /// Inserts a commit after checking the habit exists and the (habit, date) pair is free.
    pub fn create_commit(&mut self, request: CommitRequest) -> Result<Commit, AppError> {
        let habit_id = required(request.habit_id)?;
        let date = parse_date(&required(request.date)?)?;

        if self.habit(&habit_id).is_none() {
            return Err(AppError::not_found("Habit not found"));
        }
        if self.has_commit(&habit_id, date) {
            return Err(AppError::conflict(DUPLICATE_COMMIT));
        }

        let id = optional_id(request.id);
        if self.commits.iter().any(|commit| commit.id == id) {
            return Err(AppError::conflict(format!("Commit {id} already exists")));
        }

        let commit = Commit {
            id,
            habit_id,
            date,
            timestamp: request.timestamp.unwrap_or_else(Utc::now),
        };
        self.commits.push(commit.clone());
        Ok(commit)
    }
}

pub fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::bad_request(format!("Invalid date '{value}', expected YYYY-MM-DD")))
}

fn required(value: Option<String>) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::bad_request("Missing required fields"))
}

fn optional_id(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}
