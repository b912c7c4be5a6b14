use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_COLOR: &str = "#22c55e";

pub const PALETTE: [&str; 8] = [
    DEFAULT_COLOR,
    "#3b82f6",
    "#a855f7",
    "#f59e0b",
    "#ef4444",
    "#ec4899",
    "#14b8a6",
    "#f97316",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: String,
    pub name: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

/// One completion of a habit on a calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    pub id: String,
    pub habit_id: String,
    pub date: NaiveDate,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HabitData {
    #[serde(default)]
    pub habits: Vec<Habit>,
    #[serde(default)]
    pub commits: Vec<Commit>,
}

// Request payloads keep every field optional so that missing fields turn into
// a 400 with a readable message instead of an extractor rejection.

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub habit_id: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub today: Option<String>,
    pub habit: Option<String>,
    pub celebrate: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct HabitForm {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_commits: usize,
    pub today_commits: usize,
    pub total_habits: usize,
    pub weekly_completion_rate: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitCard {
    pub id: String,
    pub name: String,
    pub color: String,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_commits: usize,
    pub committed_today: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapDay {
    pub date: NaiveDate,
    pub count: usize,
    pub level: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyPoint {
    pub label: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub commits: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayOfWeekPoint {
    pub day: String,
    pub possible: usize,
    pub actual: usize,
    pub rate: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub commit_id: String,
    pub habit_id: String,
    pub habit_name: String,
    pub color: String,
    pub date: NaiveDate,
    pub timestamp: DateTime<Utc>,
    pub time_ago: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub today: NaiveDate,
    pub filter: Option<String>,
    pub summary: Summary,
    pub habits: Vec<HabitCard>,
    pub heatmap: Vec<HeatmapDay>,
    pub weekly_progress: Vec<WeeklyPoint>,
    pub day_of_week: Vec<DayOfWeekPoint>,
    pub recent: Vec<HistoryEntry>,
}
