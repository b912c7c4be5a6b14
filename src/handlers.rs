use crate::errors::AppError;
use crate::models::{
    Commit, CommitRequest, Dashboard, DashboardQuery, Habit, HabitForm, HabitRequest,
    HealthResponse, MessageResponse, DEFAULT_COLOR,
};
use crate::state::AppState;
use crate::stats::{build_dashboard_at, habit_dates};
use crate::storage::persist_data;
use crate::store::parse_date;
use crate::streaks::{current_streak, is_milestone};
use crate::ui::render_index;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, Redirect},
    Form, Json,
};
use chrono::{NaiveDate, Utc};
use tracing::info;

pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Html<String>, AppError> {
    let dashboard = dashboard_for(&state, &query).await?;
    Ok(Html(render_index(&dashboard, query.celebrate)))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        message: "HabitCommit API is running".to_string(),
    })
}

pub async fn get_stats(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<Dashboard>, AppError> {
    Ok(Json(dashboard_for(&state, &query).await?))
}

pub async fn list_habits(State(state): State<AppState>) -> Json<Vec<Habit>> {
    let data = state.data.lock().await;
    Json(data.habits_sorted())
}

pub async fn get_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Habit>, AppError> {
    let data = state.data.lock().await;
    data.habit(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::not_found("Habit not found"))
}

pub async fn create_habit(
    State(state): State<AppState>,
    Json(payload): Json<HabitRequest>,
) -> Result<(StatusCode, Json<Habit>), AppError> {
    let habit = insert_habit(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(habit)))
}

pub async fn update_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<HabitRequest>,
) -> Result<Json<Habit>, AppError> {
    Ok(Json(apply_update(&state, &id, payload).await?))
}

pub async fn delete_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    remove_habit(&state, &id).await?;
    Ok(Json(MessageResponse {
        message: "Habit deleted successfully".to_string(),
    }))
}

pub async fn list_commits(State(state): State<AppState>) -> Json<Vec<Commit>> {
    let data = state.data.lock().await;
    Json(data.commits_sorted())
}

pub async fn habit_commits(
    State(state): State<AppState>,
    Path(habit_id): Path<String>,
) -> Json<Vec<Commit>> {
    let data = state.data.lock().await;
    Json(data.commits_for_habit(&habit_id))
}

pub async fn commits_on(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<Vec<Commit>>, AppError> {
    let date = parse_date(&date)?;
    let data = state.data.lock().await;
    Ok(Json(data.commits_on(date)))
}

pub async fn create_commit(
    State(state): State<AppState>,
    Json(payload): Json<CommitRequest>,
) -> Result<(StatusCode, Json<Commit>), AppError> {
    let (commit, _) = insert_commit(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(commit)))
}

pub async fn create_habit_form(
    State(state): State<AppState>,
    Form(form): Form<HabitForm>,
) -> Result<Redirect, AppError> {
    insert_habit(&state, form_request(form)).await?;
    Ok(Redirect::to("/"))
}

pub async fn edit_habit_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<HabitForm>,
) -> Result<Redirect, AppError> {
    apply_update(&state, &id, form_request(form)).await?;
    Ok(Redirect::to("/"))
}

pub async fn delete_habit_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    remove_habit(&state, &id).await?;
    Ok(Redirect::to("/"))
}

/// Commits the habit for today. A repeated click on the same day just returns to the page.
pub async fn commit_habit_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    let request = CommitRequest {
        id: None,
        habit_id: Some(id),
        date: Some(today().to_string()),
        timestamp: None,
    };

    match insert_commit(&state, request).await {
        Ok((_, streak)) if is_milestone(streak) => {
            Ok(Redirect::to(&format!("/?celebrate={streak}")))
        }
        Ok(_) => Ok(Redirect::to("/")),
        Err(err) if err.status == StatusCode::CONFLICT => Ok(Redirect::to("/")),
        Err(err) => Err(err),
    }
}

async fn dashboard_for(state: &AppState, query: &DashboardQuery) -> Result<Dashboard, AppError> {
    let today = match query.today.as_deref() {
        Some(value) => parse_date(value)?,
        None => today(),
    };
    let data = state.data.lock().await;
    Ok(build_dashboard_at(
        today,
        Utc::now(),
        &data,
        query.habit.as_deref(),
    ))
}

// Each mutation runs on a copy of the data. The shared state only takes the copy
// once it is on disk, so a failed write leaves nothing behind.

async fn insert_habit(state: &AppState, request: HabitRequest) -> Result<Habit, AppError> {
    let mut data = state.data.lock().await;
    let mut next = data.clone();
    let habit = next.create_habit(request)?;
    persist_data(&state.data_path, &next).await?;
    *data = next;
    info!(habit_id = %habit.id, name = %habit.name, "habit created");
    Ok(habit)
}

async fn apply_update(state: &AppState, id: &str, request: HabitRequest) -> Result<Habit, AppError> {
    let mut data = state.data.lock().await;
    let mut next = data.clone();
    let habit = next
        .update_habit(id, request)?
        .ok_or_else(|| AppError::not_found("Habit not found"))?;
    persist_data(&state.data_path, &next).await?;
    *data = next;
    info!(habit_id = %habit.id, "habit updated");
    Ok(habit)
}

async fn remove_habit(state: &AppState, id: &str) -> Result<(), AppError> {
    let mut data = state.data.lock().await;
    let mut next = data.clone();
    let removed = next
        .delete_habit(id)
        .ok_or_else(|| AppError::not_found("Habit not found"))?;
    persist_data(&state.data_path, &next).await?;
    *data = next;
    info!(habit_id = %id, commits_removed = removed, "habit deleted");
    Ok(())
}

/// Inserts a commit and returns it with the habit's current streak as of the commit date.
async fn insert_commit(state: &AppState, request: CommitRequest) -> Result<(Commit, u32), AppError> {
    let mut data = state.data.lock().await;
    let mut next = data.clone();
    let commit = next.create_commit(request)?;
    persist_data(&state.data_path, &next).await?;
    *data = next;

    let streak = current_streak(&habit_dates(&data, &commit.habit_id), commit.date);
    info!(habit_id = %commit.habit_id, date = %commit.date, streak, "commit recorded");
    Ok((commit, streak))
}

fn form_request(form: HabitForm) -> HabitRequest {
    HabitRequest {
        id: None,
        name: Some(form.name),
        color: Some(
            form.color
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_COLOR.to_string()),
        ),
        created_at: None,
    }
}

/// The calendar day in UTC. Clients that want their own day pass `?today=`.
fn today() -> NaiveDate {
    Utc::now().date_naive()
}
