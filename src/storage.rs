use crate::errors::AppError;
use crate::models::HabitData;
use std::path::Path;
use tokio::fs;
use tracing::{error, info};

pub async fn load_data(path: &Path) -> HabitData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice::<HabitData>(&bytes) {
            Ok(data) => {
                info!(
                    habits = data.habits.len(),
                    commits = data.commits.len(),
                    "loaded data from {}",
                    path.display()
                );
                data
            }
            Err(err) => {
                error!("failed to parse data file: {err}");
                HabitData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => HabitData::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            HabitData::default()
        }
    }
}

pub async fn persist_data(path: &Path, data: &HabitData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, payload).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Habit;
    use chrono::Utc;
    use std::path::PathBuf;

    fn temp_path(tag: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!("habit_commit_{tag}_{}_{nanos}", std::process::id()));
        path.push("habits.json");
        path
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let data = load_data(&temp_path("missing")).await;
        assert!(data.habits.is_empty());
        assert!(data.commits.is_empty());
    }

    #[tokio::test]
    async fn persisted_data_loads_back() {
        let path = temp_path("persist");
        let mut data = HabitData::default();
        data.habits.push(Habit {
            id: "h1".into(),
            name: "Read".into(),
            color: "#3b82f6".into(),
            created_at: Utc::now(),
        });

        persist_data(&path, &data).await.unwrap();
        let loaded = load_data(&path).await;
        assert_eq!(loaded.habits, data.habits);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn corrupt_file_loads_empty() {
        let path = temp_path("corrupt");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"{ not json").unwrap();

        let data = load_data(&path).await;
        assert!(data.habits.is_empty());

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
