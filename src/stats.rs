use crate::models::{
    Dashboard, DayOfWeekPoint, HabitCard, HabitData, HeatmapDay, HistoryEntry, Summary,
    WeeklyPoint,
};
use crate::streaks::{current_streak, longest_streak};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use std::collections::HashMap;

pub const HEATMAP_DAYS: i64 = 365;
pub const WEEKLY_PROGRESS_WEEKS: i64 = 12;
pub const DAY_OF_WEEK_WEEKS: i64 = 8;
pub const RECENT_LIMIT: usize = 20;
pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

pub fn build_dashboard(data: &HabitData, filter: Option<&str>) -> Dashboard {
    let now = Utc::now();
    build_dashboard_at(now.date_naive(), now, data, filter)
}

pub fn build_dashboard_at(
    today: NaiveDate,
    now: DateTime<Utc>,
    data: &HabitData,
    filter: Option<&str>,
) -> Dashboard {
    // An unknown habit id falls back to "all habits".
    let filter = filter.filter(|id| data.habit(id).is_some());

    Dashboard {
        today,
        filter: filter.map(str::to_string),
        summary: summary(data, today),
        habits: habit_cards(data, today),
        heatmap: heatmap(data, today, filter),
        weekly_progress: weekly_progress(data, today, filter),
        day_of_week: day_of_week(data, today),
        recent: recent_history(data, now),
    }
}

pub fn summary(data: &HabitData, today: NaiveDate) -> Summary {
    let cards = habit_cards(data, today);
    Summary {
        total_commits: data.commits.len(),
        today_commits: data.commits.iter().filter(|c| c.date == today).count(),
        total_habits: data.habits.len(),
        weekly_completion_rate: weekly_completion_rate(data, today),
        current_streak: cards.iter().map(|c| c.current_streak).max().unwrap_or(0),
        longest_streak: cards.iter().map(|c| c.longest_streak).max().unwrap_or(0),
    }
}

pub fn habit_cards(data: &HabitData, today: NaiveDate) -> Vec<HabitCard> {
    data.habits_sorted()
        .into_iter()
        .map(|habit| {
            let dates = habit_dates(data, &habit.id);
            HabitCard {
                current_streak: current_streak(&dates, today),
                longest_streak: longest_streak(&dates),
                total_commits: dates.len(),
                committed_today: dates.contains(&today),
                id: habit.id,
                name: habit.name,
                color: habit.color,
            }
        })
        .collect()
}

pub fn habit_dates(data: &HabitData, habit_id: &str) -> Vec<NaiveDate> {
    data.commits
        .iter()
        .filter(|commit| commit.habit_id == habit_id)
        .map(|commit| commit.date)
        .collect()
}

/// Share of possible habit completions over the last 7 days, as a rounded percentage.
pub fn weekly_completion_rate(data: &HabitData, today: NaiveDate) -> u32 {
    let possible = data.habits.len() * 7;
    if possible == 0 {
        return 0;
    }
    let start = today - Duration::days(6);
    let completed = data
        .commits
        .iter()
        .filter(|c| c.date >= start && c.date <= today)
        .count();
    percent(completed, possible)
}

/// Commit totals for trailing 7-day buckets, oldest first, the last one ending today.
pub fn weekly_progress(data: &HabitData, today: NaiveDate, filter: Option<&str>) -> Vec<WeeklyPoint> {
    let counts = counts_by_date(data, filter);
    let mut weeks = Vec::with_capacity(WEEKLY_PROGRESS_WEEKS as usize);

    for offset in (0..WEEKLY_PROGRESS_WEEKS).rev() {
        let end = today - Duration::weeks(offset);
        let start = end - Duration::days(6);
        let commits = (0..7)
            .map(|day| counts.get(&(start + Duration::days(day))).copied().unwrap_or(0))
            .sum();

        weeks.push(WeeklyPoint {
            label: format!("{}/{}", start.month(), start.day()),
            start_date: start,
            end_date: end,
            commits,
        });
    }
    weeks
}

/// Completion percentage per weekday (Sunday first) over the trailing 8 weeks.
pub fn day_of_week(data: &HabitData, today: NaiveDate) -> Vec<DayOfWeekPoint> {
    let counts = counts_by_date(data, None);
    let mut possible = [0usize; 7];
    let mut actual = [0usize; 7];

    for offset in 0..DAY_OF_WEEK_WEEKS * 7 {
        let date = today - Duration::days(offset);
        let slot = date.weekday().num_days_from_sunday() as usize;
        possible[slot] += data.habits.len();
        actual[slot] += counts.get(&date).copied().unwrap_or(0);
    }

    WEEKDAY_LABELS
        .iter()
        .enumerate()
        .map(|(slot, day)| DayOfWeekPoint {
            day: day.to_string(),
            possible: possible[slot],
            actual: actual[slot],
            rate: if possible[slot] > 0 {
                percent(actual[slot], possible[slot])
            } else {
                0
            },
        })
        .collect()
}

/// One cell per day for the last year, oldest first.
pub fn heatmap(data: &HabitData, today: NaiveDate, filter: Option<&str>) -> Vec<HeatmapDay> {
    let counts = counts_by_date(data, filter);
    (0..HEATMAP_DAYS)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset);
            let count = counts.get(&date).copied().unwrap_or(0);
            HeatmapDay {
                date,
                count,
                level: count.min(4) as u8,
            }
        })
        .collect()
}

/// Most recent commits by timestamp, joined with their habit.
pub fn recent_history(data: &HabitData, now: DateTime<Utc>) -> Vec<HistoryEntry> {
    data.commits_sorted()
        .into_iter()
        .take(RECENT_LIMIT)
        .filter_map(|commit| {
            let habit = data.habit(&commit.habit_id)?;
            Some(HistoryEntry {
                habit_name: habit.name.clone(),
                color: habit.color.clone(),
                time_ago: time_ago(commit.timestamp, now),
                commit_id: commit.id,
                habit_id: commit.habit_id,
                date: commit.date,
                timestamp: commit.timestamp,
            })
        })
        .collect()
}

pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    const UNITS: [(&str, i64); 6] = [
        ("year", 31_536_000),
        ("month", 2_592_000),
        ("week", 604_800),
        ("day", 86_400),
        ("hour", 3_600),
        ("minute", 60),
    ];

    let seconds = (now - then).num_seconds();
    for (unit, size) in UNITS {
        let count = seconds / size;
        if count >= 1 {
            let plural = if count == 1 { "" } else { "s" };
            return format!("{count} {unit}{plural} ago");
        }
    }
    "just now".to_string()
}

fn counts_by_date(data: &HabitData, filter: Option<&str>) -> HashMap<NaiveDate, usize> {
    let mut counts = HashMap::new();
    for commit in &data.commits {
        if filter.is_some_and(|id| id != commit.habit_id) {
            continue;
        }
        *counts.entry(commit.date).or_insert(0) += 1;
    }
    counts
}

fn percent(part: usize, whole: usize) -> u32 {
    (part as f64 / whole as f64 * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Commit, Habit};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn habit(id: &str) -> Habit {
        Habit {
            id: id.to_string(),
            name: format!("habit {id}"),
            color: "#22c55e".to_string(),
            created_at: Utc::now(),
        }
    }

    fn commit(habit_id: &str, date: NaiveDate) -> Commit {
        Commit {
            id: format!("{habit_id}-{date}"),
            habit_id: habit_id.to_string(),
            date,
            timestamp: date.and_hms_opt(12, 0, 0).unwrap().and_utc(),
        }
    }

    fn sample() -> (HabitData, NaiveDate) {
        let today = day(2026, 1, 7);
        let mut data = HabitData::default();
        data.habits.push(habit("a"));
        data.habits.push(habit("b"));
        for offset in 0..3 {
            data.commits.push(commit("a", today - Duration::days(offset)));
        }
        data.commits.push(commit("b", today - Duration::days(10)));
        (data, today)
    }

    #[test]
    fn weekly_completion_rate_is_share_of_possible() {
        let (data, today) = sample();
        // 3 of 14 possible completions.
        assert_eq!(weekly_completion_rate(&data, today), 21);
        assert_eq!(weekly_completion_rate(&HabitData::default(), today), 0);
    }

    #[test]
    fn weekly_progress_has_twelve_trailing_buckets() {
        let (data, today) = sample();
        let weeks = weekly_progress(&data, today, None);
        assert_eq!(weeks.len(), 12);

        let last = weeks.last().unwrap();
        assert_eq!(last.end_date, today);
        assert_eq!(last.start_date, day(2026, 1, 1));
        assert_eq!(last.label, "1/1");
        assert_eq!(last.commits, 3);

        let previous = &weeks[10];
        assert_eq!(previous.end_date, day(2025, 12, 31));
        assert_eq!(previous.commits, 1);

        let only_b = weekly_progress(&data, today, Some("b"));
        assert_eq!(only_b.last().unwrap().commits, 0);
        assert_eq!(only_b[10].commits, 1);
    }

    #[test]
    fn day_of_week_counts_eight_weeks() {
        let (data, today) = sample();
        let days = day_of_week(&data, today);
        assert_eq!(days.len(), 7);
        assert!(days.iter().all(|d| d.possible == 2 * 8));

        // 2026-01-07 is a Wednesday.
        let wed = &days[3];
        assert_eq!(wed.day, "Wed");
        assert_eq!(wed.actual, 1);
        assert_eq!(wed.rate, 6);

        let empty = day_of_week(&HabitData::default(), today);
        assert!(empty.iter().all(|d| d.rate == 0));
    }

    #[test]
    fn heatmap_covers_a_year_and_caps_levels() {
        let (mut data, today) = sample();
        for id in ["c", "d", "e", "f"] {
            data.habits.push(habit(id));
            data.commits.push(commit(id, today));
        }

        let cells = heatmap(&data, today, None);
        assert_eq!(cells.len(), 365);
        assert_eq!(cells.first().unwrap().date, today - Duration::days(364));

        let last = cells.last().unwrap();
        assert_eq!(last.date, today);
        assert_eq!(last.count, 5);
        assert_eq!(last.level, 4);

        let filtered = heatmap(&data, today, Some("a"));
        assert_eq!(filtered.last().unwrap().count, 1);
    }

    #[test]
    fn recent_history_skips_orphans_and_orders_by_timestamp() {
        let (mut data, today) = sample();
        data.commits.push(commit("ghost", today));
        let now = today.and_hms_opt(15, 0, 0).unwrap().and_utc();

        let recent = recent_history(&data, now);
        assert_eq!(recent.len(), 4);
        assert_eq!(recent[0].date, today);
        assert_eq!(recent[0].time_ago, "3 hours ago");
        assert!(recent.iter().all(|entry| entry.habit_id != "ghost"));
    }

    #[test]
    fn time_ago_picks_largest_unit() {
        let now = day(2026, 1, 7).and_hms_opt(12, 0, 0).unwrap().and_utc();
        assert_eq!(time_ago(now, now), "just now");
        assert_eq!(time_ago(now - Duration::seconds(59), now), "just now");
        assert_eq!(time_ago(now - Duration::minutes(1), now), "1 minute ago");
        assert_eq!(time_ago(now - Duration::days(2), now), "2 days ago");
        assert_eq!(time_ago(now - Duration::days(8), now), "1 week ago");
        assert_eq!(time_ago(now - Duration::days(400), now), "1 year ago");
    }

    #[test]
    fn dashboard_summary_takes_best_streaks() {
        let (data, today) = sample();
        let now = today.and_hms_opt(18, 0, 0).unwrap().and_utc();
        let dashboard = build_dashboard_at(today, now, &data, Some("missing"));

        assert_eq!(dashboard.filter, None);
        assert_eq!(dashboard.summary.total_commits, 4);
        assert_eq!(dashboard.summary.today_commits, 1);
        assert_eq!(dashboard.summary.total_habits, 2);
        assert_eq!(dashboard.summary.current_streak, 3);
        assert_eq!(dashboard.summary.longest_streak, 3);

        let card_a = dashboard.habits.iter().find(|c| c.id == "a").unwrap();
        assert!(card_a.committed_today);
        assert_eq!(card_a.total_commits, 3);
        let card_b = dashboard.habits.iter().find(|c| c.id == "b").unwrap();
        assert_eq!(card_b.current_streak, 0);
        assert_eq!(card_b.longest_streak, 1);
    }
}
