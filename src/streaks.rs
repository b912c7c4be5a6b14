use chrono::{Duration, NaiveDate};

/// Consecutive-day run ending today or yesterday. Zero when the newest date is older.
pub fn current_streak(dates: &[NaiveDate], today: NaiveDate) -> u32 {
    let days = sorted_unique(dates);
    let Some(&newest) = days.last() else {
        return 0;
    };

    let yesterday = today - Duration::days(1);
    if newest != today && newest != yesterday {
        return 0;
    }

    let mut streak = 1;
    let mut expected = newest - Duration::days(1);
    for &date in days.iter().rev().skip(1) {
        if date != expected {
            break;
        }
        streak += 1;
        expected = expected - Duration::days(1);
    }
    streak
}

/// Longest run of dates one day apart, anywhere in the history.
pub fn longest_streak(dates: &[NaiveDate]) -> u32 {
    let days = sorted_unique(dates);
    if days.is_empty() {
        return 0;
    }

    let mut longest = 1;
    let mut run = 1;
    for pair in days.windows(2) {
        if (pair[1] - pair[0]).num_days() == 1 {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 1;
        }
    }
    longest
}

pub fn is_milestone(streak: u32) -> bool {
    streak > 0 && streak % 7 == 0
}

fn sorted_unique(dates: &[NaiveDate]) -> Vec<NaiveDate> {
    let mut days = dates.to_vec();
    days.sort_unstable();
    days.dedup();
    days
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn run_ending(end: NaiveDate, len: i64) -> Vec<NaiveDate> {
        (0..len).map(|offset| end - Duration::days(offset)).collect()
    }

    #[test]
    fn consecutive_days_ending_today_count_fully() {
        let today = day(2026, 3, 10);
        for n in 1..=10 {
            let dates = run_ending(today, n);
            assert_eq!(current_streak(&dates, today), n as u32);
            assert_eq!(longest_streak(&dates), n as u32);
        }
    }

    #[test]
    fn streak_ending_yesterday_still_counts() {
        let today = day(2026, 3, 10);
        let dates = run_ending(today - Duration::days(1), 4);
        assert_eq!(current_streak(&dates, today), 4);
    }

    #[test]
    fn gap_resets_current_but_not_longest() {
        let today = day(2026, 3, 10);
        let mut dates = run_ending(day(2026, 3, 1), 5);
        dates.push(day(2026, 3, 8));
        assert_eq!(current_streak(&dates, today), 0);
        assert_eq!(longest_streak(&dates), 5);
    }

    #[test]
    fn current_streak_stops_at_first_gap() {
        let today = day(2026, 3, 10);
        let mut dates = run_ending(today, 3);
        dates.extend(run_ending(day(2026, 3, 5), 6));
        assert_eq!(current_streak(&dates, today), 3);
        assert_eq!(longest_streak(&dates), 6);
    }

    #[test]
    fn unsorted_and_duplicate_dates_are_normalised() {
        let today = day(2026, 3, 10);
        let dates = vec![
            day(2026, 3, 9),
            day(2026, 3, 10),
            day(2026, 3, 9),
            day(2026, 3, 8),
        ];
        assert_eq!(current_streak(&dates, today), 3);
        assert_eq!(longest_streak(&dates), 3);
    }

    #[test]
    fn runs_cross_month_and_year_boundaries() {
        let today = day(2026, 1, 2);
        let dates = run_ending(today, 5);
        assert_eq!(dates.last(), Some(&day(2025, 12, 29)));
        assert_eq!(current_streak(&dates, today), 5);
    }

    #[test]
    fn empty_history_is_zero() {
        assert_eq!(current_streak(&[], day(2026, 3, 10)), 0);
        assert_eq!(longest_streak(&[]), 0);
    }

    #[test]
    fn milestones_are_multiples_of_seven() {
        assert!(!is_milestone(0));
        assert!(!is_milestone(6));
        assert!(is_milestone(7));
        assert!(is_milestone(14));
        assert!(!is_milestone(15));
    }
}
