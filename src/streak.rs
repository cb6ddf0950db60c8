use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::ledger::Habit;

/// Number of consecutive completed days ending at `today`. A habit not completed today has a
/// streak of 0, even if yesterday was completed.
pub fn current_streak(habit: &Habit, today: NaiveDate) -> u32 {
    streak_ending_at(habit.completions(), today)
}

/// Walks back one calendar day at a time for as long as days are completed. There is no upper
/// bound, the walk isn't limited to the visible week.
pub fn streak_ending_at(completions: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut count = 0;
    let mut day = Some(today);
    while let Some(current) = day.filter(|day| completions.contains(day)) {
        count += 1;
        day = current.pred_opt();
    }
    count
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::{Days, NaiveDate};

    use crate::ledger::{Habit, HabitId, Ledger};

    use super::{current_streak, streak_ending_at};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn days_before(today: NaiveDate, offsets: impl IntoIterator<Item = u64>) -> Vec<NaiveDate> {
        offsets
            .into_iter()
            .map(|offset| today - Days::new(offset))
            .collect()
    }

    fn read_habit() -> Habit {
        Habit::new(HabitId::new("a").unwrap(), "Read").unwrap()
    }

    #[test]
    fn test_empty_completions() {
        let habit = read_habit();
        assert_eq!(current_streak(&habit, date(2025, 3, 1)), 0);
    }

    #[test]
    fn test_last_n_days() {
        let today = date(2025, 3, 10);
        for n in 1..=10 {
            let habit = read_habit().with_completions(days_before(today, 0..n));
            assert_eq!(current_streak(&habit, today), n as u32);
        }
    }

    #[test]
    fn test_today_missing_means_zero() {
        let today = date(2025, 3, 10);
        let habit = read_habit().with_completions(days_before(today, 1..5));
        assert_eq!(current_streak(&habit, today), 0);
    }

    #[test]
    fn test_gap_breaks_streak() {
        let today = date(2025, 3, 10);
        let habit = read_habit().with_completions(days_before(today, [0, 1, 2, 3, 4, 6, 7, 8]));
        assert_eq!(current_streak(&habit, today), 5);
    }

    #[test]
    fn test_not_bounded_by_week() {
        let today = date(2025, 3, 10);
        let habit = read_habit().with_completions(days_before(today, 0..400));
        assert_eq!(current_streak(&habit, today), 400);
    }

    #[test]
    fn test_crosses_month_and_year() {
        let completions = [date(2024, 12, 30), date(2024, 12, 31), date(2025, 1, 1)]
            .into_iter()
            .collect::<BTreeSet<_>>();
        assert_eq!(streak_ending_at(&completions, date(2025, 1, 1)), 3);

        let completions = [date(2024, 2, 28), date(2024, 2, 29), date(2024, 3, 1)]
            .into_iter()
            .collect::<BTreeSet<_>>();
        assert_eq!(streak_ending_at(&completions, date(2024, 3, 1)), 3);
    }

    #[test]
    fn test_daylight_saving_transitions() {
        // Spring forward in the US and in the EU.
        for today in [date(2024, 3, 11), date(2024, 4, 1)] {
            let completions = (0..4).map(|offset| today - Days::new(offset)).collect();
            assert_eq!(streak_ending_at(&completions, today), 4);
        }
        // Fall back in the EU.
        let today = date(2024, 10, 28);
        let completions = (0..3).map(|offset| today - Days::new(offset)).collect();
        assert_eq!(streak_ending_at(&completions, today), 3);
    }

    #[test]
    fn test_stops_at_earliest_date() {
        let completions = [NaiveDate::MIN].into_iter().collect();
        assert_eq!(streak_ending_at(&completions, NaiveDate::MIN), 1);
    }

    #[test]
    fn test_toggle_scenario() {
        let today = date(2025, 3, 10);
        let mut ledger = Ledger::default();
        let id = ledger.add_habit("Exercise").unwrap();

        ledger.toggle_completion(&id, today);
        assert_eq!(current_streak(ledger.get(&id).unwrap(), today), 1);

        ledger.toggle_completion(&id, today);
        assert_eq!(current_streak(ledger.get(&id).unwrap(), today), 0);
    }

    #[test]
    fn test_gap_scenario() {
        let today = date(2025, 3, 10);
        let mut ledger = Ledger::default();
        let id = ledger.add_habit("Read").unwrap();
        for day in days_before(today, 0..5) {
            ledger.toggle_completion(&id, day);
        }
        assert_eq!(current_streak(ledger.get(&id).unwrap(), today), 5);

        ledger.toggle_completion(&id, today - Days::new(6));
        assert_eq!(current_streak(ledger.get(&id).unwrap(), today), 5);
    }
}
