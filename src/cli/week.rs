use std::fmt::Write;

use ansi_term::{Colour, Style};
use chrono::NaiveDate;

use crate::{ledger::Ledger, streak::current_streak, utils::time::week_keys};

const MAX_NAME_WIDTH: usize = 24;
const DAY_WIDTH: usize = 6;
const DONE: &str = "✓";
const MISSED: &str = "·";

/// Renders the rolling week grid: one row per habit, one column per day, then the streak and
/// the id to use in other commands.
pub fn render_week(ledger: &Ledger, today: NaiveDate, colored: bool) -> String {
    let paint = |style: Style, text: String| {
        if colored {
            style.paint(text).to_string()
        } else {
            text
        }
    };

    let week = week_keys(today);
    let name_width = ledger
        .habits()
        .iter()
        .map(|habit| habit.name().chars().count().min(MAX_NAME_WIDTH))
        .max()
        .unwrap_or(0)
        .max("Habit".len());

    let mut out = String::new();
    let _ = write!(out, "{:<name_width$}", "Habit");
    for day in week {
        let label = format!("{:>DAY_WIDTH$}", day.format("%a %d").to_string());
        let style = if day == today { Style::new().bold() } else { Style::new() };
        let _ = write!(out, " {}", paint(style, label));
    }
    let _ = writeln!(out, " {:>6}  Id", "Streak");

    if ledger.is_empty() {
        let _ = writeln!(out, "{}", paint(Style::new().dimmed(), "No habits yet".into()));
        return out;
    }

    for habit in ledger.habits() {
        let _ = write!(out, "{:<name_width$}", ellipsize(habit.name(), MAX_NAME_WIDTH));
        for day in week {
            let cell = if habit.is_completed_on(day) {
                paint(Colour::Green.normal(), format!("{DONE:^DAY_WIDTH$}"))
            } else {
                paint(Style::new().dimmed(), format!("{MISSED:^DAY_WIDTH$}"))
            };
            let _ = write!(out, " {cell}");
        }
        let streak = current_streak(habit, today);
        let _ = writeln!(
            out,
            " {}  {}",
            paint(Style::new().bold(), format!("{streak:>6}")),
            habit.id()
        );
    }
    out
}

fn ellipsize(name: &str, width: usize) -> String {
    if name.chars().count() <= width {
        name.to_string()
    } else {
        let mut short = name.chars().take(width - 1).collect::<String>();
        short.push('…');
        short
    }
}
