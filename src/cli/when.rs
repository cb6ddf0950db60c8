use std::fmt::Display;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Local, NaiveDate};
use chrono_english::parse_date_string;
use clap::ValueEnum;

use crate::utils::time::key_to_date;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

/// Turns user input such as "yesterday", "3 days ago", "15/03/2025" or "2025-03-15" into a
/// calendar day. Days after today can't be marked.
pub fn parse_day(input: &str, now: DateTime<Local>, style: DateStyle) -> Result<NaiveDate> {
    let today = now.date_naive();
    let day = match key_to_date(input.trim()) {
        Some(day) => day,
        None => parse_date_string(input, now, style.into())
            .map_err(|e| anyhow!("Can't understand date {input:?}: {e}"))?
            .date_naive(),
    };

    if day > today {
        return Err(anyhow!("{day} is in the future, only past days can be marked"));
    }
    Ok(day)
}
