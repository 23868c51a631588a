use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Closed calendar interval `[start, end]`.
///
/// A range whose `end` is before `start` is empty rather than invalid.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DateRange {
    #[schema(value_type = String, format = "date")]
    pub start: NaiveDate,
    #[schema(value_type = String, format = "date")]
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn single(day: NaiveDate) -> Self {
        Self::new(day, day)
    }

    /// Whole calendar month containing `day`.
    pub fn month_of(day: NaiveDate) -> Self {
        let first = first_of_month(day);
        Self::new(first, last_of_month(first))
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    /// Every calendar day in the range, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    pub fn calendar_days(&self) -> u32 {
        if self.is_empty() {
            0
        } else {
            ((self.end - self.start).num_days() + 1) as u32
        }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    fn is_full_month(&self) -> bool {
        self.start.day() == 1
            && self.start.year() == self.end.year()
            && self.start.month() == self.end.month()
            && self.end == last_of_month(self.start)
    }

    /// Key a salary record is stored under: `YYYY-MM-DD` for one day,
    /// `YYYY-MM` for one whole month, `YYYY-MM-DD_YYYY-MM-DD` otherwise.
    pub fn period_key(&self) -> String {
        if self.start == self.end {
            self.start.format("%Y-%m-%d").to_string()
        } else if self.is_full_month() {
            self.start.format("%Y-%m").to_string()
        } else {
            format!(
                "{}_{}",
                self.start.format("%Y-%m-%d"),
                self.end.format("%Y-%m-%d")
            )
        }
    }

    /// Inverse of [`DateRange::period_key`].
    pub fn from_period_key(key: &str) -> Option<Self> {
        if let Some((start, end)) = key.split_once('_') {
            let start = NaiveDate::parse_from_str(start, "%Y-%m-%d").ok()?;
            let end = NaiveDate::parse_from_str(end, "%Y-%m-%d").ok()?;
            return (start <= end).then_some(Self::new(start, end));
        }

        if let Ok(day) = NaiveDate::parse_from_str(key, "%Y-%m-%d") {
            return Some(Self::single(day));
        }

        let first = NaiveDate::parse_from_str(&format!("{key}-01"), "%Y-%m-%d").ok()?;
        Some(Self::month_of(first))
    }
}

pub fn first_of_month(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

fn last_of_month(first: NaiveDate) -> NaiveDate {
    let (year, month) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };

    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| next.pred_opt())
        .unwrap_or(first)
}
