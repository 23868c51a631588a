//! Attendance aggregation over a date range.
//!
//! Default-absent policy: an employee counts as Absent on any day that has
//! no record, and on any recorded day that does not list them. Days with no
//! record at all stay out of `total_working_days`; they are reported
//! separately as `unrecorded_days`, so `present_count + absent_count ==
//! total_working_days` always holds.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    model::{
        attendance::{AttendanceDay, AttendanceStatus},
        employee::Employee,
    },
    utils::period::DateRange,
};

/// Source of day records for the aggregator.
pub trait DayLookup {
    fn day(&self, date: NaiveDate) -> Option<&AttendanceDay>;
}

impl DayLookup for BTreeMap<NaiveDate, AttendanceDay> {
    fn day(&self, date: NaiveDate) -> Option<&AttendanceDay> {
        self.get(&date)
    }
}

impl DayLookup for HashMap<NaiveDate, AttendanceDay> {
    fn day(&self, date: NaiveDate) -> Option<&AttendanceDay> {
        self.get(&date)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DayDetail {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    /// false when no attendance was saved for the date
    pub recorded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceSummary {
    pub employee_id: u64,
    pub range: DateRange,
    pub present_count: u32,
    pub absent_count: u32,
    pub total_working_days: u32,
    pub unrecorded_days: u32,
    pub days: Vec<DayDetail>,
}

pub fn summarize(employee_id: u64, range: DateRange, lookup: &impl DayLookup) -> AttendanceSummary {
    let mut summary = AttendanceSummary {
        employee_id,
        range,
        present_count: 0,
        absent_count: 0,
        total_working_days: 0,
        unrecorded_days: 0,
        days: Vec::with_capacity(range.calendar_days() as usize),
    };

    for date in range.days() {
        let detail = match lookup.day(date) {
            Some(day) => {
                summary.total_working_days += 1;
                let status = day.status_of(employee_id).unwrap_or(AttendanceStatus::Absent);
                match status {
                    AttendanceStatus::Present => summary.present_count += 1,
                    AttendanceStatus::Absent => summary.absent_count += 1,
                }
                DayDetail { date, status, recorded: true }
            }
            None => {
                summary.unrecorded_days += 1;
                DayDetail { date, status: AttendanceStatus::Absent, recorded: false }
            }
        };
        summary.days.push(detail);
    }

    summary
}

/// One summary per roster employee, in roster order.
pub fn summarize_roster(
    roster: &[Employee],
    range: DateRange,
    lookup: &impl DayLookup,
) -> Vec<AttendanceSummary> {
    roster
        .iter()
        .map(|employee| summarize(employee.id, range, lookup))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SheetLine {
    pub employee_id: u64,
    pub name: String,
    pub status: AttendanceStatus,
}

/// The attendance form for one date: every roster employee with the status
/// saved for them, Absent where nothing was saved.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DaySheet {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub recorded: bool,
    pub lines: Vec<SheetLine>,
}

pub fn roster_day(roster: &[Employee], date: NaiveDate, lookup: &impl DayLookup) -> DaySheet {
    let day = lookup.day(date);
    let lines = roster
        .iter()
        .map(|employee| SheetLine {
            employee_id: employee.id,
            name: employee.full_name(),
            status: day
                .and_then(|d| d.status_of(employee.id))
                .unwrap_or(AttendanceStatus::Absent),
        })
        .collect();

    DaySheet { date, recorded: day.is_some(), lines }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        attendance::AttendanceEntry,
        employee::{self, SalaryInterval},
    };

    use AttendanceStatus::{Absent, Present};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    fn record(d: u32, entries: &[(u64, AttendanceStatus)]) -> (NaiveDate, AttendanceDay) {
        let entries = entries
            .iter()
            .map(|&(employee_id, status)| AttendanceEntry { employee_id, status })
            .collect();
        (date(d), AttendanceDay::new(date(d), entries))
    }

    #[test]
    fn fully_recorded_range_balances() {
        let days: BTreeMap<_, _> = [
            record(5, &[(1, Present), (2, Absent)]),
            record(6, &[(1, Present), (2, Present)]),
            record(7, &[(1, Absent), (2, Present)]),
        ]
        .into_iter()
        .collect();

        let summary = summarize(1, DateRange::new(date(5), date(7)), &days);

        assert_eq!(summary.present_count, 2);
        assert_eq!(summary.absent_count, 1);
        assert_eq!(summary.total_working_days, 3);
        assert_eq!(summary.unrecorded_days, 0);
        assert_eq!(summary.present_count + summary.absent_count, summary.total_working_days);
    }

    #[test]
    fn unlisted_employee_is_absent_on_recorded_day() {
        let days: BTreeMap<_, _> = [record(5, &[(2, Present)])].into_iter().collect();

        let summary = summarize(1, DateRange::single(date(5)), &days);

        assert_eq!(summary.absent_count, 1);
        assert_eq!(summary.total_working_days, 1);
        assert_eq!(
            summary.days,
            vec![DayDetail { date: date(5), status: Absent, recorded: true }]
        );
    }

    #[test]
    fn days_without_record_are_absent_but_not_working_days() {
        let days: BTreeMap<_, _> = [
            record(5, &[(1, Present)]),
            record(7, &[(1, Present)]),
        ]
        .into_iter()
        .collect();

        let summary = summarize(1, DateRange::new(date(4), date(8)), &days);

        assert_eq!(summary.present_count, 2);
        assert_eq!(summary.absent_count, 0);
        assert_eq!(summary.total_working_days, 2);
        assert_eq!(summary.unrecorded_days, 3);
        assert_eq!(summary.days.len(), 5);
        assert_eq!(
            summary.days[2],
            DayDetail { date: date(6), status: Absent, recorded: false }
        );
        assert!(summary.present_count + summary.absent_count <= summary.days.len() as u32);
    }

    #[test]
    fn empty_saved_day_still_counts_as_working_day() {
        let days: BTreeMap<_, _> = [record(5, &[])].into_iter().collect();

        let summary = summarize(9, DateRange::single(date(5)), &days);

        assert_eq!(summary.total_working_days, 1);
        assert_eq!(summary.absent_count, 1);
    }

    #[test]
    fn reversed_range_gives_empty_summary() {
        let days: BTreeMap<NaiveDate, AttendanceDay> = BTreeMap::new();
        let summary = summarize(1, DateRange::new(date(9), date(1)), &days);

        assert_eq!(summary.total_working_days, 0);
        assert!(summary.days.is_empty());
    }

    #[test]
    fn roster_summaries_follow_roster_order() {
        let roster = vec![
            employee::sample(2, 500.0, SalaryInterval::Daily),
            employee::sample(1, 25000.0, SalaryInterval::Monthly),
        ];
        let days: HashMap<_, _> = [record(5, &[(1, Present), (2, Absent)])].into_iter().collect();

        let summaries = summarize_roster(&roster, DateRange::single(date(5)), &days);

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].employee_id, 2);
        assert_eq!(summaries[0].absent_count, 1);
        assert_eq!(summaries[1].employee_id, 1);
        assert_eq!(summaries[1].present_count, 1);
    }

    #[test]
    fn day_sheet_fills_missing_employees_as_absent() {
        let roster = vec![
            employee::sample(1, 0.0, SalaryInterval::Daily),
            employee::sample(2, 0.0, SalaryInterval::Daily),
        ];
        let days: BTreeMap<_, _> = [record(5, &[(1, Present)])].into_iter().collect();

        let sheet = roster_day(&roster, date(5), &days);
        assert!(sheet.recorded);
        assert_eq!(sheet.lines[0].status, Present);
        assert_eq!(sheet.lines[1].status, Absent);

        let blank = roster_day(&roster, date(6), &days);
        assert!(!blank.recorded);
        assert!(blank.lines.iter().all(|l| l.status == Absent));
    }
}
