use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceEntry {
    #[schema(example = 1)]
    pub employee_id: u64,
    pub status: AttendanceStatus,
}

/// Attendance saved for one calendar date. Saving the same date again
/// replaces the whole entry list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceDay {
    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub date: NaiveDate,
    pub entries: Vec<AttendanceEntry>,
}

impl AttendanceDay {
    pub fn new(date: NaiveDate, entries: Vec<AttendanceEntry>) -> Self {
        Self { date, entries }
    }

    /// Status recorded for `employee_id`, `None` when the day does not list them.
    pub fn status_of(&self, employee_id: u64) -> Option<AttendanceStatus> {
        self.entries
            .iter()
            .find(|e| e.employee_id == employee_id)
            .map(|e| e.status)
    }

    /// First employee id listed more than once, if any.
    pub fn duplicate_employee(&self) -> Option<u64> {
        let mut seen = std::collections::HashSet::with_capacity(self.entries.len());
        self.entries
            .iter()
            .map(|e| e.employee_id)
            .find(|id| !seen.insert(*id))
    }
}
