use chrono::NaiveDate;

use crate::{
    calc::attendance::AttendanceSummary,
    model::{
        employee::{Employee, SalaryInterval},
        salary_record::SalaryRecord,
    },
};

/// Salary earned for a period from attendance counts.
///
/// Monthly rates are pro-rated by `present / total_working_days`; with no
/// working days on record the full monthly rate is returned. Daily rates
/// are paid per present day.
pub fn computed_salary(
    present_count: u32,
    total_working_days: u32,
    salary: f64,
    interval: SalaryInterval,
) -> f64 {
    match interval {
        SalaryInterval::Monthly if total_working_days == 0 => salary,
        SalaryInterval::Monthly => present_count as f64 * salary / total_working_days as f64,
        SalaryInterval::Daily => present_count as f64 * salary,
    }
}

/// Operator-entered pay: `basic + bonus - deductions`.
pub fn net_salary(basic_salary: f64, bonus: f64, deductions: f64) -> f64 {
    basic_salary + bonus - deductions
}

/// Round half up to two decimals.
pub fn round_currency(amount: f64) -> f64 {
    let cents = amount * 100.0;
    // absorb binary representation error so 10.005 lands on the half
    let cents = (cents * 1e6).round() / 1e6;
    (cents + 0.5).floor() / 100.0
}

/// Builds the record persisted for `employee` over `summary.range`.
pub fn salary_record(
    employee: &Employee,
    summary: &AttendanceSummary,
    computed_on: NaiveDate,
) -> SalaryRecord {
    let amount = computed_salary(
        summary.present_count,
        summary.total_working_days,
        employee.salary,
        employee.salary_interval,
    );

    SalaryRecord {
        employee_id: employee.id,
        period_key: summary.range.period_key(),
        period_start: summary.range.start,
        period_end: summary.range.end,
        present_count: summary.present_count,
        absent_count: summary.absent_count,
        total_working_days: summary.total_working_days,
        computed_salary: round_currency(amount),
        paid: false,
        paid_date: None,
        computed_on,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        calc::attendance::summarize,
        model::{
            attendance::{AttendanceDay, AttendanceEntry, AttendanceStatus},
            employee,
        },
        utils::period::DateRange,
    };
    use std::collections::BTreeMap;

    #[test]
    fn monthly_is_pro_rated() {
        let amount = computed_salary(20, 25, 25000.0, SalaryInterval::Monthly);
        assert_eq!(round_currency(amount), 20000.00);
    }

    #[test]
    fn monthly_without_working_days_pays_full_rate() {
        assert_eq!(computed_salary(0, 0, 25000.0, SalaryInterval::Monthly), 25000.0);
    }

    #[test]
    fn daily_pays_per_present_day() {
        assert_eq!(computed_salary(18, 0, 500.0, SalaryInterval::Daily), 9000.0);
        assert_eq!(computed_salary(18, 30, 500.0, SalaryInterval::Daily), 9000.0);
    }

    #[test]
    fn manual_net_salary() {
        assert_eq!(net_salary(20000.0, 2000.0, 500.0), 21500.0);
    }

    #[test]
    fn rounding_is_half_up() {
        assert_eq!(round_currency(10.005), 10.01);
        assert_eq!(round_currency(10.004), 10.0);
        assert_eq!(round_currency(-2.345), -2.34);
        assert_eq!(round_currency(25000.0 * 2.0 / 3.0), 16666.67);
    }

    #[test]
    fn record_from_summary() {
        let employee = employee::sample(1, 30000.0, SalaryInterval::Monthly);
        let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let third = NaiveDate::from_ymd_opt(2026, 1, 3).unwrap();
        let days: BTreeMap<_, _> = DateRange::new(start, third)
            .days()
            .enumerate()
            .map(|(i, date)| {
                let status = if i == 0 {
                    AttendanceStatus::Absent
                } else {
                    AttendanceStatus::Present
                };
                (date, AttendanceDay::new(date, vec![AttendanceEntry { employee_id: 1, status }]))
            })
            .collect();

        let range = DateRange::month_of(start);
        let summary = summarize(1, range, &days);
        let today = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        let record = salary_record(&employee, &summary, today);

        assert_eq!(record.period_key, "2026-01");
        assert_eq!(record.present_count, 2);
        assert_eq!(record.absent_count, 1);
        assert_eq!(record.total_working_days, 3);
        assert_eq!(record.computed_salary, 20000.0);
        assert!(!record.paid);
        assert_eq!(record.computed_on, today);
    }
}
