//! Contribution ("cotisation") status and validity window.

use chrono::{Days, Months};

use crate::types::{text_enum, Date};

text_enum! {
    /// Whether the member is currently contributing.
    CotisationStatus("cotisation") {
        Oui => "oui",
        Non => "non",
    }
}

text_enum! {
    /// How the window of the cotisation opened at member creation is derived.
    ///
    /// Configured via `COTISATION_WINDOW_RULE`. Every later write uses one
    /// calendar month.
    WindowRule("window rule") {
        /// Same day next month, clamped to the last day of that month.
        CalendarMonth => "calendar_month",
        /// Fixed 30-day offset.
        ThirtyDays => "thirty_days",
    }
}

impl Default for WindowRule {
    fn default() -> Self {
        Self::CalendarMonth
    }
}

impl CotisationStatus {
    pub fn is_active(self) -> bool {
        self == Self::Oui
    }
}

/// Compute `date_fin` from `date_debut`: same day next month, clamped to the
/// last day of that month.
///
/// Applied on every cotisation write; any end date supplied by a caller is
/// discarded. No start date means no end date.
pub fn contribution_end_date(start: Option<Date>) -> Option<Date> {
    start?.checked_add_months(Months::new(1))
}

/// `date_fin` of the cotisation opened when a member is created.
pub fn initial_end_date(start: Option<Date>, rule: WindowRule) -> Option<Date> {
    match rule {
        WindowRule::CalendarMonth => contribution_end_date(start),
        WindowRule::ThirtyDays => start?.checked_add_days(Days::new(30)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn mid_month_start_keeps_day() {
        assert_eq!(
            contribution_end_date(Some(d(2024, 3, 15))),
            Some(d(2024, 4, 15))
        );
    }

    #[test]
    fn end_of_january_clamps_to_leap_february() {
        assert_eq!(
            contribution_end_date(Some(d(2024, 1, 31))),
            Some(d(2024, 2, 29))
        );
    }

    #[test]
    fn end_of_january_clamps_to_common_february() {
        assert_eq!(
            contribution_end_date(Some(d(2023, 1, 31))),
            Some(d(2023, 2, 28))
        );
    }

    #[test]
    fn december_rolls_into_next_year() {
        assert_eq!(
            contribution_end_date(Some(d(2024, 12, 20))),
            Some(d(2025, 1, 20))
        );
    }

    #[test]
    fn initial_thirty_day_rule_is_a_fixed_offset() {
        assert_eq!(
            initial_end_date(Some(d(2024, 1, 31)), WindowRule::ThirtyDays),
            Some(d(2024, 3, 1))
        );
    }

    #[test]
    fn no_start_means_no_end() {
        assert_eq!(contribution_end_date(None), None);
        assert_eq!(initial_end_date(None, WindowRule::ThirtyDays), None);
    }

    #[test]
    fn window_is_deterministic() {
        let start = Some(d(2025, 5, 31));
        let first = contribution_end_date(start);
        let second = contribution_end_date(start);
        assert_eq!(first, second);
        assert_eq!(first, Some(d(2025, 6, 30)));
    }

    #[test]
    fn window_rule_parses_config_values() {
        assert_eq!("calendar_month".parse::<WindowRule>().unwrap(), WindowRule::CalendarMonth);
        assert_eq!("thirty_days".parse::<WindowRule>().unwrap(), WindowRule::ThirtyDays);
        assert!("weekly".parse::<WindowRule>().is_err());
        assert_eq!(WindowRule::default(), WindowRule::CalendarMonth);
    }
}
