//! Calendar view model
//!
//! Pure functions from (view state, events) to layout structures. Nothing in
//! here touches storage or a rendering surface, which keeps the layout logic
//! testable on its own.

pub mod grid;
pub mod mini;

pub use grid::{DayCell, DayColumn, EventBlock, MonthGrid, TimeGrid, hour_label};
pub use mini::{MiniCalendar, MiniDay};

use chrono::{Datelike, Days, Months, NaiveDate};

/// Active calendar view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Month,
    Week,
    Day,
}

impl ViewMode {
    pub fn label(&self) -> &'static str {
        match self {
            ViewMode::Month => "month",
            ViewMode::Week => "week",
            ViewMode::Day => "day",
        }
    }
}

/// Sunday on or before the given date
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date.checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_sunday())))
        .unwrap_or(date)
}

/// Focused date plus active view mode.
///
/// Created from the clock at session start, mutated by navigation, never
/// persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewState {
    pub focused: NaiveDate,
    pub mode: ViewMode,
}

impl ViewState {
    /// Start a session focused on the given day, in month view
    pub fn new(today: NaiveDate) -> Self {
        Self {
            focused: today,
            mode: ViewMode::Month,
        }
    }

    /// Step backward (-1) or forward (+1) by one period of the active view
    pub fn navigate(&mut self, direction: i32) {
        let forward = direction >= 0;
        let steps = direction.unsigned_abs();

        self.focused = match self.mode {
            ViewMode::Month => {
                let months = Months::new(steps);
                if forward {
                    self.focused.checked_add_months(months)
                } else {
                    self.focused.checked_sub_months(months)
                }
            }
            ViewMode::Week => {
                let days = Days::new(u64::from(steps) * 7);
                if forward {
                    self.focused.checked_add_days(days)
                } else {
                    self.focused.checked_sub_days(days)
                }
            }
            ViewMode::Day => {
                let days = Days::new(u64::from(steps));
                if forward {
                    self.focused.checked_add_days(days)
                } else {
                    self.focused.checked_sub_days(days)
                }
            }
        }
        .unwrap_or(self.focused);
    }

    /// Switch the active view
    pub fn set_mode(&mut self, mode: ViewMode) {
        self.mode = mode;
    }

    /// Jump to today and switch to day view (the Day button's behavior)
    pub fn go_to_today(&mut self, today: NaiveDate) {
        self.focused = today;
        self.mode = ViewMode::Day;
    }

    /// Focus a specific date, keeping the active view
    pub fn goto(&mut self, date: NaiveDate) {
        self.focused = date;
    }

    /// First and last calendar day currently visible
    pub fn visible_range(&self) -> (NaiveDate, NaiveDate) {
        match self.mode {
            ViewMode::Month => {
                let start = grid::month_grid_start(self.focused);
                let end = start
                    .checked_add_days(Days::new((grid::MONTH_GRID_CELLS - 1) as u64))
                    .unwrap_or(start);
                (start, end)
            }
            ViewMode::Week => {
                let start = week_start(self.focused);
                let end = start.checked_add_days(Days::new(6)).unwrap_or(start);
                (start, end)
            }
            ViewMode::Day => (self.focused, self.focused),
        }
    }

    /// Header title for the active view, e.g. "March 2024",
    /// "Mar 10–16, 2024", or "Friday, March 15, 2024"
    pub fn header_title(&self) -> String {
        match self.mode {
            ViewMode::Month => self.focused.format("%B %Y").to_string(),
            ViewMode::Day => self.focused.format("%A, %B %-d, %Y").to_string(),
            ViewMode::Week => {
                let start = week_start(self.focused);
                let end = start.checked_add_days(Days::new(6)).unwrap_or(start);

                if start.month() == end.month() && start.year() == end.year() {
                    format!(
                        "{} {}–{}, {}",
                        start.format("%b"),
                        start.day(),
                        end.day(),
                        start.year()
                    )
                } else if start.year() == end.year() {
                    format!(
                        "{} {}–{} {}, {}",
                        start.format("%b"),
                        start.day(),
                        end.format("%b"),
                        end.day(),
                        start.year()
                    )
                } else {
                    format!(
                        "{} {}, {}–{} {}, {}",
                        start.format("%b"),
                        start.day(),
                        start.year(),
                        end.format("%b"),
                        end.day(),
                        end.year()
                    )
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_navigate_month() {
        let mut state = ViewState::new(date(2024, 3, 15));
        state.navigate(1);
        assert_eq!(state.focused, date(2024, 4, 15));
        state.navigate(-1);
        assert_eq!(state.focused, date(2024, 3, 15));
    }

    #[test]
    fn test_navigate_month_clamps_short_months() {
        let mut state = ViewState::new(date(2024, 1, 31));
        state.navigate(1);
        assert_eq!(state.focused, date(2024, 2, 29));
    }

    #[test]
    fn test_navigate_week_and_day() {
        let mut state = ViewState::new(date(2024, 3, 15));
        state.set_mode(ViewMode::Week);
        state.navigate(1);
        assert_eq!(state.focused, date(2024, 3, 22));

        state.set_mode(ViewMode::Day);
        state.navigate(-1);
        assert_eq!(state.focused, date(2024, 3, 21));
    }

    #[test]
    fn test_go_to_today_switches_to_day_view() {
        let mut state = ViewState::new(date(2024, 3, 15));
        state.navigate(1);
        state.go_to_today(date(2024, 3, 20));
        assert_eq!(state.focused, date(2024, 3, 20));
        assert_eq!(state.mode, ViewMode::Day);
    }

    #[test]
    fn test_week_start_is_sunday() {
        // 2024-03-15 is a Friday.
        assert_eq!(week_start(date(2024, 3, 15)), date(2024, 3, 10));
        // Sundays map to themselves.
        assert_eq!(week_start(date(2024, 3, 10)), date(2024, 3, 10));
    }

    #[test]
    fn test_header_title_month_and_day() {
        let mut state = ViewState::new(date(2024, 3, 15));
        assert_eq!(state.header_title(), "March 2024");

        state.set_mode(ViewMode::Day);
        assert_eq!(state.header_title(), "Friday, March 15, 2024");
    }

    #[test]
    fn test_header_title_week_variants() {
        let mut state = ViewState::new(date(2024, 3, 15));
        state.set_mode(ViewMode::Week);
        assert_eq!(state.header_title(), "Mar 10–16, 2024");

        // Week spanning a month boundary: Feb 23 – Mar 1, 2025.
        state.goto(date(2025, 2, 25));
        assert_eq!(state.header_title(), "Feb 23–Mar 1, 2025");

        // Week spanning a year boundary: Dec 28, 2025 – Jan 3, 2026.
        state.goto(date(2025, 12, 30));
        assert_eq!(state.header_title(), "Dec 28, 2025–Jan 3, 2026");
    }

    #[test]
    fn test_visible_range_per_mode() {
        let mut state = ViewState::new(date(2024, 3, 15));
        assert_eq!(
            state.visible_range(),
            (date(2024, 2, 25), date(2024, 3, 30))
        );

        state.set_mode(ViewMode::Week);
        assert_eq!(
            state.visible_range(),
            (date(2024, 3, 10), date(2024, 3, 16))
        );

        state.set_mode(ViewMode::Day);
        assert_eq!(
            state.visible_range(),
            (date(2024, 3, 15), date(2024, 3, 15))
        );
    }
}
