//! Sidebar mini calendar
//!
//! Unlike the main month grid, the mini calendar grows to as many rows as
//! the month needs and leaves the spillover cells blank.

use chrono::{Datelike, Days, NaiveDate};

/// One day cell of the mini calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MiniDay {
    pub date: NaiveDate,
    /// Day-of-month number
    pub day: u32,
    pub today: bool,
    /// Matches the main view's focused date
    pub selected: bool,
}

/// Mini calendar layout; `None` cells render blank
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiniCalendar {
    /// e.g. "March 2024"
    pub title: String,
    pub cells: Vec<Option<MiniDay>>,
}

/// Single-letter weekday header, Sunday first
pub const WEEKDAY_HEADER: [&str; 7] = ["S", "M", "T", "W", "T", "F", "S"];

impl MiniCalendar {
    /// Iterate the calendar one week row at a time
    pub fn weeks(&self) -> impl Iterator<Item = &[Option<MiniDay>]> {
        self.cells.chunks(7)
    }
}

/// Build the mini calendar for the focused date's month
pub fn mini_calendar(focused: NaiveDate, today: NaiveDate) -> MiniCalendar {
    let first = focused.with_day(1).unwrap_or(focused);
    let lead = first.weekday().num_days_from_sunday();
    let days_in_month = {
        let next_first = first
            .checked_add_months(chrono::Months::new(1))
            .unwrap_or(first);
        (next_first - first).num_days() as u32
    };
    let total_cells = (lead + days_in_month).div_ceil(7) * 7;

    let cells = (0..total_cells)
        .map(|i| {
            if i < lead || i - lead >= days_in_month {
                return None;
            }
            let day = i - lead + 1;
            let date = first.checked_add_days(Days::new(u64::from(day - 1)))?;
            Some(MiniDay {
                date,
                day,
                today: date == today,
                selected: date == focused,
            })
        })
        .collect();

    MiniCalendar {
        title: focused.format("%B %Y").to_string(),
        cells,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_row_count_grows_with_the_month() {
        // March 2024: lead 5 + 31 days = 36 cells -> 6 rows.
        let six_rows = mini_calendar(date(2024, 3, 15), date(2024, 3, 15));
        assert_eq!(six_rows.cells.len(), 42);

        // February 2026 starts on Sunday and has 28 days -> exactly 4 rows.
        let four_rows = mini_calendar(date(2026, 2, 10), date(2026, 2, 10));
        assert_eq!(four_rows.cells.len(), 28);
    }

    #[test]
    fn test_leading_cells_blank_and_days_numbered() {
        let cal = mini_calendar(date(2024, 3, 15), date(2024, 3, 15));
        for cell in &cal.cells[..5] {
            assert!(cell.is_none());
        }
        let first = cal.cells[5].unwrap();
        assert_eq!(first.day, 1);
        assert_eq!(first.date, date(2024, 3, 1));

        let last = cal.cells.iter().rev().flatten().next().unwrap();
        assert_eq!(last.day, 31);
    }

    #[test]
    fn test_today_and_selected_flags() {
        let cal = mini_calendar(date(2024, 3, 15), date(2024, 3, 20));
        let selected: Vec<_> = cal.cells.iter().flatten().filter(|c| c.selected).collect();
        let today: Vec<_> = cal.cells.iter().flatten().filter(|c| c.today).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].date, date(2024, 3, 15));
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].date, date(2024, 3, 20));
    }

    #[test]
    fn test_title() {
        let cal = mini_calendar(date(2024, 3, 15), date(2024, 3, 15));
        assert_eq!(cal.title, "March 2024");
    }
}
