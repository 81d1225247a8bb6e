//! Month and time-slot grid construction
//!
//! The month view is a fixed 5×7 grid: months that would need a sixth row
//! have their trailing days dropped. That truncation is long-standing
//! observable behavior (the 35-cell sequence is part of the view contract),
//! so it is kept rather than fixed; the drop is logged when it happens.

use chrono::{Datelike, Days, NaiveDate, Timelike};
use tracing::{debug, warn};

use super::week_start;
use crate::event::Event;

/// Rows in the month grid
pub const MONTH_GRID_ROWS: usize = 5;
/// Columns in the month grid (Sunday through Saturday)
pub const MONTH_GRID_COLS: usize = 7;
/// Total month grid cells
pub const MONTH_GRID_CELLS: usize = MONTH_GRID_ROWS * MONTH_GRID_COLS;

/// Hour slots per rendered day in week/day view
pub const HOURS_PER_DAY: u32 = 24;
/// Vertical units per hour; one unit per minute
pub const UNITS_PER_HOUR: u32 = 60;

/// One cell of the month grid
#[derive(Debug, Clone, PartialEq)]
pub struct DayCell {
    pub date: NaiveDate,
    /// Spillover from the previous or next month
    pub other_month: bool,
    pub today: bool,
    /// Events falling on this calendar day
    pub events: Vec<Event>,
}

/// Month view layout: exactly [`MONTH_GRID_CELLS`] cells
#[derive(Debug, Clone, PartialEq)]
pub struct MonthGrid {
    pub cells: Vec<DayCell>,
}

impl MonthGrid {
    /// Iterate the grid one week row at a time
    pub fn weeks(&self) -> impl Iterator<Item = &[DayCell]> {
        self.cells.chunks(MONTH_GRID_COLS)
    }
}

/// A timed event positioned on the hour axis
#[derive(Debug, Clone, PartialEq)]
pub struct EventBlock {
    /// Units from the top of the day (minute of day)
    pub offset: u32,
    /// Height in units (minutes), clamped to at least 1
    pub height: u32,
    pub event: Event,
}

/// One day column of the week/day view
#[derive(Debug, Clone, PartialEq)]
pub struct DayColumn {
    pub date: NaiveDate,
    pub today: bool,
    /// All-day events, rendered as full-day blocks
    pub all_day: Vec<Event>,
    /// Timed events with their vertical positions
    pub blocks: Vec<EventBlock>,
}

/// Week or day view layout: one column per rendered day, each with
/// [`HOURS_PER_DAY`] hour slots
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    pub days: Vec<DayColumn>,
}

/// First cell of the month grid: the Sunday on or before the 1st
pub fn month_grid_start(focused: NaiveDate) -> NaiveDate {
    let first = focused.with_day(1).unwrap_or(focused);
    week_start(first)
}

fn days_in_month(focused: NaiveDate) -> u32 {
    let first = focused.with_day(1).unwrap_or(focused);
    let next_first = first
        .checked_add_months(chrono::Months::new(1))
        .unwrap_or(first);
    (next_first - first).num_days() as u32
}

fn events_for_day(events: &[Event], date: NaiveDate) -> Vec<Event> {
    events.iter().filter(|e| e.date == date).cloned().collect()
}

/// Build the month grid around the focused date
pub fn month_grid(focused: NaiveDate, today: NaiveDate, events: &[Event]) -> MonthGrid {
    let start = month_grid_start(focused);
    let first = focused.with_day(1).unwrap_or(focused);
    let lead = first.weekday().num_days_from_sunday();

    let span = lead + days_in_month(focused);
    if span > MONTH_GRID_CELLS as u32 {
        debug!(
            "Month view truncates {} trailing day(s) of {}",
            span - MONTH_GRID_CELLS as u32,
            focused.format("%B %Y")
        );
    }

    let cells = (0..MONTH_GRID_CELLS as u64)
        .map(|i| {
            let date = start.checked_add_days(Days::new(i)).unwrap_or(start);
            DayCell {
                date,
                other_month: date.month() != focused.month() || date.year() != focused.year(),
                today: date == today,
                events: events_for_day(events, date),
            }
        })
        .collect();

    MonthGrid { cells }
}

fn day_column(date: NaiveDate, today: NaiveDate, events: &[Event]) -> DayColumn {
    let mut all_day = Vec::new();
    let mut blocks = Vec::new();

    for event in events_for_day(events, date) {
        match (event.start_time, event.end_time) {
            (Some(start), Some(end)) if !event.all_day => {
                let start_minutes = start.hour() * UNITS_PER_HOUR + start.minute();
                let end_minutes = end.hour() * UNITS_PER_HOUR + end.minute();
                let height = if end_minutes > start_minutes {
                    end_minutes - start_minutes
                } else {
                    warn!(
                        "Event {} ('{}') has end {} <= start {}; clamping height to 1",
                        event.id,
                        event.title,
                        end.format("%H:%M"),
                        start.format("%H:%M")
                    );
                    1
                };
                blocks.push(EventBlock {
                    offset: start_minutes,
                    height,
                    event,
                });
            }
            _ => all_day.push(event),
        }
    }

    blocks.sort_by_key(|b| b.offset);

    DayColumn {
        date,
        today: date == today,
        all_day,
        blocks,
    }
}

/// Build the week view: seven columns starting from the Sunday on or before
/// the focused date
pub fn week_grid(focused: NaiveDate, today: NaiveDate, events: &[Event]) -> TimeGrid {
    let start = week_start(focused);
    let days = (0..7)
        .map(|i| {
            let date = start.checked_add_days(Days::new(i)).unwrap_or(start);
            day_column(date, today, events)
        })
        .collect();
    TimeGrid { days }
}

/// Build the day view: a single column for the focused date
pub fn day_grid(focused: NaiveDate, today: NaiveDate, events: &[Event]) -> TimeGrid {
    TimeGrid {
        days: vec![day_column(focused, today, events)],
    }
}

/// 12-hour label for an hour slot: "12 AM", "1 AM", ... "12 PM", "11 PM"
pub fn hour_label(hour: u32) -> String {
    let suffix = if hour < 12 { "AM" } else { "PM" };
    let display = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{} {}", display, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventDraft;
    use chrono::NaiveTime;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_month_grid_always_35_cells() {
        for focused in [
            date(2024, 2, 1),  // leap February starting on Thursday
            date(2024, 3, 15), // 31-day month
            date(2026, 2, 10), // 28-day month starting on Sunday (exactly 4 rows)
            date(2024, 6, 1),  // 30-day month needing 6 rows
        ] {
            let grid = month_grid(focused, focused, &[]);
            assert_eq!(grid.cells.len(), 35, "focus {}", focused);
        }
    }

    #[test]
    fn test_first_of_month_lands_on_its_weekday_column() {
        let focused = date(2024, 3, 15);
        let grid = month_grid(focused, focused, &[]);
        // March 1, 2024 is a Friday: column index 5.
        let first_pos = grid
            .cells
            .iter()
            .position(|c| c.date == date(2024, 3, 1))
            .unwrap();
        assert_eq!(first_pos % 7, 5);
        assert_eq!(
            first_pos as u32,
            date(2024, 3, 1).weekday().num_days_from_sunday()
        );
    }

    #[test]
    fn test_march_2024_sequence_and_truncation() {
        let grid = month_grid(date(2024, 3, 15), date(2024, 3, 15), &[]);

        assert_eq!(grid.cells[0].date, date(2024, 2, 25));
        assert_eq!(grid.cells[34].date, date(2024, 3, 30));

        // The full 35-date run is contiguous.
        for (i, cell) in grid.cells.iter().enumerate() {
            assert_eq!(
                cell.date,
                date(2024, 2, 25) + chrono::Duration::days(i as i64)
            );
        }

        // Feb 25–29 spill over from the previous month.
        for cell in &grid.cells[..5] {
            assert!(cell.other_month);
        }
        for cell in &grid.cells[5..] {
            assert!(!cell.other_month);
        }

        // March 31 is dropped by the fixed five-row grid.
        assert!(grid.cells.iter().all(|c| c.date != date(2024, 3, 31)));
    }

    #[test]
    fn test_spillover_cells_still_carry_events() {
        let event = EventDraft::all_day("Leap day", date(2024, 2, 29)).into_event(1);
        let grid = month_grid(date(2024, 3, 15), date(2024, 3, 15), &[event]);

        let cell = grid
            .cells
            .iter()
            .find(|c| c.date == date(2024, 2, 29))
            .unwrap();
        assert!(cell.other_month);
        assert_eq!(cell.events.len(), 1);
        assert_eq!(cell.events[0].title, "Leap day");
    }

    #[test]
    fn test_today_flag() {
        let grid = month_grid(date(2024, 3, 15), date(2024, 3, 20), &[]);
        let flagged: Vec<_> = grid.cells.iter().filter(|c| c.today).collect();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].date, date(2024, 3, 20));
    }

    #[test]
    fn test_timed_event_offset_and_height() {
        let event =
            EventDraft::timed("Review", date(2024, 3, 15), time(9, 0), time(10, 30)).into_event(1);
        let grid = day_grid(date(2024, 3, 15), date(2024, 3, 15), &[event]);

        assert_eq!(grid.days.len(), 1);
        let block = &grid.days[0].blocks[0];
        assert_eq!(block.offset, 540);
        assert_eq!(block.height, 90);
    }

    #[test]
    fn test_inverted_times_clamp_to_one_unit() {
        let event =
            EventDraft::timed("Backwards", date(2024, 3, 15), time(10, 0), time(9, 0)).into_event(1);
        let grid = day_grid(date(2024, 3, 15), date(2024, 3, 15), &[event]);
        assert_eq!(grid.days[0].blocks[0].height, 1);
    }

    #[test]
    fn test_week_grid_columns_and_sorting() {
        let focused = date(2024, 3, 15); // Friday
        let events = vec![
            EventDraft::timed("Late", focused, time(15, 0), time(16, 0)).into_event(1),
            EventDraft::timed("Early", focused, time(8, 0), time(9, 0)).into_event(2),
            EventDraft::all_day("Offsite", date(2024, 3, 11)).into_event(3),
        ];
        let grid = week_grid(focused, focused, &events);

        assert_eq!(grid.days.len(), 7);
        assert_eq!(grid.days[0].date, date(2024, 3, 10));

        let friday = &grid.days[5];
        assert_eq!(friday.blocks[0].event.title, "Early");
        assert_eq!(friday.blocks[1].event.title, "Late");

        let monday = &grid.days[1];
        assert_eq!(monday.all_day.len(), 1);
        assert!(monday.blocks.is_empty());
    }

    #[test]
    fn test_hour_labels() {
        assert_eq!(hour_label(0), "12 AM");
        assert_eq!(hour_label(1), "1 AM");
        assert_eq!(hour_label(11), "11 AM");
        assert_eq!(hour_label(12), "12 PM");
        assert_eq!(hour_label(13), "1 PM");
        assert_eq!(hour_label(23), "11 PM");
    }
}
