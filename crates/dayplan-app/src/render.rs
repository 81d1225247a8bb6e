//! Text rendering of the view model
//!
//! Consumes the layout structures from dayplan-core and prints them; no
//! layout decisions are made here beyond formatting.

use chrono::Datelike;
use dayplan_core::chat::{ChatMessage, describe_suggestion};
use dayplan_core::view::grid::{HOURS_PER_DAY, MonthGrid, TimeGrid, UNITS_PER_HOUR, hour_label};
use dayplan_core::view::mini::{MiniCalendar, WEEKDAY_HEADER};
use nu_ansi_term::{Color, Style};

/// Title line above the active view
pub fn render_header(title: &str, mode_label: &str, status_label: &str) {
    println!();
    println!(
        "{}  [{} view]  {}",
        Color::Yellow.bold().paint(title),
        mode_label,
        Style::new().dimmed().paint(status_label),
    );
    println!();
}

/// Month grid: a 5x7 block of day numbers with an event list below.
/// Days carrying events are marked with a dot.
pub fn render_month(grid: &MonthGrid) {
    println!("  Sun  Mon  Tue  Wed  Thu  Fri  Sat");

    for week in grid.weeks() {
        let mut line = String::new();
        for cell in week {
            let marker = if cell.events.is_empty() { ' ' } else { '·' };
            let text = format!("{:>4}{}", cell.date.day(), marker);
            let styled = if cell.today {
                Color::Cyan.bold().paint(text).to_string()
            } else if cell.other_month {
                Style::new().dimmed().paint(text).to_string()
            } else {
                text
            };
            line.push_str(&styled);
        }
        println!("{}", line);
    }

    let mut printed_any = false;
    for cell in &grid.cells {
        for event in &cell.events {
            if !printed_any {
                println!();
                printed_any = true;
            }
            println!(
                "  {:>6}  {:<13}  {}",
                cell.date.format("%b %-d").to_string(),
                event.time_label(),
                event.title
            );
        }
    }
}

/// Week or day view. A single column prints the full 24-hour rail; a week
/// prints one summarized section per day.
pub fn render_time_grid(grid: &TimeGrid) {
    let detailed = grid.days.len() == 1;

    for day in &grid.days {
        let mut header = day.date.format("%A, %B %-d").to_string();
        if day.today {
            header.push_str(" (today)");
        }
        println!("{}", Color::Cyan.bold().paint(header));

        for event in &day.all_day {
            println!("  {:>8}   {}", "All day", event.title);
        }

        if detailed {
            for hour in 0..HOURS_PER_DAY {
                let starting: Vec<_> = day
                    .blocks
                    .iter()
                    .filter(|b| b.offset / UNITS_PER_HOUR == hour)
                    .collect();
                if starting.is_empty() {
                    println!(
                        "  {:>8} {}",
                        Style::new().dimmed().paint(hour_label(hour)),
                        Style::new().dimmed().paint("|")
                    );
                } else {
                    for block in starting {
                        println!(
                            "  {:>8} | {}  {}",
                            hour_label(hour),
                            block.event.time_label(),
                            block.event.title
                        );
                    }
                }
            }
        } else {
            if day.all_day.is_empty() && day.blocks.is_empty() {
                println!("  {}", Style::new().dimmed().paint("(no events)"));
            }
            for block in &day.blocks {
                println!("  {:>13}  {}", block.event.time_label(), block.event.title);
            }
        }
        println!();
    }
}

/// Sidebar mini calendar
pub fn render_mini(mini: &MiniCalendar) {
    println!("  {}", Style::new().bold().paint(&mini.title));

    let mut header = String::from(" ");
    for day in WEEKDAY_HEADER {
        header.push_str(&format!("{:>3}", day));
    }
    println!("{}", Style::new().dimmed().paint(header));

    for week in mini.weeks() {
        let mut line = String::from(" ");
        for cell in week {
            match cell {
                None => line.push_str("   "),
                Some(day) => {
                    let text = format!("{:>3}", day.day);
                    let styled = if day.today {
                        Color::Cyan.bold().paint(text).to_string()
                    } else if day.selected {
                        Style::new().reverse().paint(text).to_string()
                    } else {
                        text
                    };
                    line.push_str(&styled);
                }
            }
        }
        println!("{}", line);
    }
    println!();
}

/// One chat message, with its suggestion summary and the matching hint
pub fn render_message(message: &ChatMessage) {
    let who = if message.sent {
        Color::Cyan.bold().paint("You")
    } else {
        Color::Green.bold().paint("Assistant")
    };
    println!("{}: {}", who, message.text);

    if message.event_suggestion {
        if let Some(data) = &message.event_data {
            for line in describe_suggestion(data).lines() {
                println!("    {}", line);
            }
            let hint = if message.fallback_mode {
                "Create it manually with /add."
            } else {
                "Reply 'Yes' to add this event or 'No' to cancel."
            };
            println!("    {}", Style::new().dimmed().paint(hint));
        }
    }
}
