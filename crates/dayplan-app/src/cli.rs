//! Interactive calendar REPL
//!
//! Slash commands drive the calendar; anything else goes to the chat
//! assistant. Command completion pops up on '/' like the rest of our CLIs.

use chrono::{Local, NaiveDate, NaiveTime};
use dayplan_core::auth::AuthService;
use dayplan_core::chat::Assistant;
use dayplan_core::config::Config;
use dayplan_core::event::{DEFAULT_EVENT_COLOR, Event, EventDraft};
use dayplan_core::store::{EventStore, KvStore};
use dayplan_core::view::mini::mini_calendar;
use dayplan_core::view::{ViewMode, ViewState, grid};
use nu_ansi_term::{Color, Style};
use reedline::{
    ColumnarMenu, Completer, DefaultHinter, Emacs, KeyCode, KeyModifiers, Keybindings,
    MenuBuilder, Prompt, Reedline, ReedlineEvent, ReedlineMenu, Signal, Suggestion,
};
use std::io::Write;
use std::sync::Arc;
use tracing::info;

use crate::render;

/// Available commands for autocomplete display
const COMMANDS: &[(&str, &str)] = &[
    ("/help", "Show available commands"),
    ("/month", "Switch to month view"),
    ("/week", "Switch to week view"),
    ("/day", "Switch to day view"),
    ("/prev", "Go to the previous period"),
    ("/next", "Go to the next period"),
    ("/today", "Jump to today (day view)"),
    ("/goto", "Focus a date: /goto 2024-03-15"),
    ("/events", "List events, optionally for one day"),
    ("/add", "Create an event"),
    ("/edit", "Edit an event: /edit <id>"),
    ("/delete", "Delete an event: /delete <id>"),
    ("/chat", "Show recent chat messages"),
    ("/status", "Show chat connection status"),
    ("/reconnect", "Retry the chat endpoint"),
    ("/whoami", "Show the logged-in user"),
    ("/logout", "Log out and exit"),
    ("/quit", "Exit"),
];

/// Command completer for reedline
#[derive(Clone)]
pub struct CommandCompleter {
    commands: Vec<(&'static str, &'static str)>,
}

impl CommandCompleter {
    pub fn new() -> Self {
        Self {
            commands: COMMANDS.to_vec(),
        }
    }
}

impl Default for CommandCompleter {
    fn default() -> Self {
        Self::new()
    }
}

impl Completer for CommandCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        if !line.starts_with('/') {
            return Vec::new();
        }

        self.commands
            .iter()
            .filter(|(cmd, _)| cmd.starts_with(line))
            .map(|(cmd, desc)| Suggestion {
                value: cmd.to_string(),
                description: Some(desc.to_string()),
                extra: None,
                span: reedline::Span::new(0, pos),
                append_whitespace: true,
                style: None,
            })
            .collect()
    }
}

/// Custom prompt with colored styling
struct ColoredPrompt {
    style: Style,
}

impl ColoredPrompt {
    fn new() -> Self {
        Self {
            style: Color::Cyan.bold(),
        }
    }
}

impl Prompt for ColoredPrompt {
    fn render_prompt_left(&self) -> std::borrow::Cow<'_, str> {
        std::borrow::Cow::Owned(self.style.paint("> ").to_string())
    }

    fn render_prompt_right(&self) -> std::borrow::Cow<'_, str> {
        std::borrow::Cow::Borrowed("")
    }

    fn render_prompt_indicator(
        &self,
        _prompt_mode: reedline::PromptEditMode,
    ) -> std::borrow::Cow<'_, str> {
        std::borrow::Cow::Borrowed("")
    }

    fn render_prompt_multiline_indicator(&self) -> std::borrow::Cow<'_, str> {
        std::borrow::Cow::Borrowed("")
    }

    fn render_prompt_history_search_indicator(
        &self,
        _history_search: reedline::PromptHistorySearch,
    ) -> std::borrow::Cow<'_, str> {
        std::borrow::Cow::Borrowed("")
    }
}

/// Run the calendar application
pub async fn run_app(config: Config) -> anyhow::Result<()> {
    let store = Arc::new(KvStore::open(&config.storage.db_path)?);
    let auth = AuthService::new(store.clone());

    let Some(email) = session_or_login(&auth)? else {
        return Ok(());
    };
    let name = auth.display_name(&email)?;

    let events = EventStore::new(store.clone(), &email);
    let mut assistant = Assistant::new(&config.chat, store.clone(), email.clone())?;
    let today = Local::now().date_naive();
    let mut state = ViewState::new(today);

    info!("Starting calendar REPL for {}", email);
    print_welcome(&name);

    assistant.post_welcome()?;
    assistant.connect().await?;
    print_status(&assistant);
    if let Some(last) = assistant.history()?.last() {
        render::render_message(last);
    }

    render_view(&state, &events, &assistant)?;

    // Setup keybindings
    let mut keybindings = default_keybindings();

    // Trigger completion on '/' key
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Char('/'),
        ReedlineEvent::Edit(vec![reedline::EditCommand::Complete]),
    );

    let menu = Box::new(
        ColumnarMenu::default()
            .with_name("command_menu")
            .with_columns(1)
            .with_column_width(Some(40))
            .with_only_buffer_difference(false),
    );

    let hinter = DefaultHinter::default().with_style(Style::new().dimmed());

    let mut line_editor = Reedline::create()
        .with_completer(Box::new(CommandCompleter::new()))
        .with_menu(ReedlineMenu::EngineCompleter(menu))
        .with_hinter(Box::new(hinter))
        .with_edit_mode(Box::new(Emacs::new(keybindings)));

    let prompt = ColoredPrompt::new();

    loop {
        let signal = line_editor.read_line(&prompt);

        match signal {
            Ok(Signal::Success(line)) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }

                if input.starts_with('/') {
                    if !handle_command(input, &mut state, &events, &mut assistant, &auth).await? {
                        break;
                    }
                } else {
                    handle_chat(input, &state, &events, &mut assistant).await?;
                }
            }
            Ok(Signal::CtrlC) => {
                println!("^C");
                continue;
            }
            Ok(Signal::CtrlD) => {
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                eprintln!("\nError: {}\n", err);
                break;
            }
        }
    }

    Ok(())
}

/// Default keybindings for reedline
fn default_keybindings() -> Keybindings {
    let mut keybindings = Keybindings::new();
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Tab,
        ReedlineEvent::Edit(vec![reedline::EditCommand::Complete]),
    );
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Enter, ReedlineEvent::Submit);
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Esc, ReedlineEvent::Esc);
    keybindings.add_binding(
        KeyModifiers::CONTROL,
        KeyCode::Char('c'),
        ReedlineEvent::CtrlC,
    );
    keybindings.add_binding(
        KeyModifiers::CONTROL,
        KeyCode::Char('d'),
        ReedlineEvent::CtrlD,
    );
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Up, ReedlineEvent::Up);
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Down, ReedlineEvent::Down);
    keybindings
}

/// Handle a slash command; returns false when the REPL should exit
async fn handle_command(
    input: &str,
    state: &mut ViewState,
    events: &EventStore,
    assistant: &mut Assistant,
    auth: &AuthService,
) -> anyhow::Result<bool> {
    let mut parts = input.splitn(2, char::is_whitespace);
    let command = parts.next().unwrap_or("").to_lowercase();
    let arg = parts.next().unwrap_or("").trim();

    match command.as_str() {
        "/quit" | "/exit" | "/q" => {
            println!("\nGoodbye!");
            return Ok(false);
        }
        "/help" | "/?" => print_help(),
        "/month" => {
            state.set_mode(ViewMode::Month);
            render_view(state, events, assistant)?;
        }
        "/week" => {
            state.set_mode(ViewMode::Week);
            render_view(state, events, assistant)?;
        }
        "/day" => {
            state.set_mode(ViewMode::Day);
            render_view(state, events, assistant)?;
        }
        "/prev" => {
            state.navigate(-1);
            render_view(state, events, assistant)?;
        }
        "/next" => {
            state.navigate(1);
            render_view(state, events, assistant)?;
        }
        "/today" => {
            state.go_to_today(Local::now().date_naive());
            render_view(state, events, assistant)?;
        }
        "/goto" => match NaiveDate::parse_from_str(arg, "%Y-%m-%d") {
            Ok(date) => {
                state.goto(date);
                render_view(state, events, assistant)?;
            }
            Err(_) => println!("Usage: /goto YYYY-MM-DD"),
        },
        "/events" => {
            let listed = if arg.is_empty() {
                events.list_all()?
            } else {
                match NaiveDate::parse_from_str(arg, "%Y-%m-%d") {
                    Ok(date) => events.list_for_day(date)?,
                    Err(_) => {
                        println!("Usage: /events [YYYY-MM-DD]");
                        return Ok(true);
                    }
                }
            };
            print_event_list(&listed);
        }
        "/add" => {
            add_event_flow(events, state.focused)?;
            render_view(state, events, assistant)?;
        }
        "/edit" => match arg.parse::<i64>() {
            Ok(id) => {
                edit_event_flow(events, id)?;
                render_view(state, events, assistant)?;
            }
            Err(_) => println!("Usage: /edit <id> (see /events for ids)"),
        },
        "/delete" => match arg.parse::<i64>() {
            Ok(id) => {
                delete_event_flow(events, id)?;
                render_view(state, events, assistant)?;
            }
            Err(_) => println!("Usage: /delete <id> (see /events for ids)"),
        },
        "/chat" => {
            let count = arg.parse::<usize>().unwrap_or(10);
            let history = assistant.history()?;
            let start = history.len().saturating_sub(count);
            println!();
            for message in &history[start..] {
                render::render_message(message);
            }
            println!();
        }
        "/status" => {
            print_status(assistant);
            println!("API URL: {}", assistant.api_url());
        }
        "/reconnect" => {
            let before = assistant.history()?.len();
            assistant.reconnect().await?;
            for message in &assistant.history()?[before..] {
                render::render_message(message);
            }
            print_status(assistant);
        }
        "/whoami" => {
            if let Some(email) = auth.current_user()? {
                println!("{} <{}>", auth.display_name(&email)?, email);
            } else {
                println!("Not logged in.");
            }
        }
        "/logout" => {
            auth.logout()?;
            println!("Logged out.");
            return Ok(false);
        }
        _ => {
            println!(
                "Unknown command: {}. Type /help for the command list.",
                command
            );
        }
    }

    Ok(true)
}

/// Send a line to the chat assistant and print whatever comes back
async fn handle_chat(
    input: &str,
    state: &ViewState,
    events: &EventStore,
    assistant: &mut Assistant,
) -> anyhow::Result<()> {
    let before = events.list_all()?;

    let replies = assistant.send(input).await?;
    println!();
    for reply in &replies {
        render::render_message(reply);
    }
    println!();

    // The assistant may have pulled a fresh event list from the server.
    let after = events.list_all()?;
    if before != after {
        render_view(state, events, assistant)?;
    }

    Ok(())
}

/// Render the mini calendar plus the active view
fn render_view(
    state: &ViewState,
    events: &EventStore,
    assistant: &Assistant,
) -> anyhow::Result<()> {
    let today = Local::now().date_naive();
    let all = events.list_all()?;

    render::render_header(
        &state.header_title(),
        state.mode.label(),
        assistant.status().label(),
    );
    render::render_mini(&mini_calendar(state.focused, today));

    match state.mode {
        ViewMode::Month => render::render_month(&grid::month_grid(state.focused, today, &all)),
        ViewMode::Week => render::render_time_grid(&grid::week_grid(state.focused, today, &all)),
        ViewMode::Day => render::render_time_grid(&grid::day_grid(state.focused, today, &all)),
    }

    Ok(())
}

fn print_status(assistant: &Assistant) {
    println!(
        "Connection: {}",
        Style::new().bold().paint(assistant.status().label())
    );
}

fn print_event_list(events: &[Event]) {
    if events.is_empty() {
        println!("No events scheduled.");
        return;
    }
    println!();
    for event in events {
        println!(
            "  {:>14}  {}  {:<13}  {}",
            event.id,
            event.date,
            event.time_label(),
            event.title
        );
    }
    println!();
}

// ============================================================================
// Interactive flows (blocking prompts)
// ============================================================================

fn prompt_line(prompt: &str) -> anyhow::Result<String> {
    print!("{}", prompt);
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn prompt_time(prompt: &str) -> anyhow::Result<Option<NaiveTime>> {
    let input = prompt_line(prompt)?;
    if input.is_empty() {
        return Ok(None);
    }
    match NaiveTime::parse_from_str(&input, "%H:%M") {
        Ok(time) => Ok(Some(time)),
        Err(_) => {
            println!("Times use 24-hour HH:MM.");
            Ok(None)
        }
    }
}

/// Log in, sign up, or bail out; returns the session email
fn session_or_login(auth: &AuthService) -> anyhow::Result<Option<String>> {
    if let Some(email) = auth.current_user()? {
        return Ok(Some(email));
    }

    loop {
        println!("No active session. [l]og in, [s]ign up, or [q]uit.");
        match prompt_line("> ")?.to_lowercase().as_str() {
            "l" | "login" => {
                let email = prompt_line("Email: ")?;
                let password = prompt_line("Password: ")?;
                match auth.login(&email, &password) {
                    Ok(user) => {
                        println!("Welcome back, {}!", user.name);
                        return Ok(Some(user.email));
                    }
                    Err(dayplan_core::Error::Auth(e)) => println!("{}", e),
                    Err(e) => return Err(e.into()),
                }
            }
            "s" | "signup" => {
                let name = prompt_line("Name: ")?;
                let email = prompt_line("Email: ")?;
                let password = prompt_line("Password: ")?;
                let confirm = prompt_line("Confirm password: ")?;
                match auth.signup(&name, &email, &password, &confirm) {
                    Ok(user) => {
                        println!("Welcome, {}!", user.name);
                        return Ok(Some(user.email));
                    }
                    Err(dayplan_core::Error::Auth(e)) => println!("{}", e),
                    Err(e) => return Err(e.into()),
                }
            }
            "q" | "quit" => return Ok(None),
            _ => {}
        }
    }
}

/// Prompt for a new event's fields and add it
fn add_event_flow(events: &EventStore, default_date: NaiveDate) -> anyhow::Result<()> {
    let title = prompt_line("Title: ")?;

    let date_input = prompt_line(&format!("Date [{}]: ", default_date))?;
    let date = if date_input.is_empty() {
        default_date
    } else {
        match NaiveDate::parse_from_str(&date_input, "%Y-%m-%d") {
            Ok(date) => date,
            Err(_) => {
                println!("Dates use YYYY-MM-DD.");
                return Ok(());
            }
        }
    };

    let all_day = prompt_line("All day? [y/N]: ")?.eq_ignore_ascii_case("y");

    let mut draft = EventDraft::all_day(title, date);
    draft.all_day = all_day;
    if !all_day {
        draft.start_time = prompt_time("Start time (HH:MM): ")?;
        draft.end_time = prompt_time("End time (HH:MM): ")?;
    }

    let color = prompt_line(&format!("Color [{}]: ", DEFAULT_EVENT_COLOR))?;
    if !color.is_empty() {
        draft = draft.with_color(color);
    }
    let notes = prompt_line("Notes (optional): ")?;
    if !notes.is_empty() {
        draft = draft.with_notes(notes);
    }

    match events.add(draft) {
        Ok(event) => println!("Added '{}' on {}.", event.title, event.date),
        // Validation messages are user-facing text, shown inline.
        Err(e) => println!("{}", e),
    }
    Ok(())
}

/// Prompt for replacement fields for an existing event
fn edit_event_flow(events: &EventStore, id: i64) -> anyhow::Result<()> {
    let Some(current) = events.get(id)? else {
        println!("No event with id {}.", id);
        return Ok(());
    };

    println!("Editing '{}' ({})", current.title, current.date);

    let title_input = prompt_line(&format!("Title [{}]: ", current.title))?;
    let title = if title_input.is_empty() {
        current.title.clone()
    } else {
        title_input
    };

    let date_input = prompt_line(&format!("Date [{}]: ", current.date))?;
    let date = if date_input.is_empty() {
        current.date
    } else {
        match NaiveDate::parse_from_str(&date_input, "%Y-%m-%d") {
            Ok(date) => date,
            Err(_) => {
                println!("Dates use YYYY-MM-DD.");
                return Ok(());
            }
        }
    };

    let all_day_default = if current.all_day { "Y/n" } else { "y/N" };
    let all_day_input = prompt_line(&format!("All day? [{}]: ", all_day_default))?;
    let all_day = if all_day_input.is_empty() {
        current.all_day
    } else {
        all_day_input.eq_ignore_ascii_case("y")
    };

    let mut draft = EventDraft::all_day(title, date).with_color(current.color.clone());
    draft.all_day = all_day;
    draft.notes = current.notes.clone();
    if !all_day {
        draft.start_time = prompt_time("Start time (HH:MM): ")?.or(current.start_time);
        draft.end_time = prompt_time("End time (HH:MM): ")?.or(current.end_time);
    }

    match events.update(id, draft) {
        Ok(true) => println!("Updated event {}.", id),
        Ok(false) => println!("No event with id {}.", id),
        Err(e) => println!("{}", e),
    }
    Ok(())
}

/// Confirm and delete an event
fn delete_event_flow(events: &EventStore, id: i64) -> anyhow::Result<()> {
    let Some(event) = events.get(id)? else {
        println!("No event with id {}.", id);
        return Ok(());
    };

    let confirm = prompt_line(&format!("Delete '{}'? [y/N]: ", event.title))?;
    if !confirm.eq_ignore_ascii_case("y") {
        println!("Kept.");
        return Ok(());
    }

    if events.remove(id)? {
        println!("Deleted event {}.", id);
    }
    Ok(())
}

/// Print welcome message
fn print_welcome(name: &str) {
    println!();
    println!("╔════════════════════════════════════════════════════════════╗");
    println!("║  📅 dayplan - calendar assistant                           ║");
    println!("╠════════════════════════════════════════════════════════════╣");
    println!("║  Type a message to chat with the assistant                 ║");
    println!("║  Commands: /help, /add, /events, /month, /week, /day       ║");
    println!("║  Typing / shows the full command menu                      ║");
    println!("╚════════════════════════════════════════════════════════════╝");
    println!();
    println!("Hello, {}!", name);
}

/// Print help message
fn print_help() {
    println!();
    println!("Available commands:");
    for (cmd, desc) in COMMANDS {
        println!("  {:<12} {}", cmd, desc);
    }
    println!();
    println!("Anything that is not a command is sent to the chat assistant.");
    println!();
}
