//! helpqueue - a terminal client for a live, shared help-desk ticket queue.

use std::io::{self, BufRead, IsTerminal, Stdout, Write};
use std::panic;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use crossterm::{
    event::{self as term_event, Event as TermEvent, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info, warn};

use helpqueue::app::App;
use helpqueue::auth::{self, AuthProvider, FirebaseAuth, Session, User};
use helpqueue::config::{Config, Profile};
use helpqueue::elapsed::SystemClock;
use helpqueue::error::AppError;
use helpqueue::events::{is_force_quit, EventHandler};
use helpqueue::logging;
use helpqueue::queue::QueueController;
use helpqueue::store::{
    FirestoreStore, MemoryStore, TicketStore, DEFAULT_FIRESTORE_URL, TICKETS_COLLECTION,
    TIME_OPEN_FIELD,
};
use helpqueue::tasks::{create_task_channel, FeedEvent, QueueMessage, TaskHandle, TaskSpawner};
use helpqueue::ticket::TicketFields;
use helpqueue::ui::Theme;

#[derive(Debug, Parser)]
#[command(name = "helpqueue", version, about = "A live help-desk ticket queue in your terminal")]
struct Cli {
    /// Profile to use instead of the configured default.
    #[arg(long, short, global = true)]
    profile: Option<String>,

    /// Run against an in-memory queue with sample tickets.
    #[arg(long)]
    demo: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Save the password for a profile in the OS keyring.
    Login,
    /// Remove the saved password for a profile.
    Logout,
    /// Print where the config file lives.
    ConfigPath,
}

/// Everything the TUI needs, wired up for either the demo or a real project.
struct Wiring {
    store: Arc<dyn TicketStore>,
    auth: Arc<dyn AuthProvider>,
    theme: Theme,
    context_label: String,
    refresh_interval: Duration,
    startup_error: Option<AppError>,
    notice: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init() {
        eprintln!("Warning: could not initialise logging: {}", e);
    }

    let result = match cli.command {
        Some(Command::ConfigPath) => {
            println!("{}", Config::path()?.display());
            Ok(())
        }
        Some(Command::Login) => login(cli.profile.as_deref()).await,
        Some(Command::Logout) => logout(cli.profile.as_deref()),
        None => {
            let wiring = if cli.demo {
                demo_wiring()
            } else {
                remote_wiring(cli.profile.as_deref()).await?
            };
            run(wiring).await
        }
    };

    if let Err(e) = &result {
        error!(error = %e, "Exiting with error");
    }
    logging::shutdown();
    result
}

fn load_profile(name: Option<&str>) -> Result<(Config, Profile)> {
    let config = Config::load().context("Failed to load configuration")?;
    let profile = config
        .resolve_profile(name)
        .map_err(AppError::from)
        .map_err(|e| anyhow::anyhow!(e.user_message()))?
        .clone();
    Ok((config, profile))
}

async fn login(profile_name: Option<&str>) -> Result<()> {
    let (mut config, profile) = load_profile(profile_name)?;

    let password = read_password(&format!("Password for {} ({}): ", profile.email, profile.name))?;

    let firebase = FirebaseAuth::new(profile.api_key.as_str(), Session::new())?;
    firebase
        .sign_in(&profile.email, &password)
        .await
        .map_err(|e| anyhow::anyhow!(AppError::from(e).user_message()))?;
    auth::store_password(&profile.name, &password)?;
    println!("Signed in. Password saved for profile '{}'.", profile.name);

    if config.adopt_default_profile(&profile.name) {
        config.save().context("Failed to save configuration")?;
        println!("'{}' is now the default profile.", profile.name);
    }
    Ok(())
}

/// What a key does to a password being typed.
#[derive(Debug, PartialEq, Eq)]
enum PasswordKey {
    Continue,
    Done,
    Cancelled,
}

fn apply_password_key(password: &mut String, key: KeyEvent) -> PasswordKey {
    if is_force_quit(&key) {
        return PasswordKey::Cancelled;
    }
    match key.code {
        KeyCode::Enter => PasswordKey::Done,
        KeyCode::Esc => PasswordKey::Cancelled,
        KeyCode::Backspace => {
            password.pop();
            PasswordKey::Continue
        }
        KeyCode::Char(c) => {
            password.push(c);
            PasswordKey::Continue
        }
        _ => PasswordKey::Continue,
    }
}

/// Prompt for a password without echoing it.
///
/// Piped input is read as a plain line.
fn read_password(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;

    if !io::stdin().is_terminal() {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        println!();
        return Ok(line.trim_end_matches(['\r', '\n']).to_string());
    }

    enable_raw_mode().context("Failed to enable raw mode")?;
    let result = read_hidden_line();
    disable_raw_mode().context("Failed to disable raw mode")?;
    println!();
    result
}

fn read_hidden_line() -> Result<String> {
    let mut password = String::new();
    loop {
        let TermEvent::Key(key) = term_event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match apply_password_key(&mut password, key) {
            PasswordKey::Continue => {}
            PasswordKey::Done => return Ok(password),
            PasswordKey::Cancelled => anyhow::bail!("Login cancelled"),
        }
    }
}

fn logout(profile_name: Option<&str>) -> Result<()> {
    let (_, profile) = load_profile(profile_name)?;
    auth::delete_password(&profile.name)?;
    println!("Password removed for profile '{}'.", profile.name);
    Ok(())
}

fn theme_for(config: &Config) -> Theme {
    Theme::from_name(&config.settings.theme).unwrap_or_else(|| {
        warn!(theme = %config.settings.theme, "Unknown theme, using dark");
        Theme::dark()
    })
}

fn demo_wiring() -> Wiring {
    let config = Config::load().unwrap_or_else(|e| {
        warn!("Failed to load config, using default: {}", e);
        Config::default()
    });

    let store = MemoryStore::new(Arc::new(SystemClock));
    let now = Utc::now();
    let samples = [
        ("Alice", "Lab 2, seat 14", "Segfault in linked list", 47),
        ("Bob and Priya", "Room 101", "Git merge went wrong", 12),
        ("Chen", "Library", "Tests pass locally but not on CI", 3),
    ];
    for (names, location, issue, minutes_ago) in samples {
        store.seed(
            TICKETS_COLLECTION,
            TicketFields::new(names, location, issue),
            now - chrono::Duration::minutes(minutes_ago),
        );
    }

    info!("Running in demo mode");
    Wiring {
        store: Arc::new(store),
        auth: Arc::new(Session::signed_in(User::local("Demo"))),
        theme: theme_for(&config),
        context_label: "demo".to_string(),
        refresh_interval: config.settings.refresh_interval(),
        startup_error: None,
        notice: Some("Demo mode: tickets live in memory and vanish on exit.".to_string()),
    }
}

async fn remote_wiring(profile_name: Option<&str>) -> Result<Wiring> {
    let (config, profile) = load_profile(profile_name)?;
    info!(profile = %profile.name, project_id = %profile.project_id, "Using profile");

    let firebase = Arc::new(FirebaseAuth::new(profile.api_key.as_str(), Session::new())?);
    let startup_error = match auth::get_password(&profile.name) {
        Ok(password) => match firebase.sign_in(&profile.email, &password).await {
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "Sign-in failed");
                Some(AppError::from(e))
            }
        },
        Err(e) => {
            warn!(error = %e, "No saved password");
            Some(AppError::from(e))
        }
    };

    let base_url = profile
        .firestore_url
        .as_deref()
        .unwrap_or(DEFAULT_FIRESTORE_URL);
    let store = FirestoreStore::new(
        base_url,
        &profile.project_id,
        Arc::clone(&firebase),
        config.settings.poll_interval(),
    )?;

    Ok(Wiring {
        store: Arc::new(store),
        auth: firebase,
        theme: theme_for(&config),
        context_label: profile.name.clone(),
        refresh_interval: config.settings.refresh_interval(),
        startup_error,
        notice: None,
    })
}

async fn run(wiring: Wiring) -> Result<()> {
    let controller = QueueController::new(Arc::clone(&wiring.auth), Arc::new(SystemClock));
    let mut app = App::new(controller, wiring.theme, wiring.context_label);
    if let Some(error) = &wiring.startup_error {
        app.handle_error(error);
    }
    if let Some(notice) = wiring.notice {
        app.notify_info(notice);
    }

    install_panic_hook();
    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, &mut app, &wiring.store, wiring.refresh_interval).await;
    restore_terminal()?;
    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    store: &Arc<dyn TicketStore>,
    refresh_interval: Duration,
) -> Result<()> {
    let (mut rx, spawner) = create_task_channel();
    let events = EventHandler::new();
    let mut timer = spawner.spawn_wait_time_timer(refresh_interval);
    let mut feed: Option<TaskHandle> = None;

    let result = loop {
        sync_feed(app, store, &spawner, &mut feed).await;

        if let Err(e) = terminal.draw(|frame| app.view(frame)) {
            break Err(e).context("Failed to draw");
        }

        let event = match tokio::task::block_in_place(|| events.next()) {
            Ok(event) => event,
            Err(e) => break Err(e).context("Failed to read terminal event"),
        };
        if let Some(command) = app.update(event) {
            spawner.spawn_command(store, command);
        }

        while let Ok(message) = rx.try_recv() {
            app.handle_message(message);
        }

        if app.should_quit() {
            break Ok(());
        }
    };

    if let Some(mut feed) = feed.take() {
        feed.close();
    }
    timer.close();
    result
}

/// Open the live feed once someone is signed in, and drop it when they
/// sign out.
async fn sync_feed(
    app: &mut App,
    store: &Arc<dyn TicketStore>,
    spawner: &TaskSpawner,
    feed: &mut Option<TaskHandle>,
) {
    let controller = app.controller();
    if !controller.is_signed_in() {
        if let Some(mut handle) = feed.take() {
            info!("Signed out, closing ticket feed");
            handle.close();
        }
        return;
    }
    if feed.is_some() || controller.last_error().is_some() {
        return;
    }

    match store.subscribe(TICKETS_COLLECTION, TIME_OPEN_FIELD).await {
        Ok(subscription) => *feed = Some(spawner.spawn_feed(subscription)),
        Err(e) => {
            warn!(error = %e, "Could not subscribe to tickets");
            let message = AppError::from(e).user_message();
            app.handle_message(QueueMessage::Feed(FeedEvent::Failed(message)));
        }
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout)).context("Failed to create terminal")?;
    Ok(terminal)
}

fn restore_terminal() -> Result<()> {
    // Leave the alternate screen while still in raw mode.
    execute!(io::stdout(), LeaveAlternateScreen).context("Failed to leave alternate screen")?;
    disable_raw_mode().context("Failed to disable raw mode")?;
    Ok(())
}

fn install_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_password_keys_build_the_secret() {
        let mut password = String::new();
        for c in "hunter22".chars() {
            assert_eq!(
                apply_password_key(&mut password, key(KeyCode::Char(c))),
                PasswordKey::Continue
            );
        }
        apply_password_key(&mut password, key(KeyCode::Backspace));

        assert_eq!(apply_password_key(&mut password, key(KeyCode::Enter)), PasswordKey::Done);
        assert_eq!(password, "hunter2");
    }

    #[test]
    fn test_password_prompt_can_be_cancelled() {
        let mut password = "abc".to_string();
        assert_eq!(
            apply_password_key(&mut password, key(KeyCode::Esc)),
            PasswordKey::Cancelled
        );
        assert_eq!(
            apply_password_key(
                &mut password,
                KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)
            ),
            PasswordKey::Cancelled
        );
        assert_eq!(password, "abc");
    }
}
