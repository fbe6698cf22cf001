//! clinput - interactive terminal input demo
//!
//! Walks through a small submission form: email, password and a project
//! picked from a menu, then prints what was entered.
//!
//! ```text
//! clinput            # Run against the terminal
//! clinput --demo     # Run headless with scripted keys and dump the screen
//! ```

use std::env;

use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use clinput::config::{data_dir, Config};
use clinput::ui::Prompts;
use clinput::{CrosstermBackend, Key, SelectionMenu, Session, TerminalBackend, VirtualScreen};

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

const PROJECTS: &[&str] = &["pset1", "final project", "project2"];

/// Command line options
#[derive(Default)]
struct Args {
    /// Run headless against a virtual screen
    demo: bool,
    /// Write the effective configuration to disk and exit
    init_config: bool,
}

fn print_version() {
    eprintln!("clinput {}", VERSION);
}

fn print_help() {
    eprintln!("clinput {} - interactive terminal input demo", VERSION);
    eprintln!();
    eprintln!("Usage: clinput [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --demo                Run with scripted keys and print the final screen");
    eprintln!("  --init-config         Write the current settings to the config file");
    eprintln!("  -v, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Keys:");
    eprintln!("  Enter                 Submit a field / choose a menu item");
    eprintln!("  Space                 Choose a menu item");
    eprintln!("  Up/Down               Move in a menu");
    eprintln!("  Backspace             Delete the last character");
    eprintln!("  Ctrl+C                Quit");
    eprintln!();
    eprintln!("Configuration: ~/.clinput/config.toml");
    eprintln!("Log file:      ~/.clinput/clinput.log");
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args::default();
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            "--demo" => args.demo = true,
            "--init-config" => args.init_config = true,
            other => return Err(format!("Unknown argument: {}. Use -h for help.", other)),
        }
    }
    Ok(args)
}

/// Log to `~/.clinput/clinput.log`; the terminal itself is busy drawing widgets.
fn init_logging(config: &Config) {
    let Some(dir) = data_dir() else {
        return;
    };
    if std::fs::create_dir_all(&dir).is_err() {
        return;
    }
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("clinput.log"));

    if let Ok(file) = log_file {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}

/// Answers collected by the form
struct Submission {
    email: String,
    password_len: usize,
    project: &'static str,
}

/// Run the form against any backend
fn run_form<B: TerminalBackend>(session: &mut Session<B>, prompts: &Prompts) -> clinput::Result<Submission> {
    let email = prompts.email(session)?;
    let password = prompts.password(session, "")?;
    let project = SelectionMenu::select(session, PROJECTS, "Project to submit")?;
    session.print("Submitting...")?;
    Ok(Submission {
        email,
        password_len: password.len(),
        project: PROJECTS[project],
    })
}

fn report(submission: &Submission) {
    println!("Email:    {}", submission.email);
    println!("Password: {} characters", submission.password_len);
    println!("Project:  {}", submission.project);
}

fn run_terminal(config: &Config) -> anyhow::Result<()> {
    let prompts = Prompts::new(&config.prompts);
    let mut session = Session::with_header(CrosstermBackend::new(), &config.title, &config.subtitle)?;

    // Dropping the session on the error path restores the terminal
    let submission = run_form(&mut session, &prompts)?;
    session.close()?;

    report(&submission);
    Ok(())
}

/// Headless run with scripted keys
fn run_demo(config: &Config) -> anyhow::Result<()> {
    println!("=== clinput Demo Mode ===\n");

    let mut screen = VirtualScreen::new(16, 48);
    screen.type_text("tommy\r");
    screen.type_text("tommy@cs50.net\r");
    screen.type_text("secretz");
    screen.push_keys([Key::Backspace, Key::Enter]);
    screen.push_keys([Key::ArrowDown, Key::ArrowDown, Key::ArrowUp, Key::Enter]);

    let prompts = Prompts::new(&config.prompts);
    let submission = {
        let mut session = Session::with_header(&mut screen, &config.title, &config.subtitle)?;
        let submission = run_form(&mut session, &prompts)?;
        session.close()?;
        submission
    };

    println!("{}", screen.dump());
    report(&submission);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };

    // Logging needs the config, so a broken file is reported once the
    // subscriber is installed
    let loaded = Config::load();
    let config = loaded.as_ref().cloned().unwrap_or_default();
    init_logging(&config);
    info!("clinput {} starting (demo: {})", VERSION, args.demo);
    if let Err(e) = &loaded {
        warn!("ignoring invalid config, using defaults: {:#}", e);
        eprintln!("Warning: ignoring invalid config: {:#}", e);
    }

    if args.init_config {
        config.save()?;
        if let Some(path) = Config::path() {
            eprintln!("Wrote {}", path.display());
        }
        return Ok(());
    }

    let result = if args.demo {
        run_demo(&config)
    } else {
        run_terminal(&config)
    };

    if let Err(e) = &result {
        warn!("exiting with error: {}", e);
    }
    result
}
