use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use engdict::commands::{CommandRegistry, CommandResult, SessionInfo};
use engdict::config::{Config, Overrides, SettingKey, Settings};
use engdict::consts::default_db_path;
use engdict::display::{self, BannerInfo, NO_DOCUMENT_MESSAGE, print_banner};
use engdict::editor::{Document, DocumentWord, Position, Selection, word_from_document};
use engdict::lookup::{Lookup, LookupOutcome};
use engdict::source::chrome::ChromeSource;
use engdict::spinner::Spinner;

#[derive(Parser)]
#[command(
    name = "engdict",
    version,
    about = "Look up English words in an English-Korean dictionary."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Word to look up. Omit it (and --file) for an interactive prompt
    #[arg(conflicts_with = "file")]
    word: Option<String>,

    /// Resolve the word from this document (`-` reads stdin)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Cursor position in --file, as LINE:COL (1-based)
    #[arg(long, requires = "file", conflicts_with = "select")]
    at: Option<Position>,

    /// Selection in --file, as LINE:COL-LINE:COL (1-based)
    #[arg(long, requires = "file")]
    select: Option<Selection>,

    /// Seconds to wait for results to render
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Maximum number of meanings to show
    #[arg(short, long)]
    max: Option<usize>,

    /// Search page template containing {word}
    #[arg(long)]
    search_url: Option<String>,

    /// User agent for the headless browser
    #[arg(long)]
    user_agent: Option<String>,

    /// Print the result as JSON
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Open the search page in your browser instead of scraping it
    #[arg(long, default_value_t = false)]
    open: bool,

    /// No spinner
    #[arg(short, long, default_value_t = false)]
    quiet: bool,

    /// More log output (-v debug, -vv trace). RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Settings database path (use :memory: for none)
    #[arg(long, global = true)]
    db: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Show or change stored settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show every setting with its effective value
    List,
    /// Show one setting
    Get { key: SettingKey },
    /// Store a setting
    Set { key: SettingKey, value: String },
    /// Remove a stored setting, restoring its default
    Unset { key: SettingKey },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let db_path = cli
        .db
        .clone()
        .unwrap_or_else(|| default_db_path().to_string_lossy().into_owned());
    let config = Config::open(&db_path)?;

    if let Some(Command::Config { action }) = &cli.command {
        handle_config(&config, action)?;
        return Ok(ExitCode::SUCCESS);
    }

    let overrides = Overrides {
        search_url: cli.search_url.clone(),
        user_agent: cli.user_agent.clone(),
        wait_timeout_secs: cli.timeout,
        max_meanings: cli.max,
    };
    let settings = Settings::load(&config, &overrides)?;
    tracing::debug!(?settings, db = %db_path, "settings loaded");

    let word = match (&cli.file, &cli.word) {
        (Some(path), _) => {
            let document = match Document::read_from(path) {
                Ok(document) => document,
                Err(e) => {
                    eprintln!("{NO_DOCUMENT_MESSAGE}");
                    eprintln!("error: {e:#}");
                    return Ok(ExitCode::FAILURE);
                }
            };
            let selection = cli.select.or(cli.at.map(Selection::cursor));
            match word_from_document(&document, selection, path.as_os_str() == "-") {
                DocumentWord::Word(word) => word,
                // An empty word ends as NoWord in the lookup.
                DocumentWord::NoWord => String::new(),
                DocumentWord::NoDocument => {
                    eprintln!("{NO_DOCUMENT_MESSAGE}");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        (None, Some(word)) => word.clone(),
        (None, None) => {
            let lookup = build_lookup(&settings);
            repl(&lookup, &settings, &db_path, cli.quiet || cli.verbose > 0).await?;
            return Ok(ExitCode::SUCCESS);
        }
    };

    let lookup = build_lookup(&settings);

    if cli.open {
        let word = word.trim();
        if word.is_empty() {
            eprintln!("{}", display::NO_WORD_MESSAGE);
            return Ok(ExitCode::FAILURE);
        }
        let url = lookup.source().search_url(word);
        open::that(&url).with_context(|| format!("failed to open {url}"))?;
        println!("{url}");
        return Ok(ExitCode::SUCCESS);
    }

    let spinner = Spinner::start(
        &format!("looking up '{}'", word.trim()),
        !(cli.quiet || cli.json || cli.verbose > 0 || word.trim().is_empty()),
    );
    let outcome = run_interruptible(&lookup, &word).await;
    spinner.stop().await;

    print_outcome(&outcome, cli.json);
    Ok(exit_code(&outcome))
}

fn init_tracing(verbose: u8) {
    let default_directive = match verbose {
        0 => "warn",
        1 => "warn,engdict=debug",
        _ => "debug,engdict=trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(verbose > 1)
        .init();
}

fn build_lookup(settings: &Settings) -> Lookup {
    let source = ChromeSource::new(settings.chrome_config());
    Lookup::new(Box::new(source), settings.max_meanings)
}

/// Run a lookup that Ctrl+C cancels. The source shuts its browser down
/// before this returns.
async fn run_interruptible(lookup: &Lookup, word: &str) -> LookupOutcome {
    let cancel = CancellationToken::new();
    let watcher = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });
    let outcome = lookup.run_cancellable(word, &cancel).await;
    watcher.abort();
    outcome
}

fn print_outcome(outcome: &LookupOutcome, json: bool) {
    if json {
        println!("{}", display::render_json(outcome));
        return;
    }
    let message = display::render(outcome);
    if outcome.is_success() {
        println!("{message}");
    } else {
        eprintln!("{message}");
    }
}

fn exit_code(outcome: &LookupOutcome) -> ExitCode {
    if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn handle_config(config: &Config, action: &ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::List => {
            let settings = Settings::load(config, &Overrides::default())?;
            let stored: Vec<String> = config.entries()?.into_iter().map(|(k, _)| k).collect();
            for key in SettingKey::ALL {
                let marker = if stored.iter().any(|k| k == key.as_str()) {
                    ""
                } else {
                    "  (default)"
                };
                println!("{} = {}{}", key, settings.value_of(key), marker);
            }
        }
        ConfigAction::Get { key } => {
            let settings = Settings::load(config, &Overrides::default())?;
            println!("{}", settings.value_of(*key));
        }
        ConfigAction::Set { key, value } => {
            config.set(key.as_str(), value)?;
            println!("✓ {key} = {}", value.trim());
        }
        ConfigAction::Unset { key } => {
            config.remove(key.as_str())?;
            println!("✓ {key} reset to default");
        }
    }
    Ok(())
}

async fn repl(lookup: &Lookup, settings: &Settings, db_path: &str, quiet: bool) -> anyhow::Result<()> {
    print_banner(&BannerInfo {
        source: lookup.source().name(),
        search_url: &settings.search_url,
        wait_timeout_secs: settings.wait_timeout.as_secs(),
        max_meanings: settings.max_meanings,
        db_path,
    });

    let registry = CommandRegistry::new();
    let mut last_word: Option<String> = None;

    // Async stdin so Ctrl+C is caught at the prompt too
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        print!("\nengdict> ");
        io::stdout().flush()?;

        let line = tokio::select! {
            result = lines.next_line() => {
                match result {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        println!();
                        break;
                    }
                    Err(e) => {
                        eprintln!("input error: {}", e);
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let info = SessionInfo {
            source: lookup.source().name(),
            settings,
            db_path,
            last_word: last_word.as_deref(),
        };
        match registry.dispatch(input, &info).await {
            CommandResult::Quit => break,
            CommandResult::Handled => continue,
            CommandResult::NotACommand => {}
        }

        // Ctrl+C during a lookup cancels it, not the REPL
        let spinner = Spinner::start(&format!("looking up '{input}'"), !quiet);
        let outcome = run_interruptible(lookup, input).await;
        spinner.stop().await;
        if let LookupOutcome::Cancelled { .. } = outcome {
            println!("\ninterrupted");
            continue;
        }
        print_outcome(&outcome, false);
        last_word = outcome.word().map(str::to_string);
    }

    println!("bye.");
    Ok(())
}
