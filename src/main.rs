//! PandemicNet - Main CLI Entry Point

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pandemicnet::{
    assistant::{AssistantConfig, ConversationOrchestrator, EventBus},
    cli::{Args, Commands, Config, Verbosity},
    matcher::rules::rules,
    repl::{display::format_message, DisplayManager, ReplSession},
    session::{FileStore, SessionContext},
    telemetry::{TelemetryCollector, TelemetryDisplay},
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Err(message) = args.validate() {
        eprintln!("{} {}", "Error:".red().bold(), message);
        std::process::exit(2);
    }

    let config = Config::load(args.config.clone())?;
    let verbosity = effective_verbosity(&args, &config);
    init_tracing(verbosity)?;

    if !config.display.color_output {
        colored::control::set_override(false);
    }

    match &args.command {
        None | Some(Commands::Start) => run_repl(&args, &config, verbosity).await?,
        Some(Commands::Ask { text }) => run_ask(&args, &config, &text.join(" "), verbosity).await?,
        Some(Commands::Rules) => DisplayManager::new().show_rules(rules()),
        Some(Commands::Config) => show_config(&args, &config)?,
    }

    Ok(())
}

/// Command-line flags win over the config file
fn effective_verbosity(args: &Args, config: &Config) -> Verbosity {
    if args.quiet || args.verbose > 0 {
        args.verbosity()
    } else {
        config.verbosity()
    }
}

fn init_tracing(verbosity: Verbosity) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.log_directive()));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()?;
    Ok(())
}

async fn run_repl(args: &Args, config: &Config, verbosity: Verbosity) -> Result<()> {
    let store = Arc::new(FileStore::open(config.store_path())?);
    let auth = SessionContext::restore(store)?;

    let telemetry = TelemetryCollector::new();
    let (event_bus, events) = EventBus::new();
    let orchestrator = ConversationOrchestrator::new(&config.to_assistant_config(args.delay_ms))
        .with_event_bus(event_bus)
        .with_telemetry(telemetry.clone());

    let show_spinner = config.display.show_spinner && verbosity.show_progress();
    let mut repl = ReplSession::with_history(config.history_path(), orchestrator, auth)?
        .with_display(DisplayManager::new().with_spinner(show_spinner))
        .with_events(events);
    repl.set_verbose(verbosity.show_events());

    tracing::info!(state_dir = %config.state_dir().display(), "starting REPL");
    repl.show_welcome(VERSION);
    repl.run().await?;

    TelemetryDisplay::new(telemetry, verbosity).display_summary();
    Ok(())
}

/// One question, one answer, no greeting
async fn run_ask(args: &Args, config: &Config, text: &str, verbosity: Verbosity) -> Result<()> {
    let assistant_config = AssistantConfig {
        greeting: false,
        ..config.to_assistant_config(args.delay_ms)
    };
    let mut orchestrator = ConversationOrchestrator::new(&assistant_config);

    let mut display =
        DisplayManager::new().with_spinner(config.display.show_spinner && verbosity.show_progress());
    display.start_typing();
    let result = orchestrator.ask(text).await;
    display.finish_current();

    let message = result?;
    if verbosity.show_progress() {
        println!("{}", format_message(message));
    } else {
        println!("{}", message.text());
    }
    Ok(())
}

fn show_config(args: &Args, config: &Config) -> Result<()> {
    let source = match (&args.config, Config::default_path()) {
        (Some(path), _) => path.display().to_string(),
        (None, Some(path)) if path.exists() => path.display().to_string(),
        _ => "built-in defaults".to_string(),
    };

    println!("\n{}", "PandemicNet Configuration".bold().cyan());
    println!("{}", "-".repeat(40).cyan());
    println!("Source:      {}", source);
    println!("State dir:   {}", config.state_dir().display());
    if let Some(delay) = args.delay_ms {
        println!("Delay (cli): {}ms", delay);
    }
    println!();
    println!("{}", config.to_toml()?);
    Ok(())
}
