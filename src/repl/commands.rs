//! Command handler for REPL built-in commands
//!
//! Symptom positions typed by the user are 1-based, matching `/symptoms`.

use anyhow::Result;
use colored::*;

use crate::errors::AssistantError;
use crate::repl::display::{format_message, DisplayManager};
use crate::repl::session::{SessionManager, DEFAULT_HISTORY_LIMIT};
use crate::session::ProfileUpdate;
use crate::types::Severity;

/// REPL command types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Add { name: String },
    Remove { position: usize },
    Severity { position: usize, level: String },
    Duration { position: usize, text: String },
    Symptoms,
    Analyze,
    History { limit: Option<usize> },
    Status,
    Login { email: String, password: String },
    Signup { name: String, email: String, password: String },
    Logout,
    WhoAmI,
    Profile { field: String, value: String },
    Clear,
    Verbose { enable: bool },
    Exit,
    /// Known command with missing or malformed arguments
    Usage { usage: &'static str },
    Unknown { input: String },
}

/// Command handler for parsing and executing REPL commands
pub struct CommandHandler {
    verbose: bool,
}

impl CommandHandler {
    pub fn new() -> Self {
        CommandHandler { verbose: false }
    }

    /// Parse input string into a command
    pub fn parse(&self, input: &str) -> Command {
        let trimmed = input.trim();

        let Some(body) = trimmed.strip_prefix('/') else {
            return Command::Unknown { input: input.to_string() };
        };

        let parts: Vec<&str> = body.split_whitespace().collect();
        if parts.is_empty() {
            return Command::Unknown { input: input.to_string() };
        }
        let args = &parts[1..];

        match parts[0].to_lowercase().as_str() {
            "help" | "h" => Command::Help,
            "exit" | "quit" | "q" => Command::Exit,
            "add" => {
                if args.is_empty() {
                    Command::Usage { usage: "/add <symptom>" }
                } else {
                    Command::Add { name: args.join(" ") }
                }
            }
            "remove" | "rm" => match args.first().and_then(|s| s.parse::<usize>().ok()) {
                Some(position) if args.len() == 1 => Command::Remove { position },
                _ => Command::Usage { usage: "/remove <n>" },
            },
            "severity" | "sev" => match (args.first().and_then(|s| s.parse::<usize>().ok()), args.get(1)) {
                (Some(position), Some(level)) if args.len() == 2 => Command::Severity {
                    position,
                    level: level.to_string(),
                },
                _ => Command::Usage {
                    usage: "/severity <n> <mild|moderate|severe>",
                },
            },
            "duration" => match args.first().and_then(|s| s.parse::<usize>().ok()) {
                Some(position) => Command::Duration {
                    position,
                    text: args[1..].join(" "),
                },
                None => Command::Usage { usage: "/duration <n> <text>" },
            },
            "symptoms" | "ls" => Command::Symptoms,
            "analyze" | "analyse" => Command::Analyze,
            "history" => match args {
                [] => Command::History { limit: None },
                [n] => match n.parse::<usize>() {
                    Ok(limit) if limit > 0 => Command::History { limit: Some(limit) },
                    _ => Command::Usage { usage: "/history [n], n >= 1" },
                },
                _ => Command::Usage { usage: "/history [n], n >= 1" },
            },
            "status" => Command::Status,
            "login" => match args {
                [email, password] => Command::Login {
                    email: email.to_string(),
                    password: password.to_string(),
                },
                _ => Command::Usage { usage: "/login <email> <password>" },
            },
            "signup" => {
                // The name may contain spaces; email and password are the last two words.
                if args.len() < 3 {
                    Command::Usage {
                        usage: "/signup <name> <email> <password>",
                    }
                } else {
                    let split = args.len() - 2;
                    Command::Signup {
                        name: args[..split].join(" "),
                        email: args[split].to_string(),
                        password: args[split + 1].to_string(),
                    }
                }
            }
            "logout" => Command::Logout,
            "whoami" => Command::WhoAmI,
            "profile" => match args {
                [] => Command::WhoAmI,
                [field, value @ ..] if !value.is_empty() => Command::Profile {
                    field: field.to_string(),
                    value: value.join(" "),
                },
                _ => Command::Usage {
                    usage: "/profile <field> <value>",
                },
            },
            "clear" | "cls" => Command::Clear,
            "verbose" => match args.first().map(|s| s.to_lowercase()).as_deref() {
                None | Some("on") | Some("1") | Some("true") if args.len() <= 1 => {
                    Command::Verbose { enable: true }
                }
                Some("off") | Some("0") | Some("false") if args.len() == 1 => {
                    Command::Verbose { enable: false }
                }
                _ => Command::Usage { usage: "/verbose [on|off]" },
            },
            _ => Command::Unknown { input: input.to_string() },
        }
    }

    /// Execute a command
    ///
    /// Returns true if REPL should continue, false if should exit. Assistant
    /// errors are reported and do not end the session.
    pub async fn execute(
        &mut self,
        command: Command,
        session: &mut SessionManager,
        display: &mut DisplayManager,
    ) -> Result<bool> {
        match command {
            Command::Help => self.show_help(),
            Command::Exit => {
                println!("{}", "Stay safe. Goodbye!".green());
                return Ok(false);
            }
            Command::Add { name } => match session.orchestrator_mut().add_symptom(&name) {
                Some(_) => {
                    let len = session.orchestrator().ledger().len();
                    println!("{} {} (#{})", "Added".green(), name.trim(), len);
                }
                None => display.show_warning("Symptom name is empty"),
            },
            Command::Remove { position } => {
                if let Some(index) = checked_index(session, display, position) {
                    match session.orchestrator_mut().remove_symptom_at(index) {
                        Ok(record) => println!("{} {}", "Removed".yellow(), record.name),
                        Err(e) => report(display, &e),
                    }
                }
            }
            Command::Severity { position, level } => {
                let severity = match level.parse::<Severity>() {
                    Ok(severity) => severity,
                    Err(e) => {
                        report(display, &e);
                        return Ok(true);
                    }
                };
                if let Some(index) = checked_index(session, display, position) {
                    match session.orchestrator_mut().set_severity_at(index, severity) {
                        Ok(()) => println!("Symptom #{} marked {}", position, severity),
                        Err(e) => report(display, &e),
                    }
                }
            }
            Command::Duration { position, text } => {
                if let Some(index) = checked_index(session, display, position) {
                    let id = session.orchestrator().ledger().id_at(index);
                    let result = match id {
                        Ok(id) => session.orchestrator_mut().set_duration(id, &text),
                        Err(e) => Err(e),
                    };
                    match result {
                        Ok(()) => println!("Duration updated for symptom #{}", position),
                        Err(e) => report(display, &e),
                    }
                }
            }
            Command::Symptoms => display.show_symptoms(session.orchestrator().ledger().records()),
            Command::Analyze => {
                if let Err(e) = session.orchestrator_mut().begin_analysis() {
                    report(display, &e);
                } else {
                    self.finish_reply(session, display).await;
                }
            }
            Command::History { limit } => {
                self.show_history(session, limit.unwrap_or(DEFAULT_HISTORY_LIMIT))
            }
            Command::Status => self.show_status(session),
            Command::Login { email, password } => {
                match session.auth_mut().login(&email, &password) {
                    Ok(user) => println!("{} {}!", "Welcome back,".green(), user.name.bold()),
                    Err(e) => report(display, &e),
                }
            }
            Command::Signup {
                name,
                email,
                password,
            } => match session.auth_mut().signup(&name, &email, &password) {
                Ok(user) => println!("{} {}!", "Account created. Welcome,".green(), user.name.bold()),
                Err(e) => report(display, &e),
            },
            Command::Logout => {
                if session.auth().is_authenticated() {
                    match session.auth_mut().logout() {
                        Ok(()) => println!("{}", "Signed out.".yellow()),
                        Err(e) => report(display, &e),
                    }
                } else {
                    display.show_info("Not signed in");
                }
            }
            Command::WhoAmI => self.show_profile(session),
            Command::Profile { field, value } => {
                let result = ProfileUpdate::for_field(&field, &value)
                    .and_then(|update| session.auth_mut().update_profile(update));
                match result {
                    Ok(_) => println!("{} {}", "Profile updated:".green(), field.to_lowercase()),
                    Err(e) => report(display, &e),
                }
            }
            Command::Clear => display.clear_screen()?,
            Command::Verbose { enable } => {
                self.verbose = enable;
                let status = if enable { "enabled" } else { "disabled" };
                println!("{}", format!("Verbose mode {}", status).cyan());
            }
            Command::Usage { usage } => {
                println!("{} {}", "Usage:".yellow().bold(), usage.cyan());
            }
            Command::Unknown { input } => {
                println!("{}", format!("Unknown command: {}", input).red());
                println!("Type {} for available commands", "/help".cyan());
            }
        }
        Ok(true)
    }

    /// Send a free-text message and print the reply
    pub async fn converse(
        &mut self,
        input: &str,
        session: &mut SessionManager,
        display: &mut DisplayManager,
    ) {
        if let Err(e) = session.orchestrator_mut().submit(input) {
            report(display, &e);
            return;
        }
        self.finish_reply(session, display).await;
    }

    /// Wait out the pending reply behind the typing spinner
    async fn finish_reply(&self, session: &mut SessionManager, display: &mut DisplayManager) {
        display.start_typing();
        let result = session.orchestrator_mut().await_reply().await;
        display.finish_current();

        match result {
            Ok(message) => {
                display.show_message(message);
                let category = message.category();
                let log_len = session.orchestrator().messages().len();
                display.show_debug(
                    &format!("category={} messages={}", category, log_len),
                    self.verbose,
                );
            }
            Err(e) => report(display, &e),
        }
    }

    /// Display help information
    fn show_help(&self) {
        println!("\n{}", "Available Commands:".bold().cyan());
        println!("{}", "=".repeat(60).cyan());

        let commands = [
            ("/help, /h", "Show this help message"),
            ("/add <symptom>", "Record a symptom (moderate by default)"),
            ("/remove <n>", "Remove symptom n"),
            ("/severity <n> <level>", "Set symptom n to mild, moderate or severe"),
            ("/duration <n> <text>", "Set how long symptom n has lasted"),
            ("/symptoms, /ls", "List recorded symptoms"),
            ("/analyze", "Analyze all recorded symptoms"),
            ("/history [n]", "Show last n messages (default: 10)"),
            ("/status", "Show session status and statistics"),
            ("/login <email> <pw>", "Sign in"),
            ("/signup <name> <email> <pw>", "Create an account"),
            ("/logout", "Sign out"),
            ("/whoami, /profile", "Show the signed-in profile"),
            ("/profile <field> <value>", "Edit name, email, phone, address, dob, health or vaccination"),
            ("/verbose [on|off]", "Toggle verbose output"),
            ("/clear, /cls", "Clear screen"),
            ("/exit, /quit, /q", "Exit REPL"),
        ];

        for (cmd, desc) in commands {
            println!("  {:<30} {}", cmd.green(), desc);
        }

        println!("\n{}", "Usage:".bold());
        println!("  - Describe your symptoms directly (no / prefix)");
        println!("  - Use {} for input history", "UP/DOWN arrows".cyan());
        println!("  - Press {} or {} to exit", "Ctrl-D".cyan(), "/exit".cyan());
        println!();
    }

    /// Display recent conversation messages
    fn show_history(&self, session: &SessionManager, limit: usize) {
        if session.orchestrator().messages().is_empty() {
            println!("{}", "No messages yet.".yellow());
            return;
        }

        let history = session.get_history(limit);
        println!(
            "\n{}",
            format!("Conversation (last {}):", history.len()).bold().cyan()
        );
        println!("{}", "=".repeat(60).cyan());

        for message in history {
            println!("  {}", format_message(message));
            if self.verbose {
                println!(
                    "     {}",
                    format!("category: {}", message.category()).dimmed()
                );
            }
        }
        println!();
    }

    /// Display session status
    fn show_status(&self, session: &SessionManager) {
        println!("\n{}", "Session Status:".bold().cyan());
        println!("{}", "=".repeat(60).cyan());

        let duration = session.session_duration();
        let hours = duration / 3600;
        let minutes = (duration % 3600) / 60;
        let seconds = duration % 60;

        let duration_str = if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        };

        let orchestrator = session.orchestrator();
        let stats = orchestrator.telemetry().get_stats();
        let ledger = orchestrator.ledger();

        println!("  User:             {}", session.auth().display_name().green());
        println!("  Messages Sent:    {}", session.turn_count().to_string().green());
        println!("  Symptoms:         {}", ledger.len().to_string().green());
        println!("  Severe Symptoms:  {}", ledger.severe_count().to_string().green());
        println!("  Analyses:         {}", stats.analyses.to_string().green());
        println!("  Urgent Results:   {}", stats.urgent_assessments.to_string().green());
        println!("  Avg Reply Time:   {}", format!("{}ms", stats.average_reply_ms()).green());
        println!("  Session Duration: {}", duration_str.green());
        println!("  Verbose Mode:     {}", if self.verbose { "On".green() } else { "Off".red() });
        println!();
    }

    /// Display the signed-in user
    fn show_profile(&self, session: &SessionManager) {
        let Some(user) = session.auth().user() else {
            println!("{}", "Not signed in (guest). Use /login or /signup.".yellow());
            return;
        };

        println!("\n{}", "Profile:".bold().cyan());
        println!("{}", "=".repeat(60).cyan());
        println!("  Name:        {}", user.name.green());
        println!("  Email:       {}", user.email);
        println!("  Health:      {:?}", user.health_status);
        println!("  Vaccination: {:?}", user.vaccination_status);
        if self.verbose {
            println!("  Id:          {}", user.id.dimmed());
        }
        println!();
    }

    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Set verbose mode
    pub fn set_verbose(&mut self, enable: bool) {
        self.verbose = enable;
    }
}

impl Default for CommandHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if input is a command (starts with /)
pub fn is_command(input: &str) -> bool {
    input.trim().starts_with('/')
}

/// Convert a 1-based position to an index, warning when out of range
fn checked_index(
    session: &SessionManager,
    display: &DisplayManager,
    position: usize,
) -> Option<usize> {
    let len = session.orchestrator().ledger().len();
    if position == 0 || position > len {
        display.show_warning(&format!(
            "No symptom #{} ({} recorded, see /symptoms)",
            position, len
        ));
        return None;
    }
    Some(position - 1)
}

fn report(display: &DisplayManager, error: &AssistantError) {
    match error {
        AssistantError::Store(_)
        | AssistantError::ConfigError(_)
        | AssistantError::ResponderFailed(_)
        | AssistantError::SerializationError(_)
        | AssistantError::IoError(_) => {
            tracing::error!(error = %error, "command failed");
            display.show_error(&error.to_string());
        }
        _ => {
            tracing::debug!(error = %error, "command rejected");
            display.show_warning(&error.to_string());
        }
    }
}
