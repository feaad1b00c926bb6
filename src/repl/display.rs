//! Display manager for REPL terminal UI
//!
//! Renders chat messages by category, the typing spinner and the symptom
//! table.

use colored::*;
use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::time::Duration;

use crate::matcher::{GuidanceRule, DISCLAIMER};
use crate::types::{Category, Message, Origin, SymptomRecord};

const BANNER_WIDTH: usize = 64;

/// Display manager for REPL UI
pub struct DisplayManager {
    show_spinner: bool,
    current_bar: Option<ProgressBar>,
    update_interval: Duration,
}

impl DisplayManager {
    pub fn new() -> Self {
        DisplayManager {
            show_spinner: true,
            current_bar: None,
            update_interval: Duration::from_millis(100),
        }
    }

    /// Disable the typing spinner (quiet mode, non-tty use)
    pub fn with_spinner(mut self, show_spinner: bool) -> Self {
        self.show_spinner = show_spinner;
        self
    }

    /// Show welcome banner
    pub fn show_banner(&self, version: &str, display_name: &str) {
        let rule = "=".repeat(BANNER_WIDTH).cyan();
        let title = format!("  PandemicNet {} - Health Assistant", version);
        let info = format!("  Signed in as: {} | Mode: REPL", display_name);

        println!("\n{}", rule);
        println!("{}", title.bold().cyan());
        println!("{}", info.dimmed());
        println!("{}\n", rule);
        println!("{}\n", DISCLAIMER.dimmed());
        println!(
            "Describe how you feel (or {} for commands, {} to quit)\n",
            "/help".green(),
            "/exit".green()
        );
    }

    /// Start the "typing" spinner shown while a reply is pending
    pub fn start_typing(&mut self) {
        self.finish_current();
        if !self.show_spinner {
            return;
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message("Assistant is typing...");
        pb.enable_steady_tick(self.update_interval);
        self.current_bar = Some(pb);
    }

    /// Finish current spinner
    pub fn finish_current(&mut self) {
        if let Some(pb) = self.current_bar.take() {
            pb.finish_and_clear();
        }
    }

    /// Render one chat message
    pub fn show_message(&self, message: &Message) {
        println!("{}", format_message(message));
        println!();
    }

    /// Render the symptom ledger with 1-based positions
    pub fn show_symptoms(&self, records: &[SymptomRecord]) {
        if records.is_empty() {
            println!("{}", "No symptoms recorded yet. Use /add <symptom>.".yellow());
            return;
        }

        self.show_section(&format!("Recorded Symptoms ({}):", records.len()));
        for (i, record) in records.iter().enumerate() {
            println!(
                "  {}. {} [{}] {}",
                (i + 1).to_string().cyan(),
                record.name,
                severity_label(record),
                format!("({})", record.duration).dimmed()
            );
        }
        println!();
    }

    /// Render the guidance rule table in priority order
    pub fn show_rules<'a>(&self, rules: impl IntoIterator<Item = &'a GuidanceRule>) {
        self.show_section("Guidance Rules (highest priority first):");
        for (i, rule) in rules.into_iter().enumerate() {
            let keywords = rule.trigger.keywords();
            let triggers = if keywords.is_empty() {
                "(fallback)".to_string()
            } else {
                keywords.join(", ")
            };
            println!(
                "  {:>2}. {} {:<8} {}",
                i + 1,
                format!("{:<14}", rule.name).green(),
                rule.category.as_str(),
                triggers.dimmed()
            );
        }
        println!();
    }

    /// Display error message
    pub fn show_error(&self, error: &str) {
        println!("{} {}", "Error:".red().bold(), error.red());
    }

    /// Display warning message
    pub fn show_warning(&self, warning: &str) {
        println!("{} {}", "Warning:".yellow().bold(), warning.yellow());
    }

    /// Display info message
    pub fn show_info(&self, info: &str) {
        println!("{} {}", "Info:".cyan(), info);
    }

    /// Display debug message (only if verbose)
    pub fn show_debug(&self, debug: &str, verbose: bool) {
        if verbose {
            println!("{} {}", "Debug:".dimmed(), debug.dimmed());
        }
    }

    /// Clear screen
    pub fn clear_screen(&self) -> io::Result<()> {
        execute!(io::stdout(), Clear(ClearType::All), cursor::MoveTo(0, 0))
    }

    /// Show section header
    pub fn show_section(&self, title: &str) {
        println!("\n{}", title.bold().cyan());
        println!("{}", "-".repeat(60).cyan());
    }
}

impl Default for DisplayManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Prefix and color a message by origin and category
pub fn format_message(message: &Message) -> String {
    let time = message.created_at().format("%H:%M").to_string();
    match message.origin() {
        Origin::User => format!("{} {} {}", time.dimmed(), "You:".bold(), message.text()),
        Origin::Assistant => {
            let (label, text) = match message.category() {
                Category::General => ("Assistant:".cyan(), message.text().normal()),
                Category::Info => ("Assistant [info]:".blue(), message.text().blue()),
                Category::Success => ("Assistant [ok]:".green(), message.text().green()),
                Category::Warning => ("Assistant [warning]:".red(), message.text().red().bold()),
            };
            format!("{} {} {}", time.dimmed(), label.bold(), text)
        }
    }
}

fn severity_label(record: &SymptomRecord) -> ColoredString {
    use crate::types::Severity;
    match record.severity {
        Severity::Mild => record.severity.as_str().green(),
        Severity::Moderate => record.severity.as_str().yellow(),
        Severity::Severe => record.severity.as_str().red().bold(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;

    #[test]
    fn test_display_manager_creation() {
        let manager = DisplayManager::new();
        assert!(manager.show_spinner);
        assert!(manager.current_bar.is_none());
        assert_eq!(manager.update_interval, Duration::from_millis(100));
    }

    #[test]
    fn test_typing_spinner_lifecycle() {
        let mut manager = DisplayManager::new();
        manager.start_typing();
        assert!(manager.current_bar.is_some());

        manager.finish_current();
        assert!(manager.current_bar.is_none());
    }

    #[test]
    fn test_spinner_disabled() {
        let mut manager = DisplayManager::new().with_spinner(false);
        manager.start_typing();
        assert!(manager.current_bar.is_none());
    }

    #[test]
    fn test_format_message_contents() {
        colored::control::set_override(false);
        let user = format_message(&Message::user("I feel dizzy"));
        assert!(user.contains("You: I feel dizzy"));

        let warning = format_message(&Message::assistant("Call 911", Category::Warning));
        assert!(warning.contains("Assistant [warning]: Call 911"));
    }

    #[test]
    fn test_show_helpers() {
        let manager = DisplayManager::new();
        manager.show_symptoms(&[]);
        manager.show_symptoms(&[SymptomRecord::new("fever").with_severity(Severity::Severe)]);
        manager.show_rules(crate::matcher::rules::rules());
        manager.show_message(&Message::assistant("hello", Category::General));
        manager.show_warning("careful");
        manager.show_info("fyi");
    }
}
