//! REPL (Read-Eval-Print Loop) module for the interactive assistant
//!
//! Free text goes to the assistant; lines starting with `/` are built-in
//! commands. A reply in flight blocks the loop, so input is never accepted
//! while the assistant is "typing".

pub mod commands;
pub mod display;
pub mod input;
pub mod session;

use anyhow::Result;
use std::path::PathBuf;

use crate::assistant::{AssistantEvent, ConversationOrchestrator};
use crate::repl::commands::{is_command, CommandHandler};
pub use crate::repl::display::DisplayManager;
use crate::repl::input::InputHandler;
pub use crate::repl::input::InputLine;
pub use crate::repl::session::SessionManager;
use crate::session::SessionContext;
use tokio::sync::mpsc;

/// REPL session coordinator
pub struct ReplSession {
    input_handler: InputHandler,
    command_handler: CommandHandler,
    session_manager: SessionManager,
    display_manager: DisplayManager,
    events: Option<mpsc::Receiver<AssistantEvent>>,
}

impl ReplSession {
    pub fn new(orchestrator: ConversationOrchestrator, auth: SessionContext) -> Result<Self> {
        Self::build(InputHandler::new()?, orchestrator, auth)
    }

    /// Create REPL session with persistent line history
    pub fn with_history(
        history_path: PathBuf,
        orchestrator: ConversationOrchestrator,
        auth: SessionContext,
    ) -> Result<Self> {
        Self::build(InputHandler::with_history(history_path)?, orchestrator, auth)
    }

    fn build(
        input_handler: InputHandler,
        orchestrator: ConversationOrchestrator,
        auth: SessionContext,
    ) -> Result<Self> {
        let mut repl = ReplSession {
            input_handler,
            command_handler: CommandHandler::new(),
            session_manager: SessionManager::new(orchestrator, auth),
            display_manager: DisplayManager::new(),
            events: None,
        };
        repl.refresh_prompt();
        Ok(repl)
    }

    /// Replace the display manager (spinner settings)
    pub fn with_display(mut self, display_manager: DisplayManager) -> Self {
        self.display_manager = display_manager;
        self
    }

    /// Print lifecycle events from this receiver in verbose mode
    pub fn with_events(mut self, receiver: mpsc::Receiver<AssistantEvent>) -> Self {
        self.events = Some(receiver);
        self
    }

    /// Show welcome banner and the greeting, if any
    pub fn show_welcome(&self, version: &str) {
        self.display_manager
            .show_banner(version, self.session_manager.auth().display_name());
        for message in self.session_manager.orchestrator().messages().iter() {
            self.display_manager.show_message(message);
        }
    }

    pub fn read_input(&mut self) -> Result<InputLine> {
        self.input_handler.read_line()
    }

    /// Handle user input (command or chat message)
    ///
    /// Returns true if session should continue, false to exit
    pub async fn handle_input(&mut self, input: &str) -> Result<bool> {
        if input.trim().is_empty() {
            return Ok(true);
        }

        let keep_going = if is_command(input) {
            let command = self.command_handler.parse(input);
            self.command_handler
                .execute(command, &mut self.session_manager, &mut self.display_manager)
                .await?
        } else {
            self.command_handler
                .converse(input, &mut self.session_manager, &mut self.display_manager)
                .await;
            true
        };

        self.drain_events();
        self.refresh_prompt();
        Ok(keep_going)
    }

    /// Read-eval-print until `/exit` or Ctrl-D
    pub async fn run(&mut self) -> Result<()> {
        loop {
            match self.read_input()? {
                InputLine::Line(line) => {
                    if !self.handle_input(&line).await? {
                        break;
                    }
                }
                InputLine::Interrupted => {
                    self.display_manager
                        .show_info("Press Ctrl-D or type /exit to quit");
                }
                InputLine::Eof => break,
            }
        }
        self.save()
    }

    fn drain_events(&mut self) {
        let verbose = self.command_handler.is_verbose();
        if let Some(receiver) = self.events.as_mut() {
            while let Ok(event) = receiver.try_recv() {
                self.display_manager
                    .show_debug(&format!("{:?}", event), verbose);
            }
        }
    }

    fn refresh_prompt(&mut self) {
        let name = self.session_manager.auth().user().map(|u| u.name.as_str());
        self.input_handler.set_prompt(InputHandler::prompt_for(name));
    }

    /// Get session manager (immutable)
    pub fn session(&self) -> &SessionManager {
        &self.session_manager
    }

    /// Get session manager (mutable)
    pub fn session_mut(&mut self) -> &mut SessionManager {
        &mut self.session_manager
    }

    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.command_handler.is_verbose()
    }

    /// Set verbose mode
    pub fn set_verbose(&mut self, enable: bool) {
        self.command_handler.set_verbose(enable);
    }

    /// Save session state
    pub fn save(&mut self) -> Result<()> {
        self.input_handler.save_history()?;
        Ok(())
    }
}
