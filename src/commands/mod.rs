/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes three top-level command modules:

- `chat`   — Interactive multi-session chat
- `ask`    — Send a single prompt and print the reply
- `format` — Run the response formatter over text

The handlers are thin; conversation behavior lives in the orchestrator.
*/

use crate::commands::render::render;
use crate::config::Config;
use crate::error::{ParleyError, Result};
use crate::extract::{Attachment, PdfExtractor};
use crate::orchestrator::{AttachOutcome, Orchestrator, SendOutcome};
use crate::providers::create_provider;
use crate::session::{Role, Session, SessionStore};
use colored::Colorize;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

// Special commands parser for the chat loop
pub mod special_commands;

// Terminal rendering of reply markup
pub mod render;

/// Interval between waiting-indicator ticks
const INDICATOR_TICK: Duration = Duration::from_millis(400);

/// Build an orchestrator for the configured endpoint
fn build_orchestrator(config: &Config) -> Result<Orchestrator> {
    let provider = create_provider(&config.endpoint)?;
    Ok(Orchestrator::new(provider, Arc::new(PdfExtractor::new())))
}

/// Send a message, showing a waiting indicator while the request is in flight
async fn send_with_indicator(chat: &Orchestrator, input: &str) -> SendOutcome {
    let send = chat.send(input);
    tokio::pin!(send);

    let mut ticker = tokio::time::interval(INDICATOR_TICK);
    let mut shown = false;

    loop {
        tokio::select! {
            outcome = &mut send => {
                if shown {
                    eprintln!();
                }
                return outcome;
            }
            _ = ticker.tick() => {
                if chat.read().waiting {
                    if shown {
                        eprint!(".");
                    } else {
                        eprint!("{}", "Waiting for response".dimmed());
                        shown = true;
                    }
                    let _ = std::io::stderr().flush();
                }
            }
        }
    }
}

/// Content of the last message in the active session
fn last_message(chat: &Orchestrator) -> Option<String> {
    chat.read()
        .store
        .active()
        .and_then(|s| s.messages().last())
        .map(|m| m.content().to_string())
}

/// Read a file from disk and hand it to the orchestrator
///
/// Returns the outcome, or an error if the file could not be read.
async fn attach_path(chat: &Orchestrator, path: &Path) -> Result<AttachOutcome> {
    let attachment = Attachment::from_path(path)
        .await
        .map_err(|e| ParleyError::Command(format!("Failed to read {}: {}", path.display(), e)))?;
    Ok(chat.attach(attachment).await)
}

// Chat command handler
pub mod chat {
    //! Interactive chat mode handler.
    //!
    //! Creates the provider and orchestrator, then runs a readline-based
    //! loop that dispatches special commands and sends everything else to
    //! the model in the active session.

    use super::*;
    use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
    use prettytable::{format, Table};
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start interactive chat mode
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `attach` - Optional PDF to attach before the first message
    ///
    /// # Errors
    ///
    /// Returns error if the provider or line editor cannot be initialized
    pub async fn run_chat(config: Config, attach: Option<std::path::PathBuf>) -> Result<()> {
        tracing::info!("Starting interactive chat mode");

        let chat = build_orchestrator(&config)?;
        let mut rl = DefaultEditor::new()?;

        print_welcome_banner(&config);

        if let Some(path) = attach {
            handle_attach(&chat, &path).await;
        }

        loop {
            let prompt = format_prompt(&chat.read().store);
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();

                    let command = match parse_special_command(trimmed) {
                        Ok(command) => command,
                        Err(e) => {
                            eprintln!("{}\n", e.to_string().red());
                            continue;
                        }
                    };

                    match command {
                        SpecialCommand::NewSession => {
                            chat.new_session();
                            println!("{}\n", "Started a new session".green());
                            continue;
                        }
                        SpecialCommand::ListSessions => {
                            print_sessions(&chat.read().store);
                            continue;
                        }
                        SpecialCommand::Switch(number) => {
                            match chat.select_index(number - 1) {
                                Ok(_) => {
                                    if let Some(session) = chat.read().store.active() {
                                        print_transcript(session);
                                    }
                                }
                                Err(e) => eprintln!("{}\n", e.to_string().red()),
                            }
                            continue;
                        }
                        SpecialCommand::Delete(number) => {
                            handle_delete(&chat, number);
                            continue;
                        }
                        SpecialCommand::Attach(path) => {
                            handle_attach(&chat, &path).await;
                            continue;
                        }
                        SpecialCommand::ShowStatus => {
                            print_status_display(&chat, &config);
                            continue;
                        }
                        SpecialCommand::Help => {
                            print_help();
                            continue;
                        }
                        SpecialCommand::Exit => break,
                        SpecialCommand::None => {
                            // Regular message
                        }
                    }

                    if trimmed.is_empty() && chat.read().pending_attachment.is_none() {
                        continue;
                    }
                    if !trimmed.is_empty() {
                        rl.add_history_entry(trimmed)?;
                    }

                    match send_with_indicator(&chat, trimmed).await {
                        SendOutcome::Skipped => {
                            println!(
                                "{}\n",
                                "No active session. Type /new to start one.".yellow()
                            );
                        }
                        SendOutcome::Replied(_) => {
                            if let Some(reply) = last_message(&chat) {
                                println!("\n{}\n", render(&reply));
                            }
                        }
                        SendOutcome::Failed(_) => {}
                    }

                    if let Some(error) = chat.read().last_error.as_deref() {
                        eprintln!("{}\n", format!("Error: {}", error).red());
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    async fn handle_attach(chat: &Orchestrator, path: &Path) {
        match attach_path(chat, path).await {
            Ok(AttachOutcome::Attached { pages }) => {
                println!(
                    "{}\n",
                    format!(
                        "Attached {} ({} pages). It will be sent with your next message.",
                        path.display(),
                        pages
                    )
                    .green()
                );
            }
            // Non-PDF uploads are dropped without feedback
            Ok(AttachOutcome::Ignored) => {}
            Ok(AttachOutcome::Failed(message)) => {
                eprintln!("{}\n", format!("Error: {}", message).red());
            }
            Err(e) => eprintln!("{}\n", e.to_string().red()),
        }
    }

    fn handle_delete(chat: &Orchestrator, number: Option<usize>) {
        let id = match number {
            Some(n) => chat.session_id_at(n - 1),
            None => chat
                .read()
                .store
                .active_id()
                .ok_or_else(|| ParleyError::Command("No active session".to_string()).into()),
        };

        match id {
            Ok(id) => {
                chat.delete_session(id);
                println!("{}", "Session deleted".green());
                match chat.read().store.active() {
                    Some(session) => println!("Current session: {}\n", session.title().cyan()),
                    None => println!(
                        "{}\n",
                        "No sessions left. Type /new to start one.".yellow()
                    ),
                }
            }
            Err(e) => eprintln!("{}\n", e.to_string().red()),
        }
    }

    /// Prompt showing the active session title
    pub(crate) fn format_prompt(store: &SessionStore) -> String {
        match store.active() {
            Some(session) => format!("[{}] >> ", session.title()),
            None => "[no session] >> ".to_string(),
        }
    }

    /// Table of sessions, most recent first, with the active one marked
    pub(crate) fn sessions_table(store: &SessionStore) -> Table {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

        table.add_row(prettytable::row![
            "".bold(),
            "#".bold(),
            "Title".bold(),
            "Messages".bold(),
            "Created".bold()
        ]);

        let active = store.active_id();
        for (index, session) in store.sessions().iter().enumerate() {
            let marker = if Some(session.id()) == active { "*" } else { "" };
            let created = session.created_at().format("%Y-%m-%d %H:%M").to_string();
            table.add_row(prettytable::row![
                marker.green(),
                (index + 1).to_string().cyan(),
                session.title(),
                session.messages().len(),
                created
            ]);
        }

        table
    }

    fn print_sessions(store: &SessionStore) {
        if store.is_empty() {
            println!("{}\n", "No sessions. Type /new to start one.".yellow());
            return;
        }

        println!("\nSessions:");
        sessions_table(store).printstd();
        println!();
        println!("Use {} to switch sessions.\n", "/switch <n>".cyan());
    }

    fn print_transcript(session: &Session) {
        println!("\n{} {}\n", "Session:".bold(), session.title().cyan());
        for message in session.messages() {
            match message.role() {
                Role::User => println!("{} {}", ">>".bold(), message.content()),
                Role::Assistant => println!("{}", render(message.content())),
                Role::FileMarker => println!("{}", message.content().dimmed()),
            }
            println!();
        }
    }

    /// Display the welcome banner
    fn print_welcome_banner(config: &Config) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║              Parley Interactive Chat - Welcome!              ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Endpoint: {}", config.endpoint.display_url().cyan());
        println!("Type '/help' for available commands, 'exit' to quit\n");
    }

    fn print_status_display(chat: &Orchestrator, config: &Config) {
        let state = chat.read();

        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Parley Session Status                     ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        match state.store.active() {
            Some(session) => {
                println!("Active Session:    {}", session.title().cyan());
                println!("Conversation Size: {} messages", session.messages().len());
            }
            None => println!("Active Session:    {}", "none".yellow()),
        }
        println!("Sessions:          {}", state.store.len());
        match &state.pending_attachment {
            Some(text) => println!(
                "Attachment:        {} characters pending",
                text.chars().count()
            ),
            None => println!("Attachment:        none"),
        }
        println!("Endpoint:          {}", config.endpoint.display_url());
        if let Some(error) = &state.last_error {
            println!("Last Error:        {}", error.red());
        }
        println!();
    }

}

// One-shot prompt handler
pub mod ask {
    //! Sends one prompt in a fresh session and prints the reply.

    use super::*;

    /// Send a single prompt and print the rendered reply
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `prompt` - Prompt text
    /// * `attach` - Optional PDF whose text accompanies the prompt
    ///
    /// # Errors
    ///
    /// Returns error if the attachment cannot be used, there is nothing to
    /// send, or the endpoint call fails
    pub async fn run_ask(
        config: Config,
        prompt: String,
        attach: Option<std::path::PathBuf>,
    ) -> Result<()> {
        let chat = build_orchestrator(&config)?;
        let reply = ask(&chat, &prompt, attach.as_deref()).await?;
        println!("{}", render(&reply));
        Ok(())
    }

    /// Run one exchange and return the reply markup
    ///
    /// # Errors
    ///
    /// Returns error if the attachment cannot be used, there is nothing to
    /// send, or the endpoint call fails
    pub async fn ask(chat: &Orchestrator, prompt: &str, attach: Option<&Path>) -> Result<String> {
        if let Some(path) = attach {
            match attach_path(chat, path).await? {
                AttachOutcome::Attached { pages } => {
                    tracing::info!("Attached {} ({} pages)", path.display(), pages);
                }
                AttachOutcome::Ignored => {
                    return Err(ParleyError::Command(format!(
                        "{} is not a PDF file",
                        path.display()
                    ))
                    .into());
                }
                AttachOutcome::Failed(message) => {
                    return Err(ParleyError::Extraction(message).into());
                }
            }
        }

        match chat.send(prompt).await {
            SendOutcome::Replied(_) => Ok(last_message(chat).unwrap_or_default()),
            SendOutcome::Failed(message) => Err(ParleyError::Endpoint(message).into()),
            SendOutcome::Skipped => {
                Err(ParleyError::Command("Nothing to send: prompt is empty".to_string()).into())
            }
        }
    }

}

// Formatter inspection handler
pub mod format {
    //! Prints the sanitized markup the formatter produces for some text.

    use super::*;
    use crate::formatter::format_response;
    use std::io::Read;

    /// Format a file, or stdin when no file is given, and print the markup
    ///
    /// # Errors
    ///
    /// Returns error if the input cannot be read
    pub fn run_format(input: Option<std::path::PathBuf>) -> Result<()> {
        let raw = match input {
            Some(path) => std::fs::read_to_string(&path).map_err(|e| {
                ParleyError::Command(format!("Failed to read {}: {}", path.display(), e))
            })?,
            None => {
                let mut buffer = String::new();
                std::io::stdin().read_to_string(&mut buffer)?;
                buffer
            }
        };

        tracing::debug!("Formatting {} bytes of input", raw.len());
        println!("{}", format_response(&raw));
        Ok(())
    }

}
