/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes three top-level command modules:

- `chat`: Interactive chat session
- `ask`: Send one question and print the reply
- `health`: Probe the backend's health endpoint

The handlers wire the library components together: configuration, the
HTTP backend, the terminal transcript view, the controller, and the slide
rotators.
*/

use crate::client::HttpChatBackend;
use crate::config::Config;
use crate::controller::{ChatController, SubmissionOutcome};
use crate::error::{Result, SitechatError};
use crate::session::SessionId;
use crate::terminal::TerminalView;

use std::io::Write;

// Special commands parser for the interactive loop
pub mod special_commands;

/// Build a controller rendering into `view`, with a fresh session token
fn build_controller<W: Write>(
    config: &Config,
    view: TerminalView<W>,
) -> Result<ChatController<HttpChatBackend, TerminalView<W>>> {
    let backend = HttpChatBackend::from_config(&config.chat)?;
    let session = SessionId::generate();
    tracing::info!(session_id = %session, endpoint = %backend.chat_url(), "Chat session created");
    Ok(ChatController::new(
        backend,
        view,
        session,
        config.messages.clone(),
        config.chat.max_sources,
    ))
}

// Chat command handler
pub mod chat {
    //! Interactive chat mode handler.
    //!
    //! Starts the configured slide rotators, creates a controller rendering
    //! to the terminal, and runs a readline loop that submits each line.

    use super::*;
    use crate::commands::special_commands::{
        message_text, parse_special_command, print_help, SpecialCommand,
    };
    use crate::rotator::{self, Rotation};
    use crate::transcript::Speaker;
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start interactive chat mode
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    ///
    /// # Errors
    ///
    /// Returns error if the backend cannot be configured, a rotator cannot
    /// start, or the line editor fails to initialize
    pub async fn run_chat(config: Config) -> Result<()> {
        tracing::info!("Starting interactive chat mode");

        let rotations = rotator::start_configured(&config.slides)?;
        let mut controller =
            build_controller(&config, TerminalView::stdout(config.messages.clone()))?;

        let mut rl = DefaultEditor::new()?;

        print_welcome_banner(&config, &rotations);

        loop {
            let prompt = format!("{} ", ">".green().bold());
            match rl.readline(&prompt) {
                Ok(line) => {
                    match parse_special_command(&line) {
                        Ok(SpecialCommand::ShowStatus) => {
                            print_status_display(&controller);
                            continue;
                        }
                        Ok(SpecialCommand::ShowSlides) => {
                            print_slides(&rotations);
                            continue;
                        }
                        Ok(SpecialCommand::Help) => {
                            print_help();
                            continue;
                        }
                        Ok(SpecialCommand::Exit) => break,
                        Ok(SpecialCommand::None) => {}
                        Err(e) => {
                            println!("{}", e.to_string().yellow());
                            continue;
                        }
                    }

                    if !line.trim().is_empty() {
                        rl.add_history_entry(line.trim())?;
                    }

                    controller.set_input(message_text(&line));
                    let outcome = controller.submit().await;
                    tracing::debug!(?outcome, "Submission finished");
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

        tracing::info!(
            messages = controller.view().transcript().len(),
            "Chat session ended"
        );
        Ok(())
    }

    fn print_welcome_banner(config: &Config, rotations: &[Rotation]) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!(
            "║ {:^60} ║",
            format!("{} - Chat", config.messages.assistant_name)
        );
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        for rotation in rotations {
            println!(
                "{} {}",
                rotation.selector().dimmed(),
                rotation.active_slide().image
            );
        }
        println!("Type '/help' for available commands, 'exit' to quit\n");
    }

    fn print_status_display<W: Write>(
        controller: &ChatController<HttpChatBackend, TerminalView<W>>,
    ) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                     Sitechat Session Status                  ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("{}", status_report(controller));
    }

    /// Session status lines printed by `/status`
    pub(super) fn status_report<W: Write>(
        controller: &ChatController<HttpChatBackend, TerminalView<W>>,
    ) -> String {
        let transcript = controller.view().transcript();
        let enabled = if controller.submit_control().is_enabled() {
            "yes".green()
        } else {
            "no".red()
        };

        format!(
            "Session ID:        {}\n\
             Chat endpoint:     {}\n\
             State:             {}\n\
             Messages:          {} ({} questions)\n\
             Send enabled:      {}\n",
            controller.session(),
            controller.backend().chat_url(),
            controller.state(),
            transcript.len(),
            transcript.count(Speaker::User),
            enabled
        )
    }

    fn print_slides(rotations: &[Rotation]) {
        if rotations.is_empty() {
            println!("{}", "No slide rotators are running".yellow());
            return;
        }
        for rotation in rotations {
            let markers: String = rotation
                .active_flags()
                .iter()
                .map(|active| if *active { '●' } else { '○' })
                .collect();
            println!(
                "{:<20} {} {}",
                rotation.selector(),
                markers,
                rotation.active_slide().image
            );
        }
        println!();
    }
}

// One-shot question handler
pub mod ask {
    //! Sends a single question and prints the rendered reply.

    use super::*;

    /// Ask one question, rendering into standard output
    ///
    /// # Errors
    ///
    /// Returns error if the message is blank or the request failed; the
    /// failure has already been rendered as the error phrase
    pub async fn run_ask(config: Config, message: String) -> Result<()> {
        let view = TerminalView::stdout(config.messages.clone());
        ask(&config, &message, view).await.map(|_| ())
    }

    /// Ask one question, rendering into `view`, and hand the view back
    ///
    /// # Errors
    ///
    /// Returns error if the message is blank or the request failed
    pub async fn ask<W: Write>(
        config: &Config,
        message: &str,
        view: TerminalView<W>,
    ) -> Result<TerminalView<W>> {
        let mut controller = build_controller(config, view)?;
        controller.set_input(message);

        match controller.submit().await {
            SubmissionOutcome::Resolved => Ok(controller.into_view()),
            SubmissionOutcome::Ignored => {
                Err(SitechatError::Config("Nothing to send: message is blank".to_string()).into())
            }
            SubmissionOutcome::Failed => {
                Err(SitechatError::Transport("The chat request failed".to_string()).into())
            }
        }
    }
}

// Backend health probe
pub mod health {
    //! Queries `GET /health` on the resolved origin.

    use super::*;
    use crate::client::HealthStatus;
    use colored::Colorize;
    use url::Url;

    /// Print the backend's health status
    ///
    /// # Errors
    ///
    /// Returns error if the backend is unreachable or unhealthy
    pub async fn run_health(config: Config) -> Result<()> {
        let (url, health) = check_health(&config).await?;
        let status = if health.status == "ok" {
            health.status.green()
        } else {
            health.status.yellow()
        };
        println!("{} {}", url, status);
        Ok(())
    }

    /// Query the health endpoint and return the URL that was queried
    /// alongside the reported status
    ///
    /// # Errors
    ///
    /// Returns error if the backend is unreachable or unhealthy
    pub async fn check_health(config: &Config) -> Result<(Url, HealthStatus)> {
        let backend = HttpChatBackend::from_config(&config.chat)?;
        let health = backend.health().await?;
        tracing::debug!(url = %backend.health_url(), status = %health.status, "Health checked");
        Ok((backend.health_url().clone(), health))
    }
}
