/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `chat`     - Interactive assistant / classic search session
- `history`  - Listing, showing and deleting saved conversations

The handlers are thin: they wire configuration, the conversation store and
the chat session together and take care of terminal output.
*/

use crate::commands::special_commands::{
    parse_special_command, print_help, quick_question, SpecialCommand, QUICK_QUESTIONS,
};
use crate::config::Config;
use crate::error::Result;
use crate::handoff::{resume_channel, ResumeReceiver};
use crate::history::{request_resume, HistoryView};
use crate::responder::FixedResponder;
use crate::session::{ChatSession, SessionSettings};
use crate::storage::{
    open_conversation_store, ConversationStore, KeyValueStore, Message, Role, SledStore,
};
use crate::view_mode::{SearchContainer, ViewMode};
use std::sync::Arc;

// Special commands parser for the interactive session
pub mod special_commands;

// History management commands
pub mod history;

// Chat command handler
pub mod chat {
    //! Interactive session handler.
    //!
    //! Opens the conversation store, creates a `ChatSession`, and runs a
    //! readline-based loop that sends questions to the assistant while in
    //! assistant mode.

    use super::*;
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start the interactive session
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `mode` - Optional starting view ("assistant" or "classic")
    /// * `resume` - Optional id of a saved conversation to continue
    ///
    /// # Examples
    ///
    /// ```
    /// use schoolfinder::commands::chat;
    /// use schoolfinder::config::Config;
    ///
    /// // In application code:
    /// // chat::run_chat(Config::default(), None, None).await?;
    /// ```
    pub async fn run_chat(config: Config, mode: Option<String>, resume: Option<String>) -> Result<()> {
        tracing::info!("Starting interactive session");

        let initial_mode = match mode.as_deref() {
            Some(m) => ViewMode::parse_str(m).unwrap_or_else(|e| {
                tracing::warn!("{}, falling back to {}", e, config.chat.default_mode);
                ViewMode::parse_str(&config.chat.default_mode).unwrap_or_default()
            }),
            None => ViewMode::parse_str(&config.chat.default_mode).unwrap_or_default(),
        };
        let mut container = SearchContainer::new(initial_mode);

        let store = Arc::new(open_conversation_store(&config.storage)?);
        let responder = Arc::new(FixedResponder::new(config.chat.reply.clone()));
        let mut session = ChatSession::new(
            Arc::clone(&store),
            responder,
            SessionSettings::from_config(&config.chat),
        );

        let mut pending_resume = resume.and_then(|id| start_resume(&store, &id));

        let mut rl = DefaultEditor::new()?;

        print_welcome_banner(container.mode());
        print_transcript(session.messages());
        if pending_resume.is_none() {
            print_quick_questions();
        }

        loop {
            if let Some(mut rx) = pending_resume.take() {
                if let Some(conversation) = rx.take() {
                    container.switch_to(ViewMode::Assistant);
                    session.resume(conversation);
                    println!("{}", "Resumed conversation.".green());
                    print_transcript(session.messages());
                } else if rx.is_pending() {
                    pending_resume = Some(rx);
                }
            }

            let prompt = container.format_prompt();
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    rl.add_history_entry(trimmed)?;

                    let command = match parse_special_command(trimmed) {
                        Ok(cmd) => cmd,
                        Err(e) => {
                            eprintln!("{}\n", e);
                            continue;
                        }
                    };

                    let question = match command {
                        SpecialCommand::ToggleMode => {
                            let old = container.toggle();
                            println!("Switched from {} to {} mode\n", old, container.mode());
                            continue;
                        }
                        SpecialCommand::SwitchMode(new_mode) => {
                            let old = container.switch_to(new_mode);
                            println!("Switched from {} to {} mode\n", old, new_mode);
                            continue;
                        }
                        SpecialCommand::History(query) => {
                            print_history(&store, query.as_deref().unwrap_or(""));
                            continue;
                        }
                        SpecialCommand::Resume(id) => {
                            pending_resume = start_resume(&store, &id);
                            continue;
                        }
                        SpecialCommand::NewConversation => {
                            session.reset();
                            println!("{}", "Started a new conversation.".green());
                            print_transcript(session.messages());
                            print_quick_questions();
                            continue;
                        }
                        SpecialCommand::ShowStatus => {
                            print_status_display(&container, &session);
                            continue;
                        }
                        SpecialCommand::Help => {
                            print_help();
                            continue;
                        }
                        SpecialCommand::Questions => {
                            print_quick_questions();
                            continue;
                        }
                        SpecialCommand::Exit => break,
                        SpecialCommand::QuickQuestion(n) => match quick_question(n) {
                            Some(q) => {
                                println!("{} {}\n", "You:".cyan().bold(), q);
                                q
                            }
                            None => continue,
                        },
                        SpecialCommand::None => trimmed,
                    };

                    if container.mode() == ViewMode::Classic {
                        println!(
                            "{}\n",
                            "Classic search filters are not available here. Use /toggle to ask the assistant."
                                .yellow()
                        );
                        continue;
                    }

                    let Some(pending) = session.send(question) else {
                        continue;
                    };

                    println!("{}", "Searching...".dimmed());
                    let cancelled = pending.cancellation().clone();
                    let reply = tokio::select! {
                        reply = session.receive(pending) => reply,
                        _ = tokio::signal::ctrl_c() => {
                            cancelled.cancel();
                            None
                        }
                    };

                    match reply {
                        Some(message) => print_message(&message),
                        None => {
                            session.cancel_reply();
                            println!("{}\n", "No reply.".yellow());
                        }
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

        session.close();
        println!("Goodbye!");
        Ok(())
    }

    /// Look up `conversation_id` and hand it to the session loop
    fn start_resume(
        store: &ConversationStore<SledStore>,
        conversation_id: &str,
    ) -> Option<ResumeReceiver> {
        let (tx, rx) = resume_channel();
        if request_resume(store, conversation_id, tx) {
            Some(rx)
        } else {
            eprintln!(
                "{}\n",
                format!("Conversation not found: {}", conversation_id).red()
            );
            None
        }
    }

    /// Display welcome banner at the start of the session
    fn print_welcome_banner(mode: ViewMode) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║              SchoolFinder - Find Your School                 ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Mode: {} ({})\n", mode.colored_tag(), mode.description());
        println!("Type '/help' for available commands, 'exit' to quit\n");
    }

    /// Display the current view and conversation
    fn print_status_display<S: KeyValueStore>(
        container: &SearchContainer,
        session: &ChatSession<S>,
    ) {
        let mode = container.mode();

        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                   SchoolFinder Session Status                ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("View Mode:         {} ({})", mode.colored_tag(), mode.description());
        println!(
            "Conversation:      {}",
            session.conversation_id().unwrap_or("(not saved yet)")
        );
        println!("Conversation Size: {} messages", session.messages().len());
        println!("Prompt Format:     {}", container.format_prompt());
        println!();
    }

    /// List the starter questions, numbered for `/questions <n>`
    fn print_quick_questions() {
        println!("{}", "Quick questions:".bold());
        for (i, (category, question)) in QUICK_QUESTIONS.iter().enumerate() {
            println!("  {}. {} {}", i + 1, format!("[{}]", category).dimmed(), question);
        }
        println!("Ask one with {}\n", "/questions <n>".cyan());
    }

    fn print_transcript(messages: &[Message]) {
        for message in messages {
            print_message(message);
        }
    }

    fn print_message(message: &Message) {
        match message.role {
            Role::User => println!("{} {}\n", "You:".cyan().bold(), message.content),
            Role::Assistant => {
                println!("{} {}\n", "Assistant:".purple().bold(), message.content)
            }
        }
    }

    /// Print saved conversations matching `query`, most recent first
    fn print_history(store: &ConversationStore<SledStore>, query: &str) {
        let view = HistoryView::load(store).filter(query);
        if view.is_empty() {
            println!("{}\n", "No conversation history found.".yellow());
            return;
        }

        println!();
        for entry in view.entries(chrono::Utc::now()) {
            println!(
                "{}  {}  {}",
                entry.id.cyan(),
                entry.title.bold(),
                entry.updated.dimmed()
            );
            println!("    {}", entry.preview);
        }
        println!("\nUse {} to continue one.\n", "/resume <ID>".cyan());
    }
}
