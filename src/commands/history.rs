use crate::cli::HistoryCommand;
use crate::config::Config;
use crate::error::{Result, SchoolfinderError};
use crate::history::HistoryView;
use crate::storage::{open_conversation_store, truncate_with_marker, Role};
use colored::Colorize;
use prettytable::{format, Table};

/// Handle history commands
pub fn handle_history(command: HistoryCommand, config: &Config) -> Result<()> {
    let store = open_conversation_store(&config.storage)?;

    match command {
        HistoryCommand::List { search, json } => {
            let view = HistoryView::load(&store).filter(search.as_deref().unwrap_or(""));
            let entries = view.entries(chrono::Utc::now());

            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
                return Ok(());
            }

            if entries.is_empty() {
                println!("{}", "No conversation history found.".yellow());
                return Ok(());
            }

            let mut table = Table::new();
            table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

            table.add_row(prettytable::row![
                "ID".bold(),
                "Title".bold(),
                "Preview".bold(),
                "Messages".bold(),
                "Last Updated".bold()
            ]);

            for entry in entries {
                table.add_row(prettytable::row![
                    entry.id.cyan(),
                    truncate_with_marker(&entry.title, 40),
                    truncate_with_marker(&entry.preview, 40),
                    entry.message_count,
                    entry.updated
                ]);
            }

            println!("\nConversation History:");
            table.printstd();
            println!();
            println!(
                "Use {} to resume a conversation.",
                "schoolfinder chat --resume <ID>".cyan()
            );
            println!();
        }
        HistoryCommand::Show { id, json } => {
            let conversation = store
                .get(&id)
                .ok_or_else(|| SchoolfinderError::Command(format!("Conversation not found: {}", id)))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&conversation)?);
                return Ok(());
            }

            println!("\n{}", conversation.title.bold());
            println!(
                "{}  updated {}\n",
                conversation.id.cyan(),
                conversation.last_updated.format("%Y-%m-%d %H:%M")
            );
            for message in &conversation.messages {
                let speaker = match message.role {
                    Role::User => "You:".cyan().bold(),
                    Role::Assistant => "Assistant:".purple().bold(),
                };
                println!("{} {}\n", speaker, message.content);
            }
        }
        HistoryCommand::Delete { id } => {
            if store.get(&id).is_none() {
                println!("{}", format!("Conversation {} not found", id).yellow());
                return Ok(());
            }
            store.delete(&id);
            println!("{}", format!("Deleted conversation {}", id).green());
        }
        HistoryCommand::Clear => {
            store.clear_all();
            println!("{}", "Cleared all conversation history.".green());
        }
    }

    Ok(())
}
