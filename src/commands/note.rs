use clap::{Args, Subcommand};
use uuid::Uuid;

use crate::models::Note;
use crate::remote::RemoteStore;
use crate::repo::NoteRepository;

#[derive(Args)]
pub struct NoteCommand {
    #[command(subcommand)]
    pub command: NoteSubcommand,
}

#[derive(Subcommand)]
pub enum NoteSubcommand {
    /// Add a new note
    Add {
        /// Note title
        title: String,

        /// Note body
        #[arg(long)]
        content: Option<String>,

        /// Hex color, e.g. #B3E5FC
        #[arg(long)]
        color: Option<String>,

        /// Pin the note to the top of the list
        #[arg(long)]
        pin: bool,
    },

    /// List all notes, pinned first
    List,

    /// Delete a note
    Delete {
        /// Note ID (UUID)
        id: String,
    },
}

impl NoteCommand {
    pub async fn run<R: RemoteStore + 'static>(
        &self,
        repo: &NoteRepository<R>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            NoteSubcommand::Add {
                title,
                content,
                color,
                pin,
            } => {
                let mut note = Note::new(title);
                if let Some(content) = content {
                    note = note.with_content(content);
                }
                if let Some(color) = color {
                    note = note.with_color(color);
                }
                if *pin {
                    note = note.pinned();
                }

                repo.add(&note).await?;
                println!("Added note {} ({})", note.title, note.id);
            }

            NoteSubcommand::List => {
                let notes = repo.list().await?;
                if notes.is_empty() {
                    println!("No notes.");
                    return Ok(());
                }

                for note in notes {
                    let pin = if note.is_pinned { "📌 " } else { "" };
                    let dirty = if note.is_synced { "" } else { " *" };
                    println!("{}{}  {}{}", pin, note.id, note.title, dirty);
                    if !note.content.is_empty() {
                        println!("    {}", note.content);
                    }
                }
            }

            NoteSubcommand::Delete { id } => {
                let id = Uuid::parse_str(id)?;
                repo.delete(id).await?;
                println!("Deleted {}", id);
            }
        }

        Ok(())
    }
}
