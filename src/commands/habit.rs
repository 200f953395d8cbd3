use clap::{Args, Subcommand};
use uuid::Uuid;

use crate::models::Habit;
use crate::remote::RemoteStore;
use crate::repo::HabitRepository;

#[derive(Args)]
pub struct HabitCommand {
    #[command(subcommand)]
    pub command: HabitSubcommand,
}

#[derive(Subcommand)]
pub enum HabitSubcommand {
    /// Add a new habit
    Add {
        /// Habit title
        title: String,

        /// Icon (emoji)
        #[arg(long)]
        icon: Option<String>,

        /// Daily reminder time (HH:MM)
        #[arg(long)]
        reminder: Option<String>,
    },

    /// List habits with their current streaks
    List,

    /// Record a completion for today
    Check {
        /// Habit ID (UUID)
        id: String,
    },

    /// Delete a habit
    Delete {
        /// Habit ID (UUID)
        id: String,
    },
}

impl HabitCommand {
    pub async fn run<R: RemoteStore + 'static>(
        &self,
        repo: &HabitRepository<R>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            HabitSubcommand::Add {
                title,
                icon,
                reminder,
            } => {
                let mut habit = Habit::new(title);
                if let Some(icon) = icon {
                    habit = habit.with_icon(icon);
                }
                if let Some(reminder) = reminder {
                    habit = habit.with_reminder(reminder);
                }

                repo.add(&habit).await?;
                println!("Added habit {} ({})", habit.title, habit.id);
            }

            HabitSubcommand::List => {
                let habits = repo.list().await?;
                if habits.is_empty() {
                    println!("No habits.");
                    return Ok(());
                }

                for habit in habits {
                    let streak = habit.current_streak();
                    let dirty = if habit.is_synced { "" } else { " *" };
                    println!(
                        "{} {}  {} - streak: {} day{}{}",
                        habit.icon,
                        habit.id,
                        habit.title,
                        streak,
                        if streak == 1 { "" } else { "s" },
                        dirty
                    );
                }
            }

            HabitSubcommand::Check { id } => {
                let id = Uuid::parse_str(id)?;
                let habit = repo.check_in(id).await?;
                println!(
                    "Checked in {}, streak is now {}",
                    habit.title,
                    habit.current_streak()
                );
            }

            HabitSubcommand::Delete { id } => {
                let id = Uuid::parse_str(id)?;
                repo.delete(id).await?;
                println!("Deleted {}", id);
            }
        }

        Ok(())
    }
}
