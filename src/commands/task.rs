use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use clap::{Args, Subcommand};
use std::str::FromStr;
use uuid::Uuid;

use crate::models::{Priority, Task};
use crate::remote::RemoteStore;
use crate::repo::TaskRepository;

#[derive(Args)]
pub struct TaskCommand {
    #[command(subcommand)]
    pub command: TaskSubcommand,
}

#[derive(Subcommand)]
pub enum TaskSubcommand {
    /// Add a new task
    Add {
        /// Task title
        title: String,

        /// Category
        #[arg(long, default_value = "General")]
        category: String,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,

        /// Priority (low, medium, high)
        #[arg(long, default_value = "medium")]
        priority: String,

        /// Longer description
        #[arg(long)]
        description: Option<String>,
    },

    /// List all tasks
    List {
        /// Only show tasks that are not completed yet
        #[arg(long)]
        pending: bool,
    },

    /// Toggle a task's completion
    Done {
        /// Task ID (UUID)
        id: String,
    },

    /// Delete a task
    Delete {
        /// Task ID (UUID)
        id: String,
    },
}

impl TaskCommand {
    pub async fn run<R: RemoteStore + 'static>(
        &self,
        repo: &TaskRepository<R>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            TaskSubcommand::Add {
                title,
                category,
                due,
                priority,
                description,
            } => {
                let mut task = Task::new(title)
                    .with_category(category)
                    .with_priority(Priority::from_str(priority)?);
                if let Some(due) = due {
                    let date = NaiveDate::parse_from_str(due, "%Y-%m-%d")?;
                    let time =
                        NaiveTime::from_hms_opt(9, 0, 0).ok_or("invalid default due time")?;
                    task = task.with_due_date(Utc.from_utc_datetime(&date.and_time(time)));
                }
                if let Some(description) = description {
                    task = task.with_description(description);
                }

                repo.add(&task).await?;
                println!("Added task {} ({})", task.title, task.id);
            }

            TaskSubcommand::List { pending } => {
                let tasks = repo.list().await?;
                let tasks: Vec<_> = tasks
                    .into_iter()
                    .filter(|t| !pending || !t.is_completed)
                    .collect();

                if tasks.is_empty() {
                    println!("No tasks.");
                    return Ok(());
                }

                for task in tasks {
                    let check = if task.is_completed { "x" } else { " " };
                    let dirty = if task.is_synced { "" } else { " *" };
                    println!(
                        "[{}] {}  {} ({}, due {}){}",
                        check,
                        task.id,
                        task.title,
                        task.priority,
                        task.due_date.format("%Y-%m-%d"),
                        dirty
                    );
                }
            }

            TaskSubcommand::Done { id } => {
                let id = Uuid::parse_str(id)?;
                repo.toggle_completion(id).await?;
                println!("Toggled {}", id);
            }

            TaskSubcommand::Delete { id } => {
                let id = Uuid::parse_str(id)?;
                repo.delete(id).await?;
                println!("Deleted {}", id);
            }
        }

        Ok(())
    }
}
