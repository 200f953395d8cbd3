use clap::Args;

use crate::ai::BrainDumpClient;
use crate::remote::RemoteStore;
use crate::repo::TaskRepository;

/// Turn free text into structured tasks
#[derive(Args)]
pub struct BraindumpCommand {
    /// Free-form text, e.g. "buy milk and call Juan tomorrow at 3pm"
    pub text: Vec<String>,

    /// Save the extracted tasks instead of just printing them
    #[arg(long)]
    pub save: bool,
}

impl BraindumpCommand {
    pub async fn run<R: RemoteStore + 'static>(
        &self,
        client: &BrainDumpClient,
        repo: &TaskRepository<R>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let input = self.text.join(" ");
        if input.trim().is_empty() {
            return Err("nothing to process; pass some text".into());
        }

        let extracted = client.generate_tasks(&input).await?;
        if extracted.is_empty() {
            println!("No tasks found in that text.");
            return Ok(());
        }

        for brain_task in extracted {
            let task = brain_task.into_task();
            println!("- {} (due {})", task.title, task.due_date.format("%Y-%m-%d %H:%M"));
            if self.save {
                repo.add(&task).await?;
            }
        }

        if self.save {
            println!();
            println!("Saved.");
        } else {
            println!();
            println!("Re-run with --save to add these tasks.");
        }

        Ok(())
    }
}
