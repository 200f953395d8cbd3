use clap::{Args, Subcommand};
use std::str::FromStr;
use uuid::Uuid;

use crate::models::{Recurrence, Transaction, TransactionKind};
use crate::remote::RemoteStore;
use crate::repo::TransactionRepository;

#[derive(Args)]
pub struct FinanceCommand {
    #[command(subcommand)]
    pub command: FinanceSubcommand,
}

#[derive(Subcommand)]
pub enum FinanceSubcommand {
    /// Record a transaction
    Add {
        /// What the money was for
        title: String,

        /// Amount
        amount: f64,

        /// income or expense
        #[arg(long, default_value = "expense")]
        kind: String,

        /// Category
        #[arg(long, default_value = "General")]
        category: String,

        /// none, monthly or yearly
        #[arg(long, default_value = "none")]
        recurrence: String,
    },

    /// List all transactions
    List,

    /// Show income minus expenses
    Balance,

    /// Delete a transaction
    Delete {
        /// Transaction ID (UUID)
        id: String,
    },
}

impl FinanceCommand {
    pub async fn run<R: RemoteStore + 'static>(
        &self,
        repo: &TransactionRepository<R>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            FinanceSubcommand::Add {
                title,
                amount,
                kind,
                category,
                recurrence,
            } => {
                let tx = Transaction::new(title, *amount, TransactionKind::from_str(kind)?)
                    .with_category(category)
                    .with_recurrence(Recurrence::from_str(recurrence)?);

                repo.add(&tx).await?;
                println!("Recorded {} {:.2} ({})", tx.kind, tx.amount, tx.id);
            }

            FinanceSubcommand::List => {
                let transactions = repo.list().await?;
                if transactions.is_empty() {
                    println!("No transactions.");
                    return Ok(());
                }

                for tx in transactions {
                    let sign = match tx.kind {
                        TransactionKind::Income => "+",
                        TransactionKind::Expense => "-",
                    };
                    let dirty = if tx.is_synced { "" } else { " *" };
                    println!(
                        "{}  {}{:.2}  {} [{}]{}",
                        tx.id, sign, tx.amount, tx.title, tx.category, dirty
                    );
                }
            }

            FinanceSubcommand::Balance => {
                let balance = repo.balance().await?;
                println!("Balance: {:.2}", balance);
            }

            FinanceSubcommand::Delete { id } => {
                let id = Uuid::parse_str(id)?;
                repo.delete(id).await?;
                println!("Deleted {}", id);
            }
        }

        Ok(())
    }
}
