mod braindump;
mod config_cmd;
mod finance;
mod habit;
mod note;
mod sync_cmd;
mod task;

pub use braindump::BraindumpCommand;
pub use config_cmd::ConfigCommand;
pub use finance::FinanceCommand;
pub use habit::HabitCommand;
pub use note::NoteCommand;
pub use sync_cmd::SyncCommand;
pub use task::TaskCommand;
