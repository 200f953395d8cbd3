mod habit;
mod note;
mod priority;
mod task;
mod transaction;

pub use habit::{current_streak_on, Habit};
pub use note::Note;
pub use priority::Priority;
pub use task::Task;
pub use transaction::{Recurrence, Transaction, TransactionKind};
