use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Income => write!(f, "INCOME"),
            TransactionKind::Expense => write!(f, "EXPENSE"),
        }
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "INCOME" => Ok(TransactionKind::Income),
            "EXPENSE" => Ok(TransactionKind::Expense),
            _ => Err(format!(
                "Invalid transaction kind '{}'. Valid options: income, expense",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Recurrence {
    None,
    Monthly,
    Yearly,
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recurrence::None => write!(f, "NONE"),
            Recurrence::Monthly => write!(f, "MONTHLY"),
            Recurrence::Yearly => write!(f, "YEARLY"),
        }
    }
}

impl FromStr for Recurrence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "NONE" => Ok(Recurrence::None),
            "MONTHLY" => Ok(Recurrence::Monthly),
            "YEARLY" => Ok(Recurrence::Yearly),
            _ => Err(format!(
                "Invalid recurrence '{}'. Valid options: none, monthly, yearly",
                s
            )),
        }
    }
}

/// A personal finance entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub title: String,
    pub amount: f64,
    pub kind: TransactionKind,
    pub category: String,
    pub is_recurring: bool,
    pub recurrence: Recurrence,
    pub timestamp: DateTime<Utc>,
    #[serde(skip)]
    pub is_synced: bool,
}

impl Transaction {
    pub fn new(title: impl Into<String>, amount: f64, kind: TransactionKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            amount,
            kind,
            category: "General".to_string(),
            is_recurring: false,
            recurrence: Recurrence::None,
            timestamp: Utc::now(),
            is_synced: false,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_recurrence(mut self, recurrence: Recurrence) -> Self {
        self.is_recurring = recurrence != Recurrence::None;
        self.recurrence = recurrence;
        self
    }
}
