// 🧾 Expense Record Model
// A single spending event plus the closed set of categories it can belong to

use anyhow::{anyhow, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// CATEGORY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    #[default]
    Food,
    Travel,
    Bills,
    Other,
}

impl Category {
    /// Fixed enumeration order, used by summaries and pickers
    pub const ALL: [Category; 4] = [
        Category::Food,
        Category::Travel,
        Category::Bills,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Travel => "Travel",
            Category::Bills => "Bills",
            Category::Other => "Other",
        }
    }

    /// Next category in enumeration order (wraps around)
    pub fn next(&self) -> Self {
        match self {
            Category::Food => Category::Travel,
            Category::Travel => Category::Bills,
            Category::Bills => Category::Other,
            Category::Other => Category::Food,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Category::Food => Category::Other,
            Category::Travel => Category::Food,
            Category::Bills => Category::Travel,
            Category::Other => Category::Bills,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    /// Case-sensitive, matching the persisted form
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Food" => Ok(Category::Food),
            "Travel" => Ok(Category::Travel),
            "Bills" => Ok(Category::Bills),
            "Other" => Ok(Category::Other),
            other => Err(anyhow!("Unknown category: {:?}", other)),
        }
    }
}

// ============================================================================
// EXPENSE
// ============================================================================

/// A recorded expense.
///
/// `id` is assigned once at creation and never changes; every other field can
/// be replaced by an edit. `date` is kept as `YYYY-MM-DD` text so plain string
/// comparison orders it.
///
/// Deserialization is lenient towards older or hand-edited data: numeric ids
/// and numeric-string amounts are accepted, a null or missing note is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    #[serde(deserialize_with = "lenient_id")]
    pub id: String,
    #[serde(deserialize_with = "lenient_amount")]
    pub amount: f64,
    pub date: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub note: String,
    pub category: Category,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(serde_json::Number),
    Text(String),
}

fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => Ok(n.to_string()),
        NumberOrText::Text(s) => Ok(s),
    }
}

fn lenient_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => n
            .as_f64()
            .ok_or_else(|| serde::de::Error::custom(format!("amount out of range: {}", n))),
        NumberOrText::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("amount is not a number: {:?}", s))),
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Expense {
    /// Editable payload of this expense, without its identity
    pub fn payload(&self) -> NewExpense {
        NewExpense {
            amount: self.amount,
            date: self.date.clone(),
            note: self.note.clone(),
            category: self.category,
        }
    }
}

/// Validated expense that has not been given an id yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub amount: f64,
    pub date: String,
    pub note: String,
    pub category: Category,
}

impl NewExpense {
    pub fn with_id(self, id: impl Into<String>) -> Expense {
        Expense {
            id: id.into(),
            amount: self.amount,
            date: self.date,
            note: self.note,
            category: self.category,
        }
    }
}
