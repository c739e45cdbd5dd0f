//! Record types held by the store.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// One registered record. The identifier is the key indexed for lookup and
/// autocomplete; the other fields are carried along.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Unique identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Category label
    pub category: String,

    /// Numeric score
    pub score: f64,
}

impl Record {
    /// Creates a new record.
    pub fn new<I, N, C>(id: I, name: N, category: C, score: f64) -> Self
    where
        I: Into<String>,
        N: Into<String>,
        C: Into<String>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            score,
        }
    }

    /// Applies the fields present in `update`, keeping the others.
    pub fn apply(&mut self, update: RecordUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(score) = update.score {
            self.score = score;
        }
    }
}

impl Display for Record {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Number:   {}", self.id)?;
        writeln!(f, "Name:     {}", self.name)?;
        writeln!(f, "Category: {}", self.category)?;
        write!(f, "Score:    {}", self.score)
    }
}

/// Partial change to a record. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordUpdate {
    /// New display name
    pub name: Option<String>,

    /// New category label
    pub category: Option<String>,

    /// New score
    pub score: Option<f64>,
}

impl RecordUpdate {
    /// Returns `true` if the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.category.is_none() && self.score.is_none()
    }
}
