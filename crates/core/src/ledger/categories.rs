//! Category list shared by all account types.

use committee_shared::config::default_categories;
use serde::{Deserialize, Serialize};

use super::error::LedgerError;

/// Ordered, de-duplicated, grow-only list of category labels.
///
/// Serialized as a plain JSON array of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct CategoryList {
    labels: Vec<String>,
}

impl CategoryList {
    /// Builds a list from labels, trimming them and dropping blanks and
    /// repeats while keeping first-seen order.
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self { labels: Vec::new() };
        for label in labels {
            // Blanks are dropped silently here; `add` reports them.
            let _ = list.add(label.as_ref());
        }
        list
    }

    /// Adds a label unless an equal label is already present.
    ///
    /// Returns `true` if the list grew.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::EmptyCategory`] for a blank label.
    pub fn add(&mut self, label: &str) -> Result<bool, LedgerError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(LedgerError::EmptyCategory);
        }
        if self.contains(label) {
            return Ok(false);
        }
        self.labels.push(label.to_string());
        Ok(true)
    }

    /// Returns true if `label` is present, ignoring surrounding whitespace.
    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        let label = label.trim();
        self.labels.iter().any(|l| l == label)
    }

    /// Labels in insertion order.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Number of labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns true if there are no labels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl Default for CategoryList {
    fn default() -> Self {
        Self::new(default_categories())
    }
}

impl From<Vec<String>> for CategoryList {
    fn from(labels: Vec<String>) -> Self {
        Self::new(labels)
    }
}

impl From<CategoryList> for Vec<String> {
    fn from(list: CategoryList) -> Self {
        list.labels
    }
}
