//! Per-unit outcomes of a run.
//!
//! [`DiffMap`] maps every configuration unit path to exactly one
//! [`DiffOutcome`]. Entries are write-once, and iteration is always sorted
//! by path so reports are reproducible regardless of processing order.

use std::collections::btree_map::{BTreeMap, Entry};

use crate::error::Error;

/// What happened to one configuration unit.
#[derive(Debug)]
pub enum DiffOutcome {
    /// The unified diff of the two renders; empty when nothing changed.
    Content(String),
    /// Rendering or diffing the unit failed.
    Failure(Error),
}

impl DiffOutcome {
    /// Whether this outcome carries nothing to report.
    pub fn is_trivial(&self) -> bool {
        matches!(self, DiffOutcome::Content(content) if content.is_empty())
    }

    /// Plain text form: the diff itself, or the error message.
    pub fn as_text(&self) -> String {
        match self {
            DiffOutcome::Content(content) => content.clone(),
            DiffOutcome::Failure(err) => err.to_string(),
        }
    }

    /// Markdown code block for this outcome.
    ///
    /// An unchanged unit renders as an explicit `N/A` block, never as an
    /// empty string.
    pub fn as_markdown(&self) -> String {
        match self {
            DiffOutcome::Failure(err) => fenced("", &err.to_string()),
            DiffOutcome::Content(content) if content.is_empty() => "```N/A```".to_string(),
            DiffOutcome::Content(content) => fenced("diff", content),
        }
    }
}

impl From<crate::error::Result<String>> for DiffOutcome {
    fn from(result: crate::error::Result<String>) -> Self {
        match result {
            Ok(content) => DiffOutcome::Content(content),
            Err(err) => DiffOutcome::Failure(err),
        }
    }
}

fn fenced(tag: &str, body: &str) -> String {
    let mut block = format!("```{}\n{}", tag, body);
    if !body.ends_with('\n') {
        block.push('\n');
    }
    block.push_str("```");
    block
}

/// Outcomes of a run keyed by unit path.
#[derive(Debug, Default)]
pub struct DiffMap {
    results: BTreeMap<String, DiffOutcome>,
}

impl DiffMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of `unit`.
    ///
    /// Returns `false` and keeps the existing outcome if `unit` was already
    /// recorded.
    pub fn record(&mut self, unit: impl Into<String>, outcome: DiffOutcome) -> bool {
        match self.results.entry(unit.into()) {
            Entry::Vacant(slot) => {
                slot.insert(outcome);
                true
            }
            Entry::Occupied(slot) => {
                log::warn!("Ignoring a second outcome for {}", slot.key());
                false
            }
        }
    }

    pub fn get(&self, unit: &str) -> Option<&DiffOutcome> {
        self.results.get(unit)
    }

    /// Unit paths in lexicographic order.
    pub fn dirs(&self) -> Vec<&str> {
        self.results.keys().map(String::as_str).collect()
    }

    /// Entries in lexicographic path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DiffOutcome)> {
        self.results.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Whether every unit is unchanged.
    pub fn is_trivial(&self) -> bool {
        self.results.values().all(DiffOutcome::is_trivial)
    }

    /// Markdown for every unit, one `## path:` section each.
    pub fn as_markdown(&self) -> String {
        self.iter()
            .map(|(path, outcome)| format!("## {}:\n{}", path, outcome.as_markdown()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
