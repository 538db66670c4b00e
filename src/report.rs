use serde::Serialize;

/// One item of a batch that did not make it through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub item: String,
    pub reason: String,
}

/// Outcome of a batch step: what succeeded and what was skipped, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<Failure>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn record_success(&mut self, item: impl Into<String>) {
        self.succeeded.push(item.into());
    }

    pub fn record_failure(&mut self, item: impl Into<String>, reason: impl ToString) {
        self.failed.push(Failure {
            item: item.into(),
            reason: reason.to_string(),
        });
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn is_all_failed(&self) -> bool {
        self.succeeded.is_empty()
    }
}

impl Default for BatchReport {
    fn default() -> Self {
        Self::new()
    }
}
