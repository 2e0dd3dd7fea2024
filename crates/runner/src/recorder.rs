//! Run-scoped result recording

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a single test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    Pass,
    Fail,
    /// Informational; counted as neither pass nor fail
    Warn,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Outcome::Pass => "PASS",
            Outcome::Fail => "FAIL",
            Outcome::Warn => "WARN",
        };
        f.write_str(label)
    }
}

/// Result of one dispatched test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub outcome: Outcome,
    pub message: String,
}

/// Counters and result log for one run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    passed: usize,
    failed: usize,
    failures: Vec<String>,
    results: Vec<TestResult>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a result and return it
    pub fn record(
        &mut self,
        name: impl Into<String>,
        outcome: Outcome,
        message: impl Into<String>,
    ) -> &TestResult {
        let name = name.into();
        let message = message.into();

        match outcome {
            Outcome::Pass => self.passed += 1,
            Outcome::Fail => {
                self.failed += 1;
                self.failures.push(format!("{}: {}", name, message));
            }
            Outcome::Warn => {}
        }

        self.results.push(TestResult { name, outcome, message });
        &self.results[self.results.len() - 1]
    }

    pub fn passed(&self) -> usize {
        self.passed
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Passed plus failed; warnings are excluded
    pub fn total(&self) -> usize {
        self.passed + self.failed
    }

    /// `"name: message"` for every failure, in record order
    pub fn failures(&self) -> &[String] {
        &self.failures
    }

    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    /// Percentage of passed tests, `None` before anything was counted
    pub fn success_rate(&self) -> Option<f64> {
        let total = self.total();
        if total == 0 {
            None
        } else {
            Some(self.passed as f64 / total as f64 * 100.0)
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}
