use crate::problem::{CPU_TIME_LIMIT_SECS, CodingProblem, MEMORY_LIMIT_KB, TestCase};
use serde::{Deserialize, Serialize};

/// Candidate code plus the test cases it must pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSubmission {
    pub language: String,
    pub source_code: String,
    pub test_cases: Vec<TestCase>,
    pub cpu_time_limit_secs: u32,
    pub memory_limit_kb: u32,
}

impl CodeSubmission {
    /// Builds a submission for `problem` with the default sandbox limits.
    pub fn for_problem(
        problem: &CodingProblem,
        language: impl Into<String>,
        source_code: impl Into<String>,
    ) -> Self {
        Self {
            language: language.into(),
            source_code: source_code.into(),
            test_cases: problem.test_cases.clone(),
            cpu_time_limit_secs: CPU_TIME_LIMIT_SECS,
            memory_limit_kb: MEMORY_LIMIT_KB,
        }
    }
}

/// Outcome of one test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestOutcome {
    /// 1-based test case number.
    pub test_case: usize,
    pub status: String,
    pub passed: bool,
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub error: String,
    /// Wall time in milliseconds.
    #[serde(default)]
    pub time_ms: f64,
    #[serde(default)]
    pub memory_kb: u64,
}

/// Summary of running a submission against every test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodingResult {
    pub passed: usize,
    pub total: usize,
    /// Percentage of passing tests, 0.0 to 100.0.
    pub pass_rate: f64,
    /// Mean execution time across tests, in milliseconds.
    pub exec_time_ms: u64,
    pub max_memory_kb: u64,
    /// First failure message, empty when everything passed.
    pub stderr: String,
    pub results: Vec<TestOutcome>,
}

impl CodingResult {
    /// Summarizes per-test outcomes. `total` is the number of test cases
    /// submitted, which may exceed `outcomes.len()` if some never ran.
    pub fn from_outcomes(outcomes: Vec<TestOutcome>, total: usize) -> Self {
        let passed = outcomes.iter().filter(|o| o.passed).count();
        let pass_rate = if total > 0 {
            passed as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        let exec_time_ms = if outcomes.is_empty() {
            0
        } else {
            (outcomes.iter().map(|o| o.time_ms).sum::<f64>() / outcomes.len() as f64).round()
                as u64
        };
        let max_memory_kb = outcomes.iter().map(|o| o.memory_kb).max().unwrap_or(0);
        let stderr = outcomes
            .iter()
            .find(|o| !o.passed)
            .map(|o| {
                if o.error.is_empty() {
                    format!("Test case {} failed: {}", o.test_case, o.status)
                } else {
                    format!("Test case {} failed: {}", o.test_case, o.error)
                }
            })
            .unwrap_or_default();

        Self {
            passed,
            total,
            pass_rate,
            exec_time_ms,
            max_memory_kb,
            stderr,
            results: outcomes,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.total > 0 && self.passed == self.total
    }

    /// One-line summary, e.g. "2/3 tests passed (66.7%)".
    pub fn headline(&self) -> String {
        format!(
            "{}/{} tests passed ({:.1}%)",
            self.passed, self.total, self.pass_rate
        )
    }
}
