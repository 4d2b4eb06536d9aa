//! xUnit report builder: an append-only ledger of test-case outcomes.

mod serialize;

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write xUnit XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("xUnit XML is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Outcome of a single recorded operation.
///
/// Only `Failure` and `Error` carry a message and details. They serialize
/// identically and differ only in which suite counter they bump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Failure { message: String, details: String },
    Error { message: String, details: String },
    Skip,
}

/// One recorded test case. Immutable once appended to a report.
#[derive(Debug, Clone, PartialEq)]
pub struct TestCase {
    classname: String,
    name: String,
    outcome: Outcome,
    time: Duration,
}

impl TestCase {
    pub fn classname(&self) -> &str {
        &self.classname
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub fn time(&self) -> Duration {
        self.time
    }
}

/// Accumulates test cases for a single suite and serializes them as xUnit XML.
///
/// `total` always equals `passed + failures + errors + skipped`, and test
/// cases serialize in the order they were recorded.
#[derive(Debug, Clone)]
pub struct XunitReport {
    name: String,
    total: usize,
    errors: usize,
    failures: usize,
    skipped: usize,
    testcases: Vec<TestCase>,
}

impl XunitReport {
    /// Create an empty report for the suite `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            total: 0,
            errors: 0,
            failures: 0,
            skipped: 0,
            testcases: Vec::new(),
        }
    }

    /// Record a passing operation.
    pub fn ok(&mut self, classname: &str, name: &str, time: impl Into<Duration>) {
        self.push(classname, name, Outcome::Ok, time.into());
    }

    /// Record an expected operational fault.
    pub fn failure(
        &mut self,
        classname: &str,
        name: &str,
        message: &str,
        details: &str,
        time: impl Into<Duration>,
    ) {
        self.failures += 1;
        let outcome = Outcome::Failure {
            message: message.to_string(),
            details: details.to_string(),
        };
        self.push(classname, name, outcome, time.into());
    }

    /// Record a fault that is classified apart from ordinary failures.
    pub fn error(
        &mut self,
        classname: &str,
        name: &str,
        message: &str,
        details: &str,
        time: impl Into<Duration>,
    ) {
        self.errors += 1;
        let outcome = Outcome::Error {
            message: message.to_string(),
            details: details.to_string(),
        };
        self.push(classname, name, outcome, time.into());
    }

    /// Record an operation that was deliberately not attempted.
    pub fn skip(&mut self, classname: &str, name: &str, time: impl Into<Duration>) {
        self.skipped += 1;
        self.push(classname, name, Outcome::Skip, time.into());
    }

    fn push(&mut self, classname: &str, name: &str, outcome: Outcome, time: Duration) {
        self.total += 1;
        self.testcases.push(TestCase {
            classname: classname.to_string(),
            name: name.to_string(),
            outcome,
            time,
        });
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn errors(&self) -> usize {
        self.errors
    }

    pub fn failures(&self) -> usize {
        self.failures
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn passed(&self) -> usize {
        self.total - self.errors - self.failures - self.skipped
    }

    pub fn testcases(&self) -> &[TestCase] {
        &self.testcases
    }

    /// Serialize the suite to an xUnit XML document.
    pub fn serialize(&self) -> Result<String, ReportError> {
        let mut buf: Vec<u8> = Vec::new();
        serialize::write_report(self, &mut buf)?;
        Ok(String::from_utf8(buf)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_track_every_outcome() {
        let mut report = XunitReport::new("suite");
        report.ok("svc", "a", Duration::ZERO);
        report.failure("svc", "b", "bad", "", Duration::from_millis(5));
        report.error("svc", "c", "worse", "trace", Duration::ZERO);
        report.skip("svc", "d", Duration::ZERO);
        report.ok("svc", "e", Duration::from_secs(1));

        assert_eq!(report.total(), 5);
        assert_eq!(report.failures(), 1);
        assert_eq!(report.errors(), 1);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.passed(), 2);
        assert_eq!(
            report.total(),
            report.passed() + report.failures() + report.errors() + report.skipped()
        );
    }

    proptest::proptest! {
        #[test]
        fn counters_partition_any_sequence(kinds in proptest::collection::vec(0u8..4, 0..200)) {
            let mut report = XunitReport::new("suite");
            for (i, kind) in kinds.iter().enumerate() {
                let name = format!("case{}", i);
                match kind {
                    0 => report.ok("svc", &name, Duration::ZERO),
                    1 => report.failure("svc", &name, "bad", "", Duration::ZERO),
                    2 => report.error("svc", &name, "worse", "", Duration::ZERO),
                    _ => report.skip("svc", &name, Duration::ZERO),
                }
            }

            let count = |k: u8| kinds.iter().filter(|&&x| x == k).count();
            proptest::prop_assert_eq!(report.total(), kinds.len());
            proptest::prop_assert_eq!(
                report.passed() + report.failures() + report.errors() + report.skipped(),
                kinds.len()
            );
            proptest::prop_assert_eq!(report.passed(), count(0));
            proptest::prop_assert_eq!(report.failures(), count(1));
            proptest::prop_assert_eq!(report.errors(), count(2));
            proptest::prop_assert_eq!(report.skipped(), count(3));
        }
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut report = XunitReport::new("suite");
        for name in ["z", "a", "m"] {
            report.ok("svc", name, Duration::ZERO);
        }
        let names: Vec<&str> = report.testcases().iter().map(|t| t.name()).collect();
        assert_eq!(names, ["z", "a", "m"]);
    }

    #[test]
    fn test_error_fields_only_on_faults() {
        let mut report = XunitReport::new("suite");
        report.failure("svc", "f", "msg", "details", Duration::ZERO);
        report.skip("svc", "s", Duration::ZERO);

        assert_eq!(
            report.testcases()[0].outcome(),
            &Outcome::Failure {
                message: "msg".to_string(),
                details: "details".to_string()
            }
        );
        assert_eq!(report.testcases()[1].outcome(), &Outcome::Skip);
        assert_eq!(report.testcases()[1].time(), Duration::ZERO);
    }

    #[test]
    fn test_accepts_empty_strings() {
        let mut report = XunitReport::new("");
        report.ok("", "", Duration::ZERO);
        report.error("", "", "", "", Duration::ZERO);
        assert_eq!(report.total(), 2);
        assert_eq!(report.testcases()[0].classname(), "");
    }
}
