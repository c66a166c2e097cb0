//! Exact comparison of captured against expected outcomes.

use std::fmt;

use thiserror::Error;

use crate::outcome::{CapturedOutcome, ExpectedOutcome};

/// Field of an outcome that can diverge.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OutcomeField {
    /// Process exit code.
    ExitCode,
    /// Standard output bytes.
    Stdout,
    /// Standard error bytes.
    Stderr,
}

impl fmt::Display for OutcomeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ExitCode => "exit code",
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        })
    }
}

/// One diverging field with rendered expected and actual values.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldMismatch {
    /// Field that diverged.
    pub field: OutcomeField,
    /// Rendered expected value.
    pub expected: String,
    /// Rendered actual value.
    pub actual: String,
}

impl fmt::Display for FieldMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unexpected {}: expected {}, got {}",
            self.field, self.expected, self.actual
        )
    }
}

/// Every field that diverged, reported together.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("{}", render(.mismatches))]
pub struct MismatchError {
    /// Diverging fields in exit code, stdout, stderr order.
    pub mismatches: Vec<FieldMismatch>,
}

impl MismatchError {
    /// Whether `field` is among the mismatches.
    #[must_use]
    pub fn names(&self, field: OutcomeField) -> bool {
        self.mismatches.iter().any(|mismatch| mismatch.field == field)
    }
}

fn render(mismatches: &[FieldMismatch]) -> String {
    mismatches
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Compares exit code, stdout and stderr for exact equality.
///
/// All three fields are evaluated before returning, so a single error lists
/// every divergence.
///
/// # Errors
///
/// Returns [`MismatchError`] when any field differs.
pub fn compare(expected: &ExpectedOutcome, actual: &CapturedOutcome) -> Result<(), MismatchError> {
    let mut mismatches = Vec::new();

    if expected.exit_code() != actual.exit_code() {
        mismatches.push(FieldMismatch {
            field: OutcomeField::ExitCode,
            expected: expected.exit_code().to_string(),
            actual: actual.exit_code().to_string(),
        });
    }
    if expected.stdout() != actual.stdout() {
        mismatches.push(FieldMismatch {
            field: OutcomeField::Stdout,
            expected: quote_bytes(expected.stdout()),
            actual: quote_bytes(actual.stdout()),
        });
    }
    if expected.stderr() != actual.stderr() {
        mismatches.push(FieldMismatch {
            field: OutcomeField::Stderr,
            expected: quote_bytes(expected.stderr()),
            actual: quote_bytes(actual.stderr()),
        });
    }

    if mismatches.is_empty() {
        Ok(())
    } else {
        Err(MismatchError { mismatches })
    }
}

/// Renders bytes as a single-quoted string with control characters escaped.
fn quote_bytes(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    format!("'{}'", text.escape_debug())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn hello() -> ExpectedOutcome {
        ExpectedOutcome::success_with_stdout("Hello!")
    }

    #[test]
    fn identical_outcomes_pass() {
        let actual = CapturedOutcome::from_finished(0, b"Hello!".to_vec(), Vec::new());

        assert!(compare(&hello(), &actual).is_ok());
    }

    #[test]
    fn exit_code_mismatch_names_field_and_values() {
        let actual = CapturedOutcome::from_finished(1, b"Hello!".to_vec(), Vec::new());

        let err = compare(&hello(), &actual).expect_err("exit code differs");

        assert_eq!(
            err.mismatches,
            vec![FieldMismatch {
                field: OutcomeField::ExitCode,
                expected: String::from("0"),
                actual: String::from("1"),
            }]
        );
        assert_eq!(err.to_string(), "unexpected exit code: expected 0, got 1");
    }

    #[test]
    fn all_mismatches_are_reported_together() {
        let actual = CapturedOutcome::from_finished(2, b"Bye".to_vec(), b"oops\n".to_vec());

        let err = compare(&hello(), &actual).expect_err("every field differs");

        assert!(err.names(OutcomeField::ExitCode));
        assert!(err.names(OutcomeField::Stdout));
        assert!(err.names(OutcomeField::Stderr));
        assert_eq!(
            err.to_string(),
            "unexpected exit code: expected 0, got 2; \
             unexpected stdout: expected 'Hello!', got 'Bye'; \
             unexpected stderr: expected '', got 'oops\\n'"
        );
    }

    #[rstest]
    #[case::trailing_newline(&b"Hello!\n"[..])]
    #[case::leading_space(&b" Hello!"[..])]
    #[case::carriage_return(&b"Hello!\r"[..])]
    fn comparison_is_byte_exact(#[case] stdout: &[u8]) {
        let actual = CapturedOutcome::from_finished(0, stdout.to_vec(), Vec::new());

        let err = compare(&hello(), &actual).expect_err("no normalisation");

        assert!(err.names(OutcomeField::Stdout));
        assert!(!err.names(OutcomeField::ExitCode));
    }
}
