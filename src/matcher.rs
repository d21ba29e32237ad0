//! A pure dispatch over the seven modes:
//! `(mode, expected, captured) -> verdict x diff`.

use std::path::Path;

use regex::Regex;

use crate::diff_printer::{lines_equal, render_diff, DiffOptions};
use crate::error::{TestError, TestResult};
use crate::parser::{Expected, MatchMode, Test};

/// The verdict produced for one executed test.
pub enum Verdict {
    Pass,
    /// Carries the human-readable diff fragment shown to the user.
    Fail(String),
}

/// Evaluates an `eval`-mode expected payload in a fresh, one-shot
/// subshell -- never the persistent session. Implemented by the Executor
/// and threaded in here so the Matcher stays a pure function over its
/// other inputs.
pub trait EvalRunner {
    fn eval(&mut self, command: &str) -> TestResult<Vec<u8>>;
}

/// Compares a test's captured output against its expected payload and
/// produces a verdict. `captured` is the combined stdout+stderr already
/// collected by the Executor. `transcript_path` is only used to attach
/// file context to a fatal `MissingMatchFile` error.
pub fn check(
    test: &Test,
    captured: &[u8],
    eval: &mut dyn EvalRunner,
    diff_opts: &DiffOptions,
    transcript_path: &Path,
) -> TestResult<Verdict> {
    let actual = String::from_utf8_lossy(captured);

    match (test.mode, &test.expected) {
        (MatchMode::Output, Expected::Text(expected)) | (MatchMode::Text, Expected::Text(expected)) => {
            let expected_text = if test.mode == MatchMode::Text {
                format!("{expected}\n")
            } else {
                expected.clone()
            };
            Ok(diff_verdict(&expected_text, &actual, diff_opts))
        }

        (MatchMode::Eval, Expected::Eval(command)) => {
            let expected_bytes = eval.eval(command)?;
            let expected_text = String::from_utf8_lossy(&expected_bytes).into_owned();
            Ok(diff_verdict(&expected_text, &actual, diff_opts))
        }

        (MatchMode::Lines, Expected::Lines(expected_count)) => {
            let actual_count = count_lines(&actual);
            if actual_count == *expected_count {
                Ok(Verdict::Pass)
            } else {
                Ok(Verdict::Fail(format!("Expected {expected_count} lines, got {actual_count}.")))
            }
        }

        (MatchMode::File, Expected::File(path)) => {
            let expected_text = std::fs::read_to_string(path)
                .map_err(|_| TestError::MissingMatchFile(transcript_path.to_path_buf(), test.source_line, path.clone()))?;
            Ok(diff_verdict(&expected_text, &actual, diff_opts))
        }

        (MatchMode::Regex, Expected::Pattern(pattern)) => {
            let re = Regex::new(pattern).map_err(|err| TestError::MalformedRegex(pattern.clone(), err))?;
            if actual.lines().any(|line| re.is_match(line)) {
                Ok(Verdict::Pass)
            } else {
                Ok(Verdict::Fail(format!("No line matched regex `{pattern}`.\n--- captured ---\n{actual}")))
            }
        }

        (MatchMode::Perl, Expected::Pattern(pattern)) => {
            let dotall_pattern = format!("(?s){pattern}");
            let re = Regex::new(&dotall_pattern).map_err(|err| TestError::MalformedRegex(pattern.clone(), err))?;
            if re.is_match(&actual) {
                Ok(Verdict::Pass)
            } else {
                Ok(Verdict::Fail(format!("Captured output did not match perl-style pattern `{pattern}`.\n--- captured ---\n{actual}")))
            }
        }

        _ => unreachable!("Test::mode and Test::expected are always constructed together by the parser"),
    }
}

fn diff_verdict(expected: &str, actual: &str, diff_opts: &DiffOptions) -> Verdict {
    if lines_equal(expected, actual, diff_opts) {
        Verdict::Pass
    } else {
        Verdict::Fail(render_diff(expected, actual, diff_opts))
    }
}

/// Counts newline-terminated lines; a trailing partial line with no `\n`
/// is not counted, so both empty output and output with zero `\n`
/// characters count as 0, and `--lines 0` matches either.
fn count_lines(s: &str) -> u64 {
    s.matches('\n').count() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    struct NoEval;
    impl EvalRunner for NoEval {
        fn eval(&mut self, _command: &str) -> TestResult<Vec<u8>> {
            Ok(Vec::new())
        }
    }

    fn lines_test(count: u64) -> Test {
        Test { index: 1, source_line: 1, command: "printf".into(), mode: MatchMode::Lines, expected: Expected::Lines(count) }
    }

    #[test]
    fn lines_mode_counts_newline_terminated_lines() {
        let test = lines_test(3);
        let verdict = check(&test, b"a\nb\nc\n", &mut NoEval, &DiffOptions::default(), Path::new("t.txt")).unwrap();
        assert!(matches!(verdict, Verdict::Pass));
    }

    #[test]
    fn lines_zero_matches_empty_output() {
        let test = lines_test(0);
        let verdict = check(&test, b"", &mut NoEval, &DiffOptions::default(), Path::new("t.txt")).unwrap();
        assert!(matches!(verdict, Verdict::Pass));
    }

    #[test]
    fn lines_zero_also_matches_output_with_no_trailing_newline() {
        let test = lines_test(0);
        let verdict = check(&test, b"abc", &mut NoEval, &DiffOptions::default(), Path::new("t.txt")).unwrap();
        assert!(matches!(verdict, Verdict::Pass));
    }

    #[test]
    fn trailing_partial_line_without_a_newline_is_not_counted() {
        let test = lines_test(2);
        let verdict = check(&test, b"a\nb\nc", &mut NoEval, &DiffOptions::default(), Path::new("t.txt")).unwrap();
        assert!(matches!(verdict, Verdict::Pass));
    }

    #[test]
    fn output_mode_empty_expected_matches_empty_actual() {
        let test = Test { index: 1, source_line: 1, command: "true".into(), mode: MatchMode::Output, expected: Expected::Text(String::new()) };
        let verdict = check(&test, b"", &mut NoEval, &DiffOptions::default(), Path::new("t.txt")).unwrap();
        assert!(matches!(verdict, Verdict::Pass));
    }

    #[test]
    fn text_mode_appends_newline_before_comparing() {
        let test = Test { index: 1, source_line: 1, command: "echo hi".into(), mode: MatchMode::Text, expected: Expected::Text("hi".into()) };
        let verdict = check(&test, b"hi\n", &mut NoEval, &DiffOptions::default(), Path::new("t.txt")).unwrap();
        assert!(matches!(verdict, Verdict::Pass));
    }

    #[test]
    fn regex_mode_matches_any_line() {
        let test = Test { index: 1, source_line: 1, command: "echo".into(), mode: MatchMode::Regex, expected: Expected::Pattern("^h.llo$".into()) };
        let verdict = check(&test, b"nope\nhello\n", &mut NoEval, &DiffOptions::default(), Path::new("t.txt")).unwrap();
        assert!(matches!(verdict, Verdict::Pass));
    }

    #[test]
    fn malformed_regex_is_fatal() {
        let test = Test { index: 1, source_line: 1, command: "echo".into(), mode: MatchMode::Regex, expected: Expected::Pattern("(".into()) };
        let err = check(&test, b"", &mut NoEval, &DiffOptions::default(), Path::new("t.txt")).unwrap_err();
        assert!(matches!(err, TestError::MalformedRegex(..)));
    }

    #[test]
    fn perl_mode_spans_newlines_with_dotall() {
        let test = Test { index: 1, source_line: 1, command: "echo".into(), mode: MatchMode::Perl, expected: Expected::Pattern("a.b".into()) };
        let verdict = check(&test, b"a\nb\n", &mut NoEval, &DiffOptions::default(), Path::new("t.txt")).unwrap();
        assert!(matches!(verdict, Verdict::Pass));
    }

    #[test]
    fn missing_match_file_is_fatal() {
        let test = Test { index: 1, source_line: 1, command: "echo".into(), mode: MatchMode::File, expected: Expected::File(PathBuf::from("/no/such/file")) };
        let err = check(&test, b"", &mut NoEval, &DiffOptions::default(), Path::new("t.txt")).unwrap_err();
        assert!(matches!(err, TestError::MissingMatchFile(..)));
    }
}
