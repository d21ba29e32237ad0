//! End-to-end scenarios: each writes a literal transcript to a temp file
//! and drives the real `Driver` over it, one scenario per file, so the
//! pass/fail/skip shape of the run can be asserted on directly instead of
//! only via the aggregate exit status.

use std::path::PathBuf;

use shelltest::config::RunConfig;
use shelltest::driver::Driver;
use shelltest::error::TestError;
use shelltest::range;

fn transcript(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn run(files: Vec<PathBuf>) -> Result<(), TestError> {
    let config = RunConfig { files, quiet: true, ..RunConfig::default() };
    Driver::new(config).run()
}

#[test]
fn echo_hello_with_following_output_passes() {
    let dir = tempfile::tempdir().unwrap();
    let file = transcript(&dir, "a.txt", "$ echo hello\nhello\n");
    assert!(run(vec![file]).is_ok());
}

#[test]
fn inline_text_mode_passes() {
    let dir = tempfile::tempdir().unwrap();
    let file = transcript(&dir, "a.txt", "$ echo hello #\u{2192} hello\n");
    assert!(run(vec![file]).is_ok());
}

#[test]
fn inline_lines_mode_passes() {
    let dir = tempfile::tempdir().unwrap();
    let file = transcript(&dir, "a.txt", "$ printf 'a\\nb\\nc\\n' #\u{2192} --lines 3\n");
    assert!(run(vec![file]).is_ok());
}

#[test]
fn shell_state_persists_across_tests_in_one_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = transcript(&dir, "a.txt", "$ X=5\n$ echo $X\n5\n");
    assert!(run(vec![file]).is_ok());
}

#[test]
fn mismatched_output_fails_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let file = transcript(&dir, "a.txt", "$ echo hi\nbye\n");
    let err = run(vec![file]).unwrap_err();
    assert!(matches!(err, TestError::TestsFailed { failed: 1, total: 1 }));
}

#[test]
fn range_selection_skip_wins_over_include() {
    let dir = tempfile::tempdir().unwrap();
    let file = transcript(&dir, "a.txt", "$ true\n$ true\n$ true\n$ true\n");
    let config = RunConfig {
        files: vec![file],
        quiet: true,
        run_range: range::parse("2-3").unwrap(),
        skip_range: range::parse("3").unwrap(),
        ..RunConfig::default()
    };
    // Index 2 is run and passes; 1, 3, 4 are skipped -- 3 is skipped
    // because skip wins over the matching run range.
    assert!(Driver::new(config).run().is_ok());
}

#[test]
fn crlf_input_produces_the_same_verdict_as_lf() {
    let dir = tempfile::tempdir().unwrap();
    let file = transcript(&dir, "a.txt", "$ echo hello\r\nhello\r\n");
    assert!(run(vec![file]).is_ok());
}

#[test]
fn command_line_with_no_output_before_next_command_is_empty_output() {
    let dir = tempfile::tempdir().unwrap();
    let file = transcript(&dir, "a.txt", "$ true\n$ true\n");
    assert!(run(vec![file]).is_ok());
}

#[test]
fn custom_prefix_and_prompt_are_honored() {
    let dir = tempfile::tempdir().unwrap();
    let file = transcript(&dir, "a.txt", "// > echo hi\n// hi\n");
    let config = RunConfig { files: vec![file], quiet: true, prefix: "// ".into(), prompt: "> ".into(), ..RunConfig::default() };
    assert!(Driver::new(config).run().is_ok());
}

#[test]
fn eval_mode_compares_against_a_fresh_subshell_capture() {
    let dir = tempfile::tempdir().unwrap();
    let file = transcript(&dir, "a.txt", "$ echo hi #\u{2192} --eval echo hi\n");
    assert!(run(vec![file]).is_ok());
}

#[test]
fn regex_mode_matches_any_captured_line() {
    let dir = tempfile::tempdir().unwrap();
    let file = transcript(&dir, "a.txt", "$ echo hello-world #\u{2192} --regex ^hello-.*$\n");
    assert!(run(vec![file]).is_ok());
}

#[test]
fn file_with_no_tests_and_no_range_filter_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let file = transcript(&dir, "a.txt", "not a transcript at all\n");
    let err = run(vec![file]).unwrap_err();
    assert!(matches!(err, TestError::NoTestFound(_)));
}

#[test]
fn an_active_range_matching_nothing_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let file = transcript(&dir, "a.txt", "$ true\n");
    let config = RunConfig { files: vec![file], quiet: true, run_range: range::parse("99").unwrap(), ..RunConfig::default() };
    let err = Driver::new(config).run().unwrap_err();
    assert!(matches!(err, TestError::EmptyRangeMatch { run: true, skip: false }));
}

#[test]
fn stop_on_first_fail_aborts_the_remaining_tests_in_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = transcript(&dir, "a.txt", "$ echo hi\nbye\n$ echo hi\nhi\n");
    let config = RunConfig { files: vec![file], quiet: true, stop_on_first_fail: true, ..RunConfig::default() };
    let err = Driver::new(config).run().unwrap_err();
    // Only the first (failing) test should have run before the abort.
    assert!(matches!(err, TestError::TestsFailed { failed: 1, total: 1 }));
}

#[test]
fn multiple_files_run_in_command_line_order_and_aggregate_counters() {
    let dir = tempfile::tempdir().unwrap();
    let a = transcript(&dir, "a.txt", "$ echo hello\nhello\n");
    let b = transcript(&dir, "b.txt", "$ echo world\nworld\n");
    assert!(run(vec![a, b]).is_ok());
}
