//! A line-oriented state machine that turns a normalized transcript into a
//! stream of [`Test`] records.

use std::path::{Path, PathBuf};

use crate::error::{TestError, TestResult};

/// The seven match modes, represented as a closed tagged variant rather
/// than a dynamically dispatched string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Output,
    Text,
    Eval,
    Lines,
    File,
    Regex,
    Perl,
}

/// The mode-dependent expected payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected {
    /// Used by `output` (multi-line, newline-terminated) and `text`
    /// (single line, newline appended at compare time).
    Text(String),
    /// A shell expression to be captured in a fresh subshell.
    Eval(String),
    /// A non-negative line count.
    Lines(u64),
    /// A path whose contents are the expected output.
    File(PathBuf),
    /// An extended regex (`regex` mode) or Perl-style dotall pattern
    /// (`perl` mode) -- which one applies is recorded by `mode`, not by
    /// this variant, since both share the same payload shape.
    Pattern(String),
}

/// One extracted test: a command to run and how to judge its output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Test {
    /// 1-based position in parser emission order -- the order Tests are
    /// *emitted* by the parser, not the order they execute.
    pub index: u64,
    /// The line in the input file where the command begins, for diagnostics.
    pub source_line: usize,
    /// The verbatim command text to be evaluated by the shell.
    pub command: String,
    pub mode: MatchMode,
    pub expected: Expected,
}

const DIRECTIVES: &[(&str, MatchMode)] = &[
    ("--regex ", MatchMode::Regex),
    ("--perl ", MatchMode::Perl),
    ("--file ", MatchMode::File),
    ("--lines ", MatchMode::Lines),
    ("--eval ", MatchMode::Eval),
    ("--text ", MatchMode::Text),
];

struct Pending {
    source_line: usize,
    command: String,
    buffer: String,
}

/// Parses a normalized (LF-only) transcript into its Test records.
///
/// `path` is only used to attach file/line context to fatal parse errors
/// (malformed `--lines`, empty inline payloads).
pub fn parse(text: &str, prefix: &str, prompt: &str, inline_prefix: &str, path: &Path) -> TestResult<Vec<Test>> {
    let base = format!("{prefix}{prompt}");
    let bare_trimmed = base.trim_end_matches(' ').to_string();
    let bare_extra = format!("{base} ");

    let mut tests = Vec::new();
    let mut pending: Option<Pending> = None;
    let mut next_index: u64 = 1;

    for (line_no, line) in text.lines().enumerate() {
        let line_no = line_no + 1;

        let is_bare_prompt = line == base || line == bare_trimmed || line == bare_extra;
        if is_bare_prompt {
            finalize(&mut pending, &mut tests, &mut next_index);
            continue;
        }

        if line.starts_with(&base) && line.len() > base.len() {
            finalize(&mut pending, &mut tests, &mut next_index);
            let command_raw = &line[base.len()..];

            match command_raw.rfind(inline_prefix) {
                Some(split_at) => {
                    let command = command_raw[..split_at].to_string();
                    let payload = &command_raw[split_at + inline_prefix.len()..];
                    let (mode, expected) = decode_inline_payload(payload, path, line_no)?;
                    tests.push(Test { index: next_index, source_line: line_no, command, mode, expected });
                    next_index += 1;
                }
                None => {
                    pending = Some(Pending { source_line: line_no, command: command_raw.to_string(), buffer: String::new() });
                }
            }
            continue;
        }

        if let Some(p) = pending.as_mut() {
            if !prefix.is_empty() && !line.starts_with(prefix) {
                finalize(&mut pending, &mut tests, &mut next_index);
                continue;
            }
            let remainder = if prefix.is_empty() { line } else { &line[prefix.len()..] };
            p.buffer.push_str(remainder);
            p.buffer.push('\n');
        }
        // else: no pending test, ignore the line.
    }

    finalize(&mut pending, &mut tests, &mut next_index);
    Ok(tests)
}

fn finalize(pending: &mut Option<Pending>, tests: &mut Vec<Test>, next_index: &mut u64) {
    if let Some(p) = pending.take() {
        tests.push(Test {
            index: *next_index,
            source_line: p.source_line,
            command: p.command,
            mode: MatchMode::Output,
            expected: Expected::Text(p.buffer),
        });
        *next_index += 1;
    }
}

fn decode_inline_payload(payload: &str, path: &Path, line_no: usize) -> TestResult<(MatchMode, Expected)> {
    for (directive, mode) in DIRECTIVES {
        if let Some(remainder) = payload.strip_prefix(directive) {
            if *mode != MatchMode::Text && remainder.is_empty() {
                let name = directive.trim().trim_start_matches("--");
                return Err(TestError::EmptyInlinePayload(path.to_path_buf(), line_no, leak_mode_name(name)));
            }

            let expected = match mode {
                MatchMode::Lines => {
                    let n: u64 = remainder
                        .parse()
                        .map_err(|_| TestError::InvalidLineCount(path.to_path_buf(), line_no, remainder.to_string()))?;
                    Expected::Lines(n)
                }
                MatchMode::File => Expected::File(PathBuf::from(remainder)),
                MatchMode::Eval => Expected::Eval(remainder.to_string()),
                MatchMode::Regex | MatchMode::Perl => Expected::Pattern(remainder.to_string()),
                MatchMode::Text => Expected::Text(remainder.to_string()),
                MatchMode::Output => unreachable!("output is never an inline directive"),
            };
            return Ok((*mode, expected));
        }
    }

    // No directive prefix: the whole payload is a plain `text` comparison.
    Ok((MatchMode::Text, Expected::Text(payload.to_string())))
}

/// The mode names used in `EmptyInlinePayload` are a small fixed set, so we
/// can hand out `'static` names without allocating.
fn leak_mode_name(name: &str) -> &'static str {
    match name {
        "regex" => "regex",
        "perl" => "perl",
        "file" => "file",
        "lines" => "lines",
        "eval" => "eval",
        _ => "text",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn parse_default(text: &str) -> Vec<Test> {
        parse(text, "", "$ ", "#\u{2192} ", Path::new("t.txt")).unwrap()
    }

    #[test]
    fn output_mode_accumulates_following_lines() {
        let tests = parse_default("$ echo hello\nhello\n");
        assert_eq!(tests.len(), 1);
        assert_eq!(tests[0].command, "echo hello");
        assert_eq!(tests[0].mode, MatchMode::Output);
        assert_eq!(tests[0].expected, Expected::Text("hello\n".to_string()));
    }

    #[test]
    fn bare_prompt_closes_pending_test() {
        let tests = parse_default("$ echo hello\nhello\n$ \n");
        assert_eq!(tests.len(), 1);
    }

    #[test]
    fn command_with_no_output_before_next_command_is_empty() {
        let tests = parse_default("$ X=5\n$ echo $X\n5\n");
        assert_eq!(tests.len(), 2);
        assert_eq!(tests[0].expected, Expected::Text(String::new()));
    }

    #[test]
    fn inline_text_mode() {
        let tests = parse_default("$ echo hello #\u{2192} hello\n");
        assert_eq!(tests.len(), 1);
        assert_eq!(tests[0].mode, MatchMode::Text);
        assert_eq!(tests[0].expected, Expected::Text("hello".to_string()));
    }

    #[test]
    fn inline_lines_mode() {
        let tests = parse_default("$ printf 'a\\nb\\nc\\n' #\u{2192} --lines 3\n");
        assert_eq!(tests[0].mode, MatchMode::Lines);
        assert_eq!(tests[0].expected, Expected::Lines(3));
    }

    #[test]
    fn inline_lines_mode_rejects_non_numeric() {
        let err = parse("$ true #\u{2192} --lines abc\n", "", "$ ", "#\u{2192} ", Path::new("t.txt")).unwrap_err();
        assert!(matches!(err, TestError::InvalidLineCount(..)));
    }

    #[test]
    fn inline_marker_splits_on_rightmost_occurrence() {
        // The payload itself contains the marker sequence.
        let text = "$ echo '#\u{2192} x' #\u{2192} y\n";
        let tests = parse_default(text);
        assert_eq!(tests[0].command, "echo '#\u{2192} x' ");
        assert_eq!(tests[0].expected, Expected::Text("y".to_string()));
    }

    #[test]
    fn empty_inline_payload_for_non_text_mode_is_fatal() {
        let err = parse("$ true #\u{2192} --regex \n", "", "$ ", "#\u{2192} ", Path::new("t.txt")).unwrap_err();
        assert!(matches!(err, TestError::EmptyInlinePayload(..)));
    }

    #[test]
    fn prefix_ends_output_block_when_line_lacks_prefix() {
        let tests = parse("// $ echo hi\n// hi\nnot prefixed\n", "// ", "$ ", "#\u{2192} ", Path::new("t.txt")).unwrap();
        assert_eq!(tests.len(), 1);
        assert_eq!(tests[0].expected, Expected::Text("hi\n".to_string()));
    }

    #[test]
    fn trailing_blank_lines_outside_a_test_block_do_not_change_emission() {
        let a = parse_default("$ echo hi\nhi\n$ \n");
        let b = parse_default("$ echo hi\nhi\n$ \n\n\n");
        assert_eq!(a, b);
    }

    #[test]
    fn indices_are_assigned_in_emission_order() {
        let tests = parse_default("$ true\n$ true\n$ true\n");
        assert_eq!(tests.iter().map(|t| t.index).collect::<Vec<_>>(), vec![1, 2, 3]);
    }
}
