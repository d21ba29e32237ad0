//! Renders a line-oriented diff the way the Reporter shows it to users: a
//! unified-style diff with the `---`/`+++` headers suppressed, only hunk
//! bodies shown.

use colored::Colorize;
use similar::{ChangeTag, TextDiff};

/// Behavior derived from `--diff-options`, forwarded to the diff engine.
/// The core diff engine here is `similar::TextDiff`, not an external
/// `diff(1)` binary, so only the subset of its classic flags that makes
/// sense against an in-process line diff is honored; anything else in the
/// string is ignored rather than rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffOptions {
    pub ignore_whitespace: bool,
    pub ignore_blank_lines: bool,
}

/// Parses a `--diff-options`/`shelltest.toml` `diff_options` string into the
/// flags this implementation understands.
pub fn parse_diff_options(raw: Option<&str>) -> DiffOptions {
    let mut opts = DiffOptions::default();
    let Some(raw) = raw else { return opts };
    for token in raw.split_whitespace() {
        match token {
            "-w" | "--ignore-all-space" | "--ignore-space-change" => opts.ignore_whitespace = true,
            "-B" | "--ignore-blank-lines" => opts.ignore_blank_lines = true,
            _ => {}
        }
    }
    opts
}

fn normalize(text: &str, opts: &DiffOptions) -> String {
    if !opts.ignore_whitespace && !opts.ignore_blank_lines {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        let (body, had_newline) = match line.strip_suffix('\n') {
            Some(body) => (body, true),
            None => (line, false),
        };
        if opts.ignore_blank_lines && body.trim().is_empty() {
            continue;
        }
        if opts.ignore_whitespace {
            out.push_str(&body.split_whitespace().collect::<Vec<_>>().join(" "));
        } else {
            out.push_str(body);
        }
        if had_newline {
            out.push('\n');
        }
    }
    out
}

/// Produces the colored, line-numbered diff fragment for a failing
/// `output`/`text`/`eval`/`file` match. Equal lines are shown unmarked
/// with both line numbers; removed (expected-only) lines are red with
/// only the old line number; added (actual-only) lines are green with
/// only the new line number.
pub fn render_diff(expected: &str, actual: &str, opts: &DiffOptions) -> String {
    let expected = normalize(expected, opts);
    let actual = normalize(actual, opts);
    let diff = TextDiff::from_lines(expected.as_str(), actual.as_str());
    let mut out = String::new();
    let mut old_line = 1usize;
    let mut new_line = 1usize;

    for change in diff.iter_all_changes() {
        let value = change.value();
        match change.tag() {
            ChangeTag::Equal => {
                out.push_str(&format!("{old_line:4} {new_line:4} | {value}"));
                old_line += 1;
                new_line += 1;
            }
            ChangeTag::Delete => {
                out.push_str(&format!("{old_line:4}      | {}", value.red()));
                old_line += 1;
            }
            ChangeTag::Insert => {
                out.push_str(&format!("     {new_line:4} | {}", value.green()));
                new_line += 1;
            }
        }
        if !value.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

/// `true` if `expected` and `actual` are identical as a sequence of lines
/// (used by the `output`/`text`/`eval`/`file` matchers to decide pass/fail
/// before paying for a rendered diff).
pub fn lines_equal(expected: &str, actual: &str, opts: &DiffOptions) -> bool {
    let expected = normalize(expected, opts);
    let actual = normalize(actual, opts);
    TextDiff::from_lines(expected.as_str(), actual.as_str()).ratio() == 1.0
}
