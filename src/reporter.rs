//! Formats per-test failure diffs and per-file/global tallies.

use std::io::IsTerminal;
use std::path::Path;

use colored::Colorize;

use crate::config::ColorMode;

/// Per-file or aggregate run counters.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunCounters {
    pub seen: u64,
    pub failed: u64,
    pub skipped: u64,
}

impl RunCounters {
    pub fn ok(&self) -> u64 {
        self.seen - self.failed - self.skipped
    }
}

pub struct Reporter {
    multi_file: bool,
    last_was_failure: bool,
}

impl Reporter {
    pub fn new(color: ColorMode, multi_file: bool) -> Self {
        let enable = match color {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => std::io::stdout().is_terminal(),
        };
        colored::control::set_override(enable);
        Reporter { multi_file, last_was_failure: false }
    }

    pub fn file_banner(&self, path: &Path) {
        if self.multi_file {
            println!("{}", format!("Testing file {}", path.display()).bold());
        }
    }

    fn separator(&self) {
        let width = terminal_width();
        println!("{}", "-".repeat(width));
    }

    /// Renders one failing test: a colored separator, a
    /// `[FAILED #N, line L] <command>` header, the diff fragment, and a
    /// trailing separator. Consecutive failures don't duplicate the
    /// shared separator between them.
    pub fn report_failure(&mut self, index: u64, source_line: usize, command: &str, diff: &str) {
        if !self.last_was_failure {
            self.separator();
        }
        println!("{}", format!("[FAILED #{index}, line {source_line}] {command}").red().bold());
        print!("{diff}");
        self.separator();
        self.last_was_failure = true;
    }

    pub fn report_pass(&mut self) {
        self.last_was_failure = false;
    }

    /// `--list-run`: print a test's command with its OK/FAIL status
    /// instead of a diff.
    pub fn report_list_run(&self, index: u64, command: &str, passed: bool) {
        let status = if passed { "OK".green() } else { "FAIL".red() };
        println!("[{status}] #{index} {command}");
    }

    /// `--list`: print a test's command without executing it.
    pub fn report_list(&self, index: u64, command: &str) {
        println!("#{index} {command}");
    }

    /// The final, one-line summary: `OK: X of N tests passed (S
    /// skipped)` or `FAIL: F of N tests failed (S skipped)`.
    pub fn summary_line(&self, counters: &RunCounters) {
        if counters.failed == 0 {
            println!(
                "{}",
                format!("OK: {} of {} tests passed ({} skipped)", counters.ok(), counters.seen, counters.skipped).green()
            );
        } else {
            println!(
                "{}",
                format!("FAIL: {} of {} tests failed ({} skipped)", counters.failed, counters.seen, counters.skipped).red()
            );
        }
    }

    /// The multi-file OK/FAIL/SKIP table, printed after all files have
    /// been processed when more than one file is given.
    pub fn file_table(&self, rows: &[(std::path::PathBuf, RunCounters)]) {
        if !self.multi_file {
            return;
        }
        println!("{}", "File                                     OK   FAIL  SKIP".bold());
        for (path, counters) in rows {
            println!("{:<40} {:>4} {:>6} {:>6}", path.display().to_string(), counters.ok(), counters.failed, counters.skipped);
        }
    }
}

/// Width used for separator lines: `COLUMNS` env var, else a terminal
/// query, else 50.
fn terminal_width() -> usize {
    if let Ok(columns) = std::env::var("COLUMNS") {
        if let Ok(width) = columns.trim().parse::<usize>() {
            return width;
        }
    }
    if let Some((w, _)) = term_size() {
        return w;
    }
    50
}

#[cfg(unix)]
fn term_size() -> Option<(usize, usize)> {
    // No portable, dependency-free terminal size query in std; callers
    // fall back to `COLUMNS`/50 when this returns `None`, which in
    // practice covers every non-interactive CI invocation.
    None
}

#[cfg(not(unix))]
fn term_size() -> Option<(usize, usize)> {
    None
}
