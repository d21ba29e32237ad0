//! The per-file loop tying the parser, range filter, executor, and matcher
//! together, then handing tallies to the Reporter.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::config::{ListMode, RunConfig};
use crate::diff_printer::{self, DiffOptions};
use crate::error::{TestError, TestResult};
use crate::executor::{Executor, OneShotEval};
use crate::lineend;
use crate::matcher::{self, Verdict};
use crate::parser::{self, Test};
use crate::reporter::{Reporter, RunCounters};
use crate::tempdir::ScratchDir;

pub struct Driver {
    config: RunConfig,
    reporter: Reporter,
    diff_opts: DiffOptions,
}

impl Driver {
    pub fn new(config: RunConfig) -> Self {
        let reporter = Reporter::new(config.color, config.files.len() > 1);
        let diff_opts = diff_printer::parse_diff_options(config.diff_options.as_deref());
        Driver { config, reporter, diff_opts }
    }

    /// Runs every file named in `config.files`, in order, and returns
    /// `Ok(())` if every executed test passed. Files execute in
    /// command-line order; tests within a file execute in parser
    /// emission order.
    #[instrument(skip(self), name = "run")]
    pub fn run(mut self) -> TestResult<()> {
        let original_cwd = std::env::current_dir().map_err(TestError::ShellIoFailed)?;
        let shell_path = shell_path();
        let scratch = ScratchDir::create().map_err(TestError::ShellIoFailed)?;

        if let Some(cmd) = self.config.pre_flight.clone() {
            info!(command = %cmd, "running pre-flight hook");
            if !run_hook_once(&shell_path, &cmd)? {
                return Err(TestError::PreFlightFailed(cmd));
            }
        }

        let mut aggregate = RunCounters::default();
        let mut file_rows = Vec::new();
        let mut stopped_early = false;

        let progress = file_progress_bar(&self.config);

        for path in self.config.files.clone() {
            std::env::set_current_dir(&original_cwd).map_err(TestError::ShellIoFailed)?;
            self.reporter.file_banner(&path);

            let counters = self.run_file(&path, &shell_path, scratch.path())?;
            aggregate.seen += counters.seen;
            aggregate.failed += counters.failed;
            aggregate.skipped += counters.skipped;
            file_rows.push((path, counters));

            if let Some(bar) = &progress {
                bar.inc(1);
            }

            if self.config.stop_on_first_fail && counters.failed > 0 {
                stopped_early = true;
                break;
            }
        }

        if let Some(bar) = progress {
            bar.finish_and_clear();
        }

        if !stopped_early {
            if let Some(cmd) = self.config.post_flight.clone() {
                info!(command = %cmd, "running post-flight hook");
                if !run_hook_once(&shell_path, &cmd).unwrap_or(false) {
                    warn!(command = %cmd, "post-flight hook failed; not treated as fatal");
                }
            }
        }

        self.reporter.file_table(&file_rows);
        self.reporter.summary_line(&aggregate);

        if aggregate.failed > 0 {
            Err(TestError::TestsFailed { failed: aggregate.failed as usize, total: aggregate.seen as usize })
        } else {
            Ok(())
        }
    }

    #[instrument(skip(self, shell_path, scratch_dir), fields(path = %path.display()))]
    fn run_file(&mut self, path: &Path, shell_path: &Path, scratch_dir: &Path) -> TestResult<RunCounters> {
        let raw = std::fs::read_to_string(path).map_err(|err| TestError::UnreadableFile(path.to_path_buf(), err))?;
        let normalized = lineend::normalize(&raw);
        let tests = parser::parse(&normalized, &self.config.prefix, &self.config.prompt, &self.config.inline_prefix, path)?;
        debug!(count = tests.len(), "parsed tests");

        let run_active = !self.config.run_range.is_empty();
        let skip_active = !self.config.skip_range.is_empty();

        if tests.is_empty() && !run_active && !skip_active {
            return Err(TestError::NoTestFound(path.to_path_buf()));
        }

        if (run_active || skip_active) && !tests.iter().any(|t| self.selected(t.index)) {
            return Err(TestError::EmptyRangeMatch { run: run_active, skip: skip_active });
        }

        let mut counters = RunCounters::default();
        let mut executor = match self.config.list_mode {
            ListMode::List => None,
            _ => Some(Executor::spawn(shell_path, scratch_dir)?),
        };
        let mut eval_runner = OneShotEval { shell_path: shell_path.to_path_buf() };

        for test in &tests {
            counters.seen += 1;

            if !self.selected(test.index) {
                counters.skipped += 1;
                continue;
            }

            if self.config.list_mode == ListMode::List {
                self.reporter.report_list(test.index, &test.command);
                continue;
            }

            if self.run_one(test, executor.as_mut().unwrap(), &mut eval_runner, &mut counters, path)? {
                break; // stop-on-first-fail
            }
        }

        Ok(counters)
    }

    /// Runs and matches a single selected test. Returns `true` if the run
    /// should stop immediately (a failure under `--first`).
    fn run_one(
        &mut self,
        test: &Test,
        executor: &mut Executor,
        eval_runner: &mut OneShotEval,
        counters: &mut RunCounters,
        transcript_path: &Path,
    ) -> TestResult<bool> {
        let captured = executor.run(&test.command)?;
        let verdict = matcher::check(test, &captured, eval_runner, &self.diff_opts, transcript_path)?;

        match verdict {
            Verdict::Pass => {
                self.reporter.report_pass();
                if self.config.list_mode == ListMode::ListRun {
                    self.reporter.report_list_run(test.index, &test.command, true);
                }
                Ok(false)
            }
            Verdict::Fail(diff) => {
                counters.failed += 1;
                if self.config.list_mode == ListMode::ListRun {
                    self.reporter.report_list_run(test.index, &test.command, false);
                } else {
                    self.reporter.report_failure(test.index, test.source_line, &test.command, &diff);
                }
                Ok(self.config.stop_on_first_fail)
            }
        }
    }

    /// A run-range restricts to its members when active; a skip-range
    /// always wins when it matches.
    fn selected(&self, index: u64) -> bool {
        let included = self.config.run_range.is_empty() || self.config.run_range.contains(index);
        let excluded = self.config.skip_range.contains(index);
        included && !excluded
    }
}

fn run_hook_once(shell_path: &Path, command: &str) -> TestResult<bool> {
    let status = std::process::Command::new(shell_path)
        .arg("-c")
        .arg(command)
        .status()
        .map_err(TestError::ShellIoFailed)?;
    Ok(status.success())
}

/// The shell used for every session: `$SHELL` if set, else `/bin/sh`.
fn shell_path() -> PathBuf {
    std::env::var_os("SHELL").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("/bin/sh"))
}

/// A thin wrapper so call sites stay the same whether or not the
/// `progress-bar` feature (and its `indicatif` dependency) is compiled in.
pub struct FileProgress {
    #[cfg(feature = "progress-bar")]
    bar: indicatif::ProgressBar,
}

impl FileProgress {
    fn inc(&self, delta: u64) {
        #[cfg(feature = "progress-bar")]
        self.bar.inc(delta);
        #[cfg(not(feature = "progress-bar"))]
        let _ = delta;
    }

    fn finish_and_clear(self) {
        #[cfg(feature = "progress-bar")]
        self.bar.finish_and_clear();
    }
}

/// An optional progress indicator over *files*, never over tests within a
/// file -- tests must stay strictly ordered and silent except for the
/// Reporter's own output. Only shown for multi-file, non-list, non-quiet
/// runs where there's more than one file to report progress on.
fn file_progress_bar(config: &RunConfig) -> Option<FileProgress> {
    if config.quiet || config.list_mode != ListMode::Off || config.files.len() < 2 {
        return None;
    }

    #[cfg(feature = "progress-bar")]
    {
        let bar = indicatif::ProgressBar::new(config.files.len() as u64);
        bar.set_style(
            indicatif::ProgressStyle::with_template("{bar:40} {pos}/{len} files")
                .unwrap_or_else(|_| indicatif::ProgressStyle::default_bar()),
        );
        Some(FileProgress { bar })
    }
    #[cfg(not(feature = "progress-bar"))]
    {
        None
    }
}
