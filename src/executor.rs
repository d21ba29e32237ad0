//! Owns a persistent shell session for the lifetime of a file run. State
//! set by one test -- variables, working directory, functions, aliases --
//! is visible to every later `run` call, because it is the same
//! interpreter process throughout.

use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use crate::error::{TestError, TestResult};
use crate::matcher::EvalRunner;

/// A persistent shell session. `run` is the only operation the rest of
/// the core needs: evaluate a command, return its combined stdout+stderr.
pub struct Executor {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    next_sentinel: u64,
}

impl Executor {
    /// Spawns the persistent session and merges the shell's stderr into
    /// its stdout for the remainder of its life, so `run` only has to
    /// read one stream to get the combined stdout+stderr.
    ///
    /// `scratch_dir` is exported into the session as `TMPDIR`, so that
    /// any temp files a test command creates land in the run's private,
    /// owner-only scratch directory rather than the system `/tmp`.
    pub fn spawn(shell_path: &Path, scratch_dir: &Path) -> TestResult<Self> {
        let mut child = Command::new(shell_path)
            .arg("-s")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(TestError::ShellSpawnFailed)?;

        let stdin = child.stdin.take().expect("stdin was piped");
        let stdout = BufReader::new(child.stdout.take().expect("stdout was piped"));

        let mut executor = Executor { child, stdin, stdout, next_sentinel: 0 };
        executor.write_line("exec 2>&1")?;
        executor.write_line(&format!("export TMPDIR={}", shell_quote(scratch_dir.to_string_lossy().as_ref())))?;
        Ok(executor)
    }

    fn write_line(&mut self, line: &str) -> TestResult<()> {
        writeln!(self.stdin, "{line}").map_err(TestError::ShellIoFailed)
    }

    /// Evaluates `command` in the persistent session and returns its
    /// combined stdout+stderr as bytes. Exit status is not interpreted
    /// here -- matchers work purely on captured text.
    pub fn run(&mut self, command: &str) -> TestResult<Vec<u8>> {
        self.next_sentinel += 1;
        let sentinel = format!("__shelltest_sentinel_{}_{}__", std::process::id(), self.next_sentinel);

        self.write_line(command)?;
        self.write_line(&format!("echo {sentinel}"))?;
        self.stdin.flush().map_err(TestError::ShellIoFailed)?;

        let mut captured = Vec::new();
        loop {
            let mut line = Vec::new();
            let read = self.stdout.read_until(b'\n', &mut line).map_err(TestError::ShellIoFailed)?;
            if read == 0 {
                // The session died mid-test; whatever we have is all we get.
                break;
            }
            let trimmed = line.strip_suffix(b"\n").unwrap_or(&line);
            // If the command's own output didn't end in a newline, the
            // `echo` sentinel lands on the same raw line, concatenated
            // directly onto that unterminated tail (no newline ever
            // separated them on the wire). Matching the sentinel as a
            // *suffix* rather than requiring the whole line to equal it
            // recovers that leftover tail instead of looping forever
            // waiting for a sentinel line that will never arrive intact.
            if let Some(leftover) = trimmed.strip_suffix(sentinel.as_bytes()) {
                captured.extend_from_slice(leftover);
                break;
            }
            captured.extend_from_slice(&line);
        }
        Ok(captured)
    }

}

impl Drop for Executor {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Wraps a path in single quotes for safe interpolation into a shell
/// command line, escaping any embedded single quote.
fn shell_quote(raw: &str) -> String {
    format!("'{}'", raw.replace('\'', "'\\''"))
}

/// Evaluates `eval`-mode expected payloads in a fresh subshell -- never
/// the persistent session -- so this deliberately spawns a brand new
/// process per call rather than reusing [`Executor::run`].
pub struct OneShotEval {
    pub shell_path: PathBuf,
}

impl EvalRunner for OneShotEval {
    fn eval(&mut self, command: &str) -> TestResult<Vec<u8>> {
        let output = Command::new(&self.shell_path)
            .arg("-c")
            .arg(command)
            .output()
            .map_err(TestError::ShellIoFailed)?;
        Ok(output.stdout)
    }
}
