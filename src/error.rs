use std::error::Error;
use std::fmt;
use std::path::PathBuf;

pub type TestResult<T> = Result<T, TestError>;

/// The fatal, exit-2 class of error: things a user must fix before a run
/// can continue at all. Per-test matcher failures are not
/// `TestError`s -- the Driver reports those directly to the [`Reporter`]
/// and only surfaces `TestError::TestsFailed` once the whole invocation is
/// done.
///
/// [`Reporter`]: crate::reporter::Reporter
#[derive(Debug)]
pub enum TestError {
    /// The input file could not be opened or read.
    UnreadableFile(PathBuf, std::io::Error),
    /// `--test`/`--skip` was not `N[,N|N-N]*`, empty, or `0`.
    InvalidRange(String),
    /// An active range matched no tests in the file.
    EmptyRangeMatch { run: bool, skip: bool },
    /// A `regex`/`perl` mode pattern failed to compile.
    MalformedRegex(String, regex::Error),
    /// A `lines` mode payload was missing or not a non-negative integer.
    InvalidLineCount(PathBuf, usize, String),
    /// An inline payload required by its mode was empty.
    EmptyInlinePayload(PathBuf, usize, &'static str),
    /// A `file` mode target could not be opened.
    MissingMatchFile(PathBuf, usize, PathBuf),
    /// No test was found in a file and no range filter was active.
    NoTestFound(PathBuf),
    /// The persistent shell session could not be spawned.
    ShellSpawnFailed(std::io::Error),
    /// Reading or writing the shell session's pipes failed mid-run.
    ShellIoFailed(std::io::Error),
    /// A pre-flight command exited unsuccessfully.
    PreFlightFailed(String),
    /// At least one test failed during an otherwise clean run.
    TestsFailed { failed: usize, total: usize },
}

impl fmt::Display for TestError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use TestError::*;
        match self {
            UnreadableFile(path, err) => write!(f, "could not read '{}': {}", path.display(), err),
            InvalidRange(raw) => write!(f, "invalid range '{raw}'"),
            EmptyRangeMatch { run, skip } => match (run, skip) {
                (true, true) => write!(f, "--test and --skip together matched no tests"),
                (true, false) => write!(f, "--test matched no tests"),
                (false, true) => write!(f, "--skip matched no tests"),
                (false, false) => write!(f, "range matched no tests"),
            },
            MalformedRegex(pattern, err) => write!(f, "malformed regex '{pattern}': {err}"),
            InvalidLineCount(path, line, raw) => write!(
                f,
                "{}:{line}: '--lines' expects a non-negative integer, got '{raw}'",
                path.display()
            ),
            EmptyInlinePayload(path, line, mode) => write!(
                f,
                "{}:{line}: inline '--{mode}' requires a non-empty payload",
                path.display()
            ),
            MissingMatchFile(path, line, target) => write!(
                f,
                "{}:{line}: could not read match file '{}'",
                path.display(),
                target.display()
            ),
            NoTestFound(path) => write!(f, "{}: no test found", path.display()),
            ShellSpawnFailed(err) => write!(f, "could not start shell session: {err}"),
            ShellIoFailed(err) => write!(f, "shell session I/O error: {err}"),
            PreFlightFailed(cmd) => write!(f, "pre-flight command failed: {cmd}"),
            TestsFailed { failed, total } => write!(f, "{failed} of {total} tests failed"),
        }
    }
}

impl Error for TestError {}

impl TestError {
    /// Maps this error to the process's exit code: fatal errors exit 2,
    /// a clean run with at least one failed test exits 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            TestError::TestsFailed { .. } => 1,
            _ => 2,
        }
    }
}
