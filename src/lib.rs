//! shelltest validates interactive command-line sessions documented in
//! plain text files.
//!
//! A transcript looks like a shell session: a prompt followed by a
//! command, then the expected output on the lines that follow (or inline on
//! the same line behind a marker). shelltest extracts each such "test" from
//! a file, runs its command in a single persistent shell session -- so
//! state set by one test (variables, working directory, shell functions) is
//! visible to the next -- and compares the captured output against the
//! expected payload using a selectable matcher.
//!
//! ```text
//! $ X=5
//! $ echo $X
//! 5
//! $ printf 'a\nb\nc\n' #→ --lines 3
//! ```
//!
//! The crate is organized around that pipeline: a [`range`] parser for
//! `--test`/`--skip` selection, a
//! [`lineend`] normalizer, a [`parser`] that turns a transcript into
//! [`parser::Test`] records, an [`executor`] that owns the persistent shell
//! session, a [`matcher`] that judges captured output against expected
//! output, a [`driver`] that ties the above together per file, and a
//! [`reporter`] that renders diffs and tallies.
//!
//! [`cli`] and [`config_file`] are the ambient CLI/config-loading layer that
//! produces the [`config::RunConfig`] the [`driver::Driver`] consumes; they
//! are not part of the core the rest of this crate's tests exercise
//! directly.

pub mod cli;
pub mod config;
pub mod config_file;
pub mod diff_printer;
pub mod driver;
pub mod error;
pub mod executor;
pub mod lineend;
pub mod matcher;
pub mod parser;
pub mod range;
pub mod reporter;
pub mod tempdir;

pub use config::RunConfig;
pub use driver::Driver;
pub use error::{TestError, TestResult};
