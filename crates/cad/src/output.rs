//! Terminal output for CLI commands.
//!
//! Progress goes to stderr, styled. Command results (token pairs, assertion
//! XML) go to stdout unstyled so they can be piped.

use std::fmt::Display;
use std::io::{self, Write};

use console::{Style, Term};

pub(crate) struct Output {
    stderr: Term,
    done: Style,
    failed: Style,
    detail: Style,
}

impl Output {
    pub(crate) fn new() -> Self {
        Self {
            stderr: Term::stderr(),
            done: Style::new().green(),
            failed: Style::new().red(),
            detail: Style::new().cyan().bold(),
        }
    }

    /// Plain progress line.
    pub(crate) fn status(&self, msg: &str) {
        let _ = self.stderr.write_line(msg);
    }

    /// Step finished.
    pub(crate) fn done(&self, msg: &str) {
        self.styled(&self.done, msg);
    }

    /// Command failed; `err` is printed after an `Error:` prefix.
    pub(crate) fn failed(&self, err: &dyn Display) {
        self.styled(&self.failed, &format!("Error: {err}"));
    }

    /// Emphasized fact about the result (ids, expiry).
    pub(crate) fn detail(&self, msg: &str) {
        self.styled(&self.detail, msg);
    }

    /// Write one result line to stdout.
    pub(crate) fn result(&self, line: &str) -> io::Result<()> {
        writeln!(io::stdout().lock(), "{line}")
    }

    fn styled(&self, style: &Style, msg: &str) {
        let _ = self.stderr.write_line(&style.apply_to(msg).to_string());
    }
}
