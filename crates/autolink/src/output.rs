//! Terminal output for the CLI.
//!
//! The rewritten message is the only thing written to stdout, so it can be
//! piped. Everything else is a colored status line on stderr.

use std::borrow::Cow;
use std::io;

use console::{Style, Term};

pub(crate) struct Output {
    status: Term,
    message: Term,
    ok: Style,
    warn: Style,
    fail: Style,
    heading: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            status: Term::stderr(),
            message: Term::stdout(),
            ok: Style::new().green(),
            warn: Style::new().yellow(),
            fail: Style::new().red(),
            heading: Style::new().cyan().bold(),
        }
    }

    /// Plain status line.
    pub(crate) fn status(&self, line: &str) {
        self.status_styled(line, None);
    }

    pub(crate) fn ok(&self, line: &str) {
        self.status_styled(line, Some(&self.ok));
    }

    pub(crate) fn warn(&self, line: &str) {
        self.status_styled(line, Some(&self.warn));
    }

    pub(crate) fn fail(&self, line: &str) {
        self.status_styled(line, Some(&self.fail));
    }

    pub(crate) fn heading(&self, line: &str) {
        self.status_styled(line, Some(&self.heading));
    }

    /// Write a message to stdout, newline-terminated.
    ///
    /// # Errors
    ///
    /// Returns an error if stdout is closed.
    pub(crate) fn message(&self, text: &str) -> io::Result<()> {
        self.message.write_str(&newline_terminated(text))?;
        self.message.flush()
    }

    fn status_styled(&self, line: &str, style: Option<&Style>) {
        // Status lines are best effort; a closed stderr must not fail the command.
        let _ = match style {
            Some(style) => self.status.write_line(&style.apply_to(line).to_string()),
            None => self.status.write_line(line),
        };
    }
}

fn newline_terminated(text: &str) -> Cow<'_, str> {
    if text.ends_with('\n') {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(format!("{text}\n"))
    }
}
