//! Colored terminal output utilities.

use console::{Style, Term};

/// Terminal output formatter.
///
/// Status messages go to stderr; command results go to stdout so they can be
/// piped.
pub(crate) struct Output {
    term: Term,
    stdout: Term,
    green: Style,
    yellow: Style,
    red: Style,
    cyan_bold: Style,
    dim: Style,
}

impl Output {
    /// Create a new output formatter.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            stdout: Term::stdout(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
            cyan_bold: Style::new().cyan().bold(),
            dim: Style::new().dim(),
        }
    }

    /// Print an info message.
    pub(crate) fn info(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    /// Print a success message (green).
    pub(crate) fn success(&self, msg: &str) {
        let _ = self.term.write_line(&self.green.apply_to(msg).to_string());
    }

    /// Print a warning message (yellow).
    pub(crate) fn warning(&self, msg: &str) {
        let _ = self.term.write_line(&self.yellow.apply_to(msg).to_string());
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&self.red.apply_to(msg).to_string());
    }

    /// Print a highlighted message (cyan bold).
    pub(crate) fn highlight(&self, msg: &str) {
        let _ = self
            .term
            .write_line(&self.cyan_bold.apply_to(msg).to_string());
    }

    /// Print a result line to stdout.
    pub(crate) fn result(&self, line: &str) {
        let _ = self.stdout.write_line(line);
    }

    /// Print a document entry (`title  slug`) to stdout.
    pub(crate) fn entry(&self, indent: usize, title: &str, slug: &str) {
        let line = format!(
            "{}{title}  {}",
            "  ".repeat(indent),
            self.dim.apply_to(slug)
        );
        let _ = self.stdout.write_line(&line);
    }
}
