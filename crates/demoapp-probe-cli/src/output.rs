//! Status lines and spinners on stderr

use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Human-facing status output. Command results go to stdout; this writes to
/// stderr so piped output stays clean.
#[derive(Debug)]
pub struct Reporter {
    term: Term,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl Reporter {
    /// Create a new reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            use_color,
            quiet,
        }
    }

    /// Spinner for a network wait; `None` in quiet mode
    #[must_use]
    pub fn spinner(&self, message: &str) -> Option<ProgressBar> {
        if self.quiet {
            return None;
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }
        let _ = self.term.write_line(&self.line("✓", "OK", message, true));
    }

    /// Print a failure message, even in quiet mode
    pub fn failure(&self, message: &str) {
        let _ = self.term.write_line(&self.line("✗", "FAIL", message, false));
    }

    fn line(&self, symbol: &str, plain: &str, message: &str, ok: bool) -> String {
        if !self.use_color {
            return format!("{plain} {message}");
        }
        let prefix = if ok {
            style(symbol).green().bold()
        } else {
            style(symbol).red().bold()
        };
        format!("{prefix} {message}")
    }
}
