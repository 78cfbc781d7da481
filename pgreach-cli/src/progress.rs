//! Console rendering of resolver progress.

use pgreach_postgres::resolver::TROUBLESHOOTING_TIPS;
use pgreach_postgres::{CandidateKind, ConnectError, EndpointCandidate, Exhausted, FailureKind, ProbeListener};

use crate::error::CliError;
use crate::output;

/// Prints one line per attempt, failure and success.
#[derive(Debug, Clone)]
pub struct ConsoleListener {
    message_limit: usize,
}

impl ConsoleListener {
    /// Listener truncating failure messages to `message_limit` characters.
    pub fn new(message_limit: usize) -> Self {
        Self { message_limit }
    }
}

impl ProbeListener for ConsoleListener {
    fn attempting(&self, candidate: &EndpointCandidate) {
        output::info(&format!("Trying {} connection...", candidate.label()));
        if candidate.kind == CandidateKind::Direct {
            if let Some(host) = candidate.host() {
                output::kv("Host", &host);
            }
        }
    }

    fn failed(&self, _candidate: &EndpointCandidate, error: &ConnectError) {
        output::failure(&format!("Failed: {}", error.truncated(self.message_limit)));
        if let Some(hint) = error.kind.hint() {
            output::dim(&format!("    {hint}"));
        }
    }

    fn connected(&self, candidate: &EndpointCandidate) {
        output::success(&format!("{} connection successful!", candidate.label()));
    }
}

/// Print the troubleshooting guidance and turn `exhausted` into a CLI error.
pub fn report_exhausted(exhausted: Exhausted) -> CliError {
    output::newline();
    output::failure("All connection methods failed");
    output::newline();
    output::section("Troubleshooting tips");
    for (i, tip) in TROUBLESHOOTING_TIPS.iter().enumerate() {
        output::numbered_item(i + 1, tip);
    }

    let rejected = exhausted.count(FailureKind::Authentication);
    if rejected > 0 {
        output::newline();
        output::warn(&format!(
            "{rejected} attempt(s) were rejected during authentication; check the password"
        ));
    }

    CliError::Exhausted {
        attempts: exhausted.failures.len(),
    }
}
