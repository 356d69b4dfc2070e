// LogCorral - platform/confirm.rs
//
// Interactive yes/no confirmation as a capability interface.
//
// The pipeline core never performs interactive I/O; callers that need a
// confirmation (report overwrite, destination-root creation) go through
// this trait, so tests and non-interactive runs can substitute their own
// answers.

use std::io::{self, BufRead, Write};

/// A yes/no question asked of the operator.
pub trait Confirm {
    /// Ask `prompt`; returns true for yes, false for no.
    fn confirm(&mut self, prompt: &str) -> bool;
}

/// Answers every question with yes. Used for `--assume-yes` and scripted runs.
#[derive(Debug, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, prompt: &str) -> bool {
        tracing::debug!(prompt, "Confirmation auto-accepted (--assume-yes)");
        true
    }
}

/// Prompts on stderr and reads the answer from stdin.
///
/// Re-asks on unrecognised input; EOF counts as no, so a closed stdin
/// (e.g. a misconfigured cron job) can never accidentally consent.
#[derive(Debug, Default)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        let stdin = io::stdin();
        let mut line = String::new();

        loop {
            eprint!("{prompt} (yes/no): ");
            let _ = io::stderr().flush();

            line.clear();
            match stdin.lock().read_line(&mut line) {
                Ok(0) => return false, // EOF
                Ok(_) => match parse_answer(&line) {
                    Some(answer) => return answer,
                    None => eprintln!("Please answer 'yes' or 'no'."),
                },
                Err(e) => {
                    tracing::warn!(error = %e, "Cannot read confirmation answer");
                    return false;
                }
            }
        }
    }
}

/// Interpret one line of user input. `None` means re-ask.
fn parse_answer(line: &str) -> Option<bool> {
    match line.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

// =============================================================================
// Tests
// =============================================================================
