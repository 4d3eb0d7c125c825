//! Yes/no confirmation prompts.

use std::io::{self, BufRead, Write};

/// Asks the user to confirm an action.
pub trait Prompt: Send + Sync {
    fn confirm(&self, message: &str) -> io::Result<bool>;
}

/// Reads the answer from stdin. Anything but `y`/`yes` declines.
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn confirm(&self, message: &str) -> io::Result<bool> {
        let mut stdout = io::stdout();
        write!(stdout, "{message} (y/N) ")?;
        stdout.flush()?;

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        Ok(is_yes(&answer))
    }
}

/// Confirms everything.
pub struct AutoConfirm;

impl Prompt for AutoConfirm {
    fn confirm(&self, _message: &str) -> io::Result<bool> {
        Ok(true)
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
