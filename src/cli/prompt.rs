//! Overwrite confirmation on the terminal

use std::io::{self, BufRead, Write};
use std::path::Path;

use async_trait::async_trait;
use tracing::warn;

use crate::ports::OverwritePrompt;

/// Asks on stderr and reads the answer from stdin
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinOverwritePrompt {
    /// Answer yes without asking
    pub assume_yes: bool,
}

impl StdinOverwritePrompt {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

#[async_trait]
impl OverwritePrompt for StdinOverwritePrompt {
    async fn confirm_overwrite(&self, output: &Path) -> bool {
        if self.assume_yes {
            return true;
        }

        let question = format!(
            "Output file {} already exists. Overwrite? [y/N] ",
            output.display()
        );
        match tokio::task::spawn_blocking(move || ask(&question)).await {
            Ok(Ok(answer)) => is_affirmative(&answer),
            Ok(Err(e)) => {
                warn!(error = %e, "Failed to read overwrite answer");
                false
            }
            Err(e) => {
                warn!(error = %e, "Overwrite prompt task failed");
                false
            }
        }
    }
}

fn ask(question: &str) -> io::Result<String> {
    let mut stderr = io::stderr();
    stderr.write_all(question.as_bytes())?;
    stderr.flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(answer)
}

/// `y` or `yes`, in any case
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_affirmative() {
        assert!(is_affirmative("y\n"));
        assert!(is_affirmative(" YES "));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("no"));
        assert!(!is_affirmative("yep"));
    }

    #[tokio::test]
    async fn test_assume_yes_skips_question() {
        let prompt = StdinOverwritePrompt::new(true);
        assert!(prompt.confirm_overwrite(Path::new("/tmp/out.mp4")).await);
    }
}
