use crate::domain::ports::Confirmer;
use std::io::{self, BufRead, Write};

/// 在終端機詢問 y/N；`assume_yes` 時直接同意（--yes）
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptConfirmer {
    assume_yes: bool,
}

impl PromptConfirmer {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Confirmer for PromptConfirmer {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            tracing::debug!("auto-confirmed: {}", prompt);
            return true;
        }

        eprint!("{} [y/N] ", prompt);
        let _ = io::stderr().flush();

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(e) => {
                tracing::warn!("could not read confirmation: {}", e);
                false
            }
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("no"));
    }

    #[test]
    fn test_assume_yes_skips_prompt() {
        assert!(PromptConfirmer::new(true).confirm("Delete?"));
    }
}
