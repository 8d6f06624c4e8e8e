//! Yes/no confirmation for destructive conflict resolution.
use dialoguer::Input;

/// Answers that decline a confirmation. Everything else, including an empty
/// line, is affirmative.
const NEGATIVE: [&str; 4] = ["n", "N", "No", "no"];

/// Returns `true` when `answer` affirms the prompt.
///
/// # Examples
///
/// ```
/// use dotlayers::engine::prompt::is_affirmative;
///
/// assert!(is_affirmative(""));
/// assert!(is_affirmative("yes"));
/// assert!(!is_affirmative("No"));
/// ```
#[must_use]
pub fn is_affirmative(answer: &str) -> bool {
    !NEGATIVE.contains(&answer.trim())
}

/// Asks the user to confirm an action.
#[cfg_attr(test, mockall::automock)]
pub trait Prompt: Send + Sync + std::fmt::Debug {
    /// Ask `question`; `true` means proceed.
    fn confirm(&self, question: &str) -> bool;
}

/// Interactive prompt on the controlling terminal, `[Y/n]` style.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn confirm(&self, question: &str) -> bool {
        // An unreadable terminal is treated as a refusal.
        Input::<String>::new()
            .with_prompt(format!("{question} [Y/n]"))
            .allow_empty(true)
            .interact_text()
            .is_ok_and(|answer| is_affirmative(&answer))
    }
}

/// Non-interactive prompt that always proceeds (`--yes`).
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl Prompt for AssumeYes {
    fn confirm(&self, _question: &str) -> bool {
        true
    }
}
