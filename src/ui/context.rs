//! How output is rendered for this process

use std::io::IsTerminal;

/// Environment variables set by common CI systems
const CI_VARS: &[&str] = &[
    "CI",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "JENKINS_URL",
    "BUILDKITE",
    "DRONE",
    "WOODPECKER_CI",
];

/// Rendering mode plus the `--yes` answer for prompts
#[derive(Debug, Clone, Copy)]
pub struct UiContext {
    fancy: bool,
    assume_yes: bool,
}

impl UiContext {
    /// Fancy output only when both ends are a terminal and no CI system is
    /// detected. Image builds mostly run from cron or CI with output
    /// captured to a log file.
    pub fn detect() -> Self {
        let in_ci = CI_VARS.iter().any(|var| std::env::var_os(var).is_some());
        Self::from_terminal(
            std::io::stdout().is_terminal(),
            std::io::stdin().is_terminal(),
            in_ci,
        )
    }

    fn from_terminal(stdout_tty: bool, stdin_tty: bool, in_ci: bool) -> Self {
        Self {
            fancy: stdout_tty && stdin_tty && !in_ci,
            assume_yes: false,
        }
    }

    /// Plain tagged lines, prompts answered with their default
    pub fn non_interactive() -> Self {
        Self::from_terminal(false, false, false)
    }

    pub fn with_auto_yes(self, assume_yes: bool) -> Self {
        Self { assume_yes, ..self }
    }

    pub fn is_interactive(&self) -> bool {
        self.fancy
    }

    pub fn auto_yes(&self) -> bool {
        self.assume_yes
    }

    pub fn use_fancy_output(&self) -> bool {
        self.fancy
    }
}
