//! UI context for detecting interactive vs CI environments

use std::io::IsTerminal;

/// Common CI environment indicators
const CI_VARS: &[&str] = &[
    "CI",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "CIRCLECI",
    "BUILDKITE",
    "CODEBUILD_BUILD_ID",
    "JENKINS_URL",
    "TF_BUILD",
];

/// UI context that determines output behavior
#[derive(Debug, Clone)]
pub struct UiContext {
    interactive: bool,
}

impl UiContext {
    /// Detect the current environment
    pub fn detect() -> Self {
        Self {
            interactive: Self::detect_interactive(),
        }
    }

    /// Create a non-interactive context (for testing or explicit CI mode)
    pub fn non_interactive() -> Self {
        Self { interactive: false }
    }

    /// Check if we should use fancy output
    pub fn use_fancy_output(&self) -> bool {
        self.interactive
    }

    fn detect_interactive() -> bool {
        if !std::io::stdout().is_terminal() {
            return false;
        }

        !CI_VARS.iter().any(|var| std::env::var_os(var).is_some())
    }
}
