//! CLI-specific type definitions.

/// Exit codes for the CLI application.
///
/// - 0 indicates successful completion
/// - 1 indicates the policy was checked and rejected
/// - 2 indicates failure (unreadable input, invalid JSON, composition error)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Operation completed successfully
    Success,

    /// Policy contains an invalid AWS principal
    Rejected,

    /// Error reading, decoding or composing a policy
    Error,
}

impl ExitCode {
    /// Convert to the integer exit code for process::exit()
    pub fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Rejected => 1,
            Self::Error => 2,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(exit_code: ExitCode) -> Self {
        exit_code.code()
    }
}
