//! Process exit codes and the error type that carries them to `main`.

pub const EXIT_OK: i32 = 0;
pub const EXIT_UNEXPECTED: i32 = 1;
pub const EXIT_FAIL_ON: i32 = 2;
pub const EXIT_INPUT: i32 = 3;
pub const EXIT_PROVIDER: i32 = 4;
pub const EXIT_INVALID_OUTPUT: i32 = 5;

/// An error with a deliberate exit code. Anything else exits with 1.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Exit code for an error returned from a subcommand.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<ExitError>()
        .map(|e| e.code)
        .unwrap_or(EXIT_UNEXPECTED)
}
