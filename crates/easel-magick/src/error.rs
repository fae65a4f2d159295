use thiserror::Error;

/// Errors that can be returned by a converter invocation.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The converter executable could not be started.
    #[error("failed to spawn converter: {0}")]
    Spawn(#[source] std::io::Error),

    /// Writing the input image to the converter's stdin failed.
    #[error("failed to write converter stdin: {0}")]
    Stdin(#[source] std::io::Error),

    /// Reading the converted image from the converter's stdout failed.
    #[error("failed to read converter stdout: {0}")]
    Stdout(#[source] std::io::Error),

    /// Waiting for the converter process to exit failed.
    #[error("failed to wait for converter: {0}")]
    Wait(#[source] std::io::Error),

    /// The converter exited with a nonzero status code.
    #[error("converter exited with code {code}")]
    ExitStatus { code: i32 },
}
