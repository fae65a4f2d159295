//! Running the external image converter as a streaming filter.
//!
//! One [`Conversion`] is exactly one process invocation: the input bytes are
//! written to its stdin and the pipe is closed (end-of-input for the tool),
//! its stdout is drained to completion, and its exit status is awaited.
//! Output collection and exit observation overlap in real time, but both
//! must finish before a result is produced.  A nonzero exit code is fatal
//! for the enclosing request and is never retried.

use std::ffi::{OsStr, OsString};
use std::future::Future;
use std::process::Stdio;

use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, trace};

use crate::error::ConvertError;
use crate::profile::Profile;

/// Handle on the external converter executable.
///
/// Cheap to clone; spawning is per call and no state is shared between
/// conversions.
#[derive(Debug, Clone)]
pub struct Converter {
    bin: String,
}

impl Converter {
    /// A converter that invokes `bin` (an absolute path or a `$PATH` name).
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }

    /// Run one conversion to completion, buffering the converted bytes.
    pub async fn run(&self, profile: &Profile, input: &[u8]) -> Result<Vec<u8>, ConvertError> {
        self.run_args(profile.argv(), input).await
    }

    /// Spawn one conversion for streaming use; see [`Conversion::into_streaming`].
    pub fn spawn(&self, profile: &Profile) -> Result<Conversion, ConvertError> {
        self.spawn_args(profile.argv())
    }

    async fn run_args<I, S>(&self, args: I, input: &[u8]) -> Result<Vec<u8>, ConvertError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let Conversion {
            mut child,
            mut stdin,
            mut stdout,
        } = self.spawn_args(args)?;

        let feed = async move {
            stdin.write_all(input).await?;
            stdin.shutdown().await?;
            // Close the pipe so the tool sees end-of-input.
            drop(stdin);
            Ok::<(), std::io::Error>(())
        };
        let drain = async move {
            let mut collected = Vec::new();
            stdout.read_to_end(&mut collected).await?;
            Ok::<Vec<u8>, std::io::Error>(collected)
        };
        // Feed and drain concurrently; writing the whole input before reading
        // deadlocks once both pipe buffers fill up.
        let (fed, drained) = tokio::join!(feed, drain);

        let status = child.wait().await.map_err(ConvertError::Wait)?;
        if !status.success() {
            // The exit code is the cause; a broken-pipe write error is only
            // its symptom.
            return Err(ConvertError::ExitStatus {
                code: status.code().unwrap_or(-1),
            });
        }
        fed.map_err(ConvertError::Stdin)?;
        let collected = drained.map_err(ConvertError::Stdout)?;
        debug!(bytes = collected.len(), "conversion finished");
        Ok(collected)
    }

    fn spawn_args<I, S>(&self, args: I) -> Result<Conversion, ConvertError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<OsString> = args.into_iter().map(|a| a.as_ref().to_owned()).collect();
        trace!(bin = %self.bin, args = ?args, "spawning converter");

        let mut child = Command::new(&self.bin)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(ConvertError::Spawn)?;

        // Both pipes were requested above, so the handles are always present.
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ConvertError::Spawn(std::io::Error::other("converter stdin not captured")))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ConvertError::Spawn(std::io::Error::other("converter stdout not captured")))?;

        Ok(Conversion {
            child,
            stdin,
            stdout,
        })
    }
}

/// One spawned converter process that has not been driven yet.
#[derive(Debug)]
pub struct Conversion {
    child: Child,
    stdin: ChildStdin,
    stdout: ChildStdout,
}

impl Conversion {
    /// Split into the stdout handle and a drive future.
    ///
    /// The caller consumes `stdout` however it likes (typically as a
    /// streaming upload body) while concurrently awaiting the returned
    /// future, which feeds `input` to the process, closes its stdin, and
    /// waits for it to exit.  Awaiting the drive future without draining
    /// stdout deadlocks once the pipe buffer fills.
    pub fn into_streaming(
        self,
        input: Bytes,
    ) -> (ChildStdout, impl Future<Output = Result<(), ConvertError>>) {
        let Conversion {
            mut child,
            mut stdin,
            stdout,
        } = self;

        let drive = async move {
            let mut fed = stdin.write_all(&input).await;
            if fed.is_ok() {
                fed = stdin.shutdown().await;
            }
            // Close the pipe even if the write failed so the process can exit.
            drop(stdin);

            let status = child.wait().await.map_err(ConvertError::Wait)?;
            if !status.success() {
                return Err(ConvertError::ExitStatus {
                    code: status.code().unwrap_or(-1),
                });
            }
            fed.map_err(ConvertError::Stdin)
        };

        (stdout, drive)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
