//! Claude Code CLI backend.
//!
//! # Responsibilities
//! - Translate `QueryOptions` into CLI arguments
//! - Spawn the CLI with piped stdout/stderr
//! - Expose stdout as a stream of `Message`
//! - Surface a non-zero exit (with stderr) as a stream error
//!
//! # Design Decisions
//! - Child is spawned with `kill_on_drop`, so dropping the stream kills it
//! - Blank lines are skipped; every other line becomes one message
//! - `text` output is only yielded after the child exits, since a failing CLI
//!   prints its error on stdout and reports it through the exit status alone
//! - `stream-json` output is yielded line by line; a result line flagged
//!   `is_error` becomes a stream error

use futures_util::{stream, StreamExt};
use std::io;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};

use crate::backend::{Backend, BackendError, Message, MessageStream, OutputFormat, QueryOptions};

/// Backend that shells out to the `claude` executable.
#[derive(Debug, Clone)]
pub struct CliBackend {
    program: String,
    version: Option<String>,
}

impl CliBackend {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            version: None,
        }
    }

    /// Attach the version reported by the availability check.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Arguments for a single non-interactive query.
    pub fn build_args(prompt: &str, options: &QueryOptions) -> Vec<String> {
        let mut args = vec![
            "-p".to_string(),
            prompt.to_string(),
            "--output-format".to_string(),
            options.output_format.as_str().to_string(),
            "--max-turns".to_string(),
            options.max_turns.to_string(),
            "--permission-mode".to_string(),
            options.permission_mode.as_str().to_string(),
        ];

        if !options.allowed_tools.is_empty() {
            args.push("--allowedTools".to_string());
            args.push(options.allowed_tools.join(","));
        }

        // The CLI refuses stream-json in print mode without --verbose.
        if options.output_format == OutputFormat::StreamJson {
            args.push("--verbose".to_string());
        }

        args
    }
}

impl Backend for CliBackend {
    fn query(&self, prompt: &str, options: &QueryOptions) -> Result<MessageStream, BackendError> {
        let args = Self::build_args(prompt, options);
        tracing::debug!(program = %self.program, ?args, "Spawning backend CLI");

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| BackendError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let stdout = child.stdout.take().ok_or(BackendError::MissingStdout)?;
        let stderr = child.stderr.take();

        let session = CliSession {
            child,
            lines: BufReader::new(stdout).lines(),
            stderr,
        };

        let messages = match options.output_format {
            OutputFormat::Text => stream::once(session.run_to_exit())
                .flat_map(|outcome| match outcome {
                    Ok(messages) => stream::iter(messages.into_iter().map(Ok::<_, BackendError>)).boxed(),
                    Err(e) => stream::once(async move { Err(e) }).boxed(),
                })
                .boxed(),
            OutputFormat::StreamJson => stream::unfold(Some(session), next_message).boxed(),
        };

        Ok(messages)
    }

    fn label(&self) -> String {
        match &self.version {
            Some(version) => format!("claude-code-cli {}", version),
            None => "claude-code-cli".to_string(),
        }
    }
}

struct CliSession {
    child: Child,
    lines: Lines<BufReader<ChildStdout>>,
    stderr: Option<ChildStderr>,
}

impl CliSession {
    /// Read all of stdout, then reap the child.
    async fn run_to_exit(self) -> Result<Vec<Message>, BackendError> {
        let CliSession {
            mut child,
            mut lines,
            stderr,
        } = self;

        let mut stdout = Vec::new();
        let read_stdout = async {
            while let Some(line) = lines.next_line().await? {
                if !line.trim().is_empty() {
                    stdout.push(line);
                }
            }
            Ok::<_, io::Error>(())
        };
        let (read, stderr) = tokio::join!(read_stdout, read_stderr(stderr));
        read.map_err(BackendError::Read)?;

        let status = child.wait().await.map_err(BackendError::Read)?;
        if !status.success() {
            // Some failures are reported on stdout only.
            let detail = if stderr.is_empty() {
                stdout.join("\n")
            } else {
                stderr
            };
            return Err(BackendError::Exited {
                code: status.code(),
                stderr: detail,
            });
        }

        Ok(stdout.iter().map(|line| Message::from_line(line)).collect())
    }

    /// Reap the child once stdout is exhausted and report a failed exit.
    async fn finish(mut self) -> Result<(), BackendError> {
        let status = self.child.wait().await.map_err(BackendError::Read)?;
        if status.success() {
            return Ok(());
        }

        Err(BackendError::Exited {
            code: status.code(),
            stderr: read_stderr(self.stderr.take()).await,
        })
    }
}

async fn read_stderr(pipe: Option<ChildStderr>) -> String {
    let mut stderr = String::new();
    if let Some(mut pipe) = pipe {
        // Partial stderr is still useful for classification.
        let _ = pipe.read_to_string(&mut stderr).await;
    }
    stderr.trim().to_string()
}

async fn next_message(
    state: Option<CliSession>,
) -> Option<(Result<Message, BackendError>, Option<CliSession>)> {
    let mut session = state?;
    loop {
        let next = session.lines.next_line().await;
        match next {
            Ok(Some(line)) if line.trim().is_empty() => continue,
            Ok(Some(line)) => {
                return match Message::from_line(&line) {
                    Message::Result {
                        subtype,
                        result,
                        is_error: true,
                    } => Some((
                        Err(BackendError::Reported {
                            subtype,
                            result: result.unwrap_or_default(),
                        }),
                        None,
                    )),
                    message => Some((Ok(message), Some(session))),
                };
            }
            Ok(None) => return session.finish().await.err().map(|e| (Err(e), None)),
            Err(e) => return Some((Err(BackendError::Read(e)), None)),
        }
    }
}
