//! The child compiler process and its byte channel.
//!
//! The driver talks to the child through a [`Connection`]: a pair of
//! byte streams plus an optional process handle. Production connections
//! wrap a spawned compiler; tests build them over in-memory duplex
//! streams with a scripted compiler on the far side.

use crate::Error;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncWrite};

pub(crate) struct Connection {
    pub(crate) reader: Box<dyn AsyncRead + Send + Unpin>,
    pub(crate) writer: Box<dyn AsyncWrite + Send + Unpin>,
    pub(crate) pid: Option<u32>,
    pub(crate) child: Option<CompilerChild>,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection").field("pid", &self.pid).finish()
    }
}

impl Connection {
    /// Spawn the compiler with piped stdin/stdout. Stderr is discarded:
    /// the protocol lives entirely on stdout, and well-behaved
    /// compilers log nothing unless asked.
    pub(crate) fn spawn(path: &Path, args: &[String]) -> Result<Connection, Error> {
        let mut child = tokio::process::Command::new(path)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|error| {
                Error::Lifecycle(format!(
                    "could not start compiler {}: {error}",
                    path.display()
                ))
            })?;

        let stdin = child.stdin.take().expect("compiler stdin is piped");
        let stdout = child.stdout.take().expect("compiler stdout is piped");
        let pid = child.id();

        tracing::info!(path = %path.display(), ?pid, "started compiler");

        Ok(Connection {
            reader: Box::new(stdout),
            writer: Box::new(stdin),
            pid,
            child: Some(CompilerChild { inner: child }),
        })
    }

    /// A connection over caller-provided streams, with no process
    /// attached. How driver tests splice in a scripted compiler.
    #[cfg(test)]
    pub(crate) fn from_streams(
        reader: impl AsyncRead + Send + Unpin + 'static,
        writer: impl AsyncWrite + Send + Unpin + 'static,
    ) -> Connection {
        Connection {
            reader: Box::new(reader),
            writer: Box::new(writer),
            pid: None,
            child: None,
        }
    }
}

/// A handle to the spawned compiler process. Killed on drop as a
/// backstop; the driver kills and reaps explicitly on teardown.
pub(crate) struct CompilerChild {
    inner: tokio::process::Child,
}

impl CompilerChild {
    /// Kill the process and wait for it to be reaped, so that a
    /// completed shutdown implies the child is no longer running.
    pub(crate) async fn kill(mut self) {
        if let Err(error) = self.inner.kill().await {
            tracing::warn!(%error, "failed to kill compiler");
        }
    }

    /// Collect the exit status if the process has already exited.
    /// Used when stdout EOF suggests the child died underneath us.
    pub(crate) fn try_wait_status(&mut self) -> Option<std::process::ExitStatus> {
        self.inner.try_wait().ok().flatten()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::codec;
    use proto_sass::{inbound_message, InboundMessage};

    // `cat` echoes our frames back verbatim, which exercises spawn,
    // both pipes, and termination without a real compiler.
    #[tokio::test]
    async fn test_spawn_round_trip_through_cat() {
        let mut connection = Connection::spawn(Path::new("cat"), &[]).expect("cat exists");
        assert!(connection.pid.is_some());

        let fixture = InboundMessage {
            message: Some(inbound_message::Message::VersionRequest(
                inbound_message::VersionRequest { id: 3 },
            )),
        };

        use tokio::io::AsyncWriteExt;
        connection
            .writer
            .write_all(&codec::encode_message(&fixture))
            .await
            .unwrap();

        let echoed: Option<InboundMessage> =
            codec::decode_message(&mut connection.reader).await.unwrap();
        assert_eq!(echoed, Some(fixture));

        connection.child.take().unwrap().kill().await;
    }

    #[tokio::test]
    async fn test_spawn_missing_binary_fails() {
        let error = Connection::spawn(Path::new("/does/not/exist"), &[]).unwrap_err();
        assert!(matches!(error, Error::Lifecycle(_)), "got {error:?}");
    }
}
