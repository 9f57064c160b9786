//! Unix-socket accept loop.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::net::UnixListener;
use tokio::sync::mpsc;

use crate::ingest::protocol::{Command, LineBuffer, Record};
use crate::ingest::session::{Session, Step};
use crate::storage::GraphStore;
use crate::Result;

// ============================================================================
// Acknowledgement sink
// ============================================================================

/// Where server records (`A`, command echoes, `D`) go.
pub trait AckSink: Send + Sync + 'static {
    fn emit(&self, record: &Record);
}

/// Prints each record on its own stdout line.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl AckSink for StdoutSink {
    fn emit(&self, record: &Record) {
        println!("{record}");
    }
}

impl AckSink for mpsc::UnboundedSender<Record> {
    fn emit(&self, record: &Record) {
        // Receiver gone means nobody is listening any more.
        let _ = self.send(record.clone());
    }
}

// ============================================================================
// Options
// ============================================================================

/// Default per-read timeout.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Bytes requested per read.
    pub read_chunk: usize,
    /// A read stalled for longer than this ends the session. `None` waits
    /// forever.
    pub read_timeout: Option<Duration>,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self { read_chunk: 1024, read_timeout: Some(DEFAULT_READ_TIMEOUT) }
    }
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The client sent `D`.
    Done,
    /// The client closed its end.
    Eof,
    /// A read failed (e.g. connection reset).
    TransportError,
    /// No bytes arrived within the read timeout.
    TimedOut,
}

// ============================================================================
// IngestServer
// ============================================================================

/// Serves one client at a time. Every accepted connection starts from an
/// empty graph.
pub struct IngestServer {
    store: Arc<GraphStore>,
    sink: Arc<dyn AckSink>,
    options: IngestOptions,
}

impl IngestServer {
    pub fn new(store: Arc<GraphStore>, sink: Arc<dyn AckSink>, options: IngestOptions) -> Self {
        Self { store, sink, options }
    }

    /// Bind the listening socket, removing a stale socket file first. Any
    /// bind error other than the stale file is returned.
    pub fn bind(path: &Path) -> Result<UnixListener> {
        match std::fs::remove_file(path) {
            Ok(()) => tracing::debug!(path = %path.display(), "removed stale socket"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        let listener = UnixListener::bind(path)?;
        tracing::info!(path = %path.display(), "ingestion socket listening");
        Ok(listener)
    }

    /// Accept loop over `listener`. Never returns; a failed accept is
    /// logged and retried.
    pub async fn run(&self, listener: UnixListener) -> Result<()> {
        let listener = &listener;
        self.run_with(move || async move { listener.accept().await.map(|(stream, _)| stream) })
            .await
    }

    /// Accept loop over any source of connections.
    ///
    /// A client that ended with `D` keeps its transport open until the next
    /// client is accepted. Closing it is left to the peer.
    pub async fn run_with<A, F, S>(&self, mut accept: A) -> Result<()>
    where
        A: FnMut() -> F,
        F: Future<Output = io::Result<S>>,
        S: AsyncRead + Unpin,
    {
        let mut finished: Option<S> = None;
        loop {
            let mut stream = match accept().await {
                Ok(stream) => stream,
                Err(e) => {
                    tracing::warn!(error = %e, "ingestion accept failed");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                    continue;
                }
            };
            drop(finished.take());

            let end = self.serve(&mut stream).await;
            tracing::info!(?end, "ingestion client finished");
            if end == SessionEnd::Done {
                finished = Some(stream);
            }
        }
    }

    /// Bind `path` and run the accept loop.
    pub async fn listen(&self, path: impl Into<PathBuf>) -> Result<()> {
        let listener = Self::bind(&path.into())?;
        self.run(listener).await
    }

    /// Serve one connection to completion. The stream is not shut down here;
    /// pass `&mut stream` to keep it past the session.
    pub async fn serve<S: AsyncRead + Unpin>(&self, mut stream: S) -> SessionEnd {
        let mut session = Session::begin(self.store.clone());
        self.sink.emit(&Record::Accepted);
        tracing::info!("ingestion client accepted, graph reset");

        let end = self.pump(&mut session, &mut stream).await;

        self.sink.emit(&Record::Done);
        end
    }

    async fn pump<S: AsyncRead + Unpin>(&self, session: &mut Session, stream: &mut S) -> SessionEnd {
        let mut lines = LineBuffer::new();
        let mut chunk = vec![0u8; self.options.read_chunk.max(1)];

        loop {
            let read = match self.options.read_timeout {
                Some(limit) => match tokio::time::timeout(limit, stream.read(&mut chunk)).await {
                    Ok(read) => read,
                    Err(_) => {
                        tracing::warn!(?limit, "ingestion client timed out");
                        return SessionEnd::TimedOut;
                    }
                },
                None => stream.read(&mut chunk).await,
            };

            let n = match read {
                Ok(0) => {
                    if !lines.pending().is_empty() {
                        tracing::debug!(partial = lines.pending(), "dropping unterminated line at EOF");
                    }
                    return SessionEnd::Eof;
                }
                Ok(n) => n,
                Err(e) => {
                    tracing::warn!(error = %e, "ingestion read failed");
                    return SessionEnd::TransportError;
                }
            };

            for line in lines.push(&chunk[..n]) {
                if self.process_line(session, &line) {
                    return SessionEnd::Done;
                }
            }
        }
    }

    /// Apply one line. Returns `true` when the session should stop.
    fn process_line(&self, session: &mut Session, line: &str) -> bool {
        let step = Command::parse(line)
            .map_err(crate::Error::from)
            .and_then(|command| session.apply(command));
        match step {
            Ok(Step::Ack(record)) => {
                self.sink.emit(&record);
                false
            }
            Ok(Step::Finish) => true,
            Err(e) => {
                tracing::warn!(error = %e, "ingestion line rejected");
                false
            }
        }
    }
}
