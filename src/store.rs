// Object-store seam used by the share pipeline. `S3Client` is the real
// implementation; tests drive the pipeline with an in-memory one.

use crate::error::Result;
use std::io;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context, Poll};
use tokio::io::{AsyncRead, ReadBuf};

/// Number of progress callbacks aimed for over one transfer.
pub const PROGRESS_STEPS: u64 = 1000;

/// An object written to the bucket. Every object this crate writes is
/// public-read, so `url` is directly fetchable.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteObject {
    pub key: String,
    pub size: u64,
    pub content_type: String,
    pub url: String,
}

/// Receives transfer progress as `(bytes_sent, total_bytes)`.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, sent: u64, total: u64);

    /// Called once after the last chunk was acknowledged.
    fn finish(&self) {}
}

/// Sink that ignores everything (`--no-progress`).
pub struct Silent;

impl ProgressSink for Silent {
    fn on_progress(&self, _sent: u64, _total: u64) {}
}

/// Operations the share pipeline needs from a bucket.
pub trait ObjectStore {
    /// Whether an object with `key` already exists.
    fn exists(&self, key: &str) -> Result<bool>;

    /// Stream the local file at `path` into `key` with a public-read policy.
    fn put_file(
        &self,
        key: &str,
        path: &Path,
        content_type: &str,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<RemoteObject>;

    /// Store `body` under `key` with a public-read policy.
    fn put_bytes(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<RemoteObject>;

    /// Unsigned, non-expiring plain-http URL of `key`.
    fn public_url(&self, key: &str) -> String;
}

/// Async reader adapter that reports progress roughly every `total / 1000`
/// bytes handed to the client.
pub struct ProgressReader<R> {
    inner: R,
    sent: u64,
    total: u64,
    step: u64,
    next_report: u64,
    scratch: Vec<u8>,
    sink: Arc<dyn ProgressSink>,
}

impl<R> ProgressReader<R> {
    pub fn new(inner: R, total: u64, sink: Arc<dyn ProgressSink>) -> Self {
        let step = (total / PROGRESS_STEPS).max(1);
        Self { inner, sent: 0, total, step, next_report: step, scratch: Vec::new(), sink }
    }

    /// Largest read that does not cross the next report boundary.
    fn read_limit(&self, capacity: usize) -> usize {
        let remaining_in_step = self.next_report.saturating_sub(self.sent).max(1);
        capacity.min(usize::try_from(remaining_in_step).unwrap_or(usize::MAX))
    }

    fn record(&mut self, n: usize) {
        self.sent += n as u64;
        if self.sent >= self.next_report || self.sent >= self.total {
            self.sink.on_progress(self.sent.min(self.total), self.total);
            while self.next_report <= self.sent {
                self.next_report += self.step;
            }
        }
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for ProgressReader<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        // Keep each read within one step so the callback cadence does not
        // depend on the caller's buffer size.
        let limit = this.read_limit(buf.remaining());
        if limit == 0 {
            return Poll::Ready(Ok(()));
        }
        this.scratch.resize(limit, 0);
        let mut chunk = ReadBuf::new(&mut this.scratch);
        ready!(Pin::new(&mut this.inner).poll_read(cx, &mut chunk))?;
        let n = chunk.filled().len();
        buf.put_slice(chunk.filled());
        if n > 0 {
            this.record(n);
        }
        Poll::Ready(Ok(()))
    }
}
