//! A byte-capped `AsyncRead` wrapper used to enforce `maxBodySize` while a
//! request body is still being read, rather than after it has already been
//! fully buffered.

use futures::io::AsyncRead;
use std::pin::Pin;
use std::task::{Context, Poll};

/// The `io::Error` message `CappedAsyncRead` raises once its cap is
/// crossed, so callers can distinguish "size limit exceeded" from any other
/// I/O failure on the underlying reader.
pub const LIMIT_EXCEEDED: &str = "body size limit exceeded";

/// Wraps another `AsyncRead` and errors with [`LIMIT_EXCEEDED`] as soon as
/// more than `max` bytes have been read from it, without reading (or
/// requiring the caller to read) whatever is left unread on the underlying
/// stream. `max = None` means no cap is enforced.
pub struct CappedAsyncRead<T> {
    inner: T,
    max: Option<usize>,
    bytes_read: usize,
}

impl<T: AsyncRead + Unpin> CappedAsyncRead<T> {
    pub fn new(inner: T, max: Option<usize>) -> CappedAsyncRead<T> {
        CappedAsyncRead {
            inner,
            max,
            bytes_read: 0,
        }
    }
}

impl<T: AsyncRead + Unpin> AsyncRead for CappedAsyncRead<T> {
    fn poll_read(mut self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut [u8]) -> Poll<std::io::Result<usize>> {
        // `T: Unpin` and every field of `CappedAsyncRead<T>` is itself
        // `Unpin`, so this struct is `Unpin` too and a plain `&mut` deref is
        // enough to reach the inner reader -- no structural pinning needed.
        let this = &mut *self;
        let n = match Pin::new(&mut this.inner).poll_read(cx, buf) {
            Poll::Ready(Ok(n)) => n,
            Poll::Ready(Err(e)) => return Poll::Ready(Err(e)),
            Poll::Pending => return Poll::Pending,
        };

        this.bytes_read += n;
        if let Some(max) = this.max {
            if this.bytes_read > max {
                return Poll::Ready(Err(std::io::Error::new(std::io::ErrorKind::Other, LIMIT_EXCEEDED)));
            }
        }

        Poll::Ready(Ok(n))
    }
}
