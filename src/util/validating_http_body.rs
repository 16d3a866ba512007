use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_core::{ready, Stream};
use hyper::Body;
use pin_project_lite::pin_project;
use sha1::{Digest, Sha1};
use tracing::trace;

/// A checksum the server announced for a download
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checksum {
    Sha1([u8; 20]),
    Md5([u8; 16]),
}
impl Checksum {
    pub fn algorithm(&self) -> &'static str {
        match self {
            Checksum::Sha1(_) => "SHA1",
            Checksum::Md5(_) => "MD5",
        }
    }
}

/// hash state for one expected checksum, fed chunk by chunk
enum RunningHash {
    Sha1(Sha1),
    Md5(md5::Context),
}
impl RunningHash {
    fn for_checksum(checksum: &Checksum) -> RunningHash {
        match checksum {
            Checksum::Sha1(_) => RunningHash::Sha1(Sha1::new()),
            Checksum::Md5(_) => RunningHash::Md5(md5::Context::new()),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            RunningHash::Sha1(hasher) => hasher.update(data),
            RunningHash::Md5(context) => context.consume(data),
        }
    }

    fn finish(self) -> Checksum {
        match self {
            RunningHash::Sha1(hasher) => Checksum::Sha1(hasher.finalize().into()),
            RunningHash::Md5(context) => Checksum::Md5(context.compute().0),
        }
    }
}

pin_project! {
    /// Passes the chunks of a download through unchanged while hashing them. When the body ends,
    ///  every expected checksum is compared, and the first mismatch becomes a final error item.
    ///  After an error the upstream body is not polled again.
    pub struct ValidatingHttpBody {
        #[pin]
        http_body: Body,
        pending: Vec<(Checksum, RunningHash)>,
        is_failed: bool,
    }
}
impl ValidatingHttpBody {
    pub fn new(http_body: Body, expected: Vec<Checksum>) -> ValidatingHttpBody {
        ValidatingHttpBody {
            http_body,
            pending: expected.into_iter()
                .map(|c| (c, RunningHash::for_checksum(&c)))
                .collect(),
            is_failed: false,
        }
    }
}

impl Stream for ValidatingHttpBody {
    type Item = anyhow::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.is_failed {
            return Poll::Ready(Some(Err(anyhow::anyhow!("download already failed"))));
        }

        let this = self.project();
        match ready!(this.http_body.poll_next(cx)) {
            Some(Ok(data)) => {
                for (_, hash) in this.pending.iter_mut() {
                    hash.update(&data);
                }
                Poll::Ready(Some(Ok(data)))
            }
            Some(Err(e)) => {
                *this.is_failed = true;
                Poll::Ready(Some(Err(e.into())))
            }
            None => {
                for (expected, hash) in std::mem::take(this.pending) {
                    trace!("validating {} checksum", expected.algorithm());
                    if hash.finish() != expected {
                        *this.is_failed = true;
                        return Poll::Ready(Some(Err(anyhow::anyhow!("{} checksum mismatch", expected.algorithm()))));
                    }
                }
                Poll::Ready(None)
            }
        }
    }
}
