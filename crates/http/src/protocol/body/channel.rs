use super::{BUFFER_SIZE, Body, Kind};
use bytes::Bytes;
use futures::channel::mpsc;
use futures::{SinkExt, StreamExt, executor};
use http_body::{Frame, SizeHint};
use std::io::{self, Read};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::thread;
use tracing::{error, trace};

const CHANNEL_CAPACITY: usize = 8;

/// An [`http_body::Body`] view of a [`Body`], for async transports.
///
/// In-memory bodies are yielded as a single frame. Streamed bodies are read on a blocking
/// thread and forwarded through a bounded channel, so a slow consumer stalls the reader
/// instead of letting chunks pile up.
#[derive(Debug)]
pub struct ChannelBody {
    source: Source,
    size: Option<u64>,
}

#[derive(Debug)]
enum Source {
    Once(Option<Bytes>),
    Stream(mpsc::Receiver<io::Result<Bytes>>),
}

impl Body {
    /// Converts this body into an [`http_body::Body`].
    ///
    /// Fails only if the blocking reader thread cannot be started.
    pub fn into_channel_body(self) -> io::Result<ChannelBody> {
        let size = self.size;
        let source = match self.kind {
            Kind::Empty => Source::Once(None),
            Kind::Once(bytes) => Source::Once(Some(bytes)),
            kind @ (Kind::Reader(_) | Kind::Producer(_)) => {
                let body = Body { kind, size, mime: self.mime };
                Source::Stream(spawn_reader(body)?)
            }
        };
        Ok(ChannelBody { source, size })
    }
}

impl ChannelBody {
    /// A body without content.
    pub fn empty() -> Self {
        Self { source: Source::Once(None), size: Some(0) }
    }
}

fn spawn_reader(body: Body) -> io::Result<mpsc::Receiver<io::Result<Bytes>>> {
    let (mut sender, receiver) = mpsc::channel(CHANNEL_CAPACITY);

    thread::Builder::new().name("body-channel".into()).spawn(move || {
        let mut reader = match body.into_reader() {
            Ok(reader) => reader,
            Err(e) => {
                // receiver gone means nobody is left to tell
                let _ = executor::block_on(sender.send(Err(e)));
                return;
            }
        };

        let mut buf = vec![0u8; BUFFER_SIZE];
        let failure = loop {
            match reader.read(&mut buf) {
                Ok(0) => break None,
                Ok(n) => {
                    if executor::block_on(sender.send(Ok(Bytes::copy_from_slice(&buf[..n])))).is_err() {
                        trace!("body channel receiver dropped, stop forwarding");
                        break None;
                    }
                }
                Err(e) => break Some(e),
            }
        };

        let closed = reader.close();
        let Some(e) = failure.or(closed.err()) else {
            return;
        };
        if executor::block_on(sender.send(Err(e))).is_err() {
            error!("body channel receiver dropped before the body error was delivered");
        }
    })?;

    Ok(receiver)
}

impl http_body::Body for ChannelBody {
    type Data = Bytes;
    type Error = io::Error;

    fn poll_frame(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        match &mut this.source {
            Source::Once(bytes) => Poll::Ready(bytes.take().map(|bytes| Ok(Frame::data(bytes)))),
            Source::Stream(receiver) => match receiver.poll_next_unpin(cx) {
                Poll::Ready(Some(Ok(bytes))) => Poll::Ready(Some(Ok(Frame::data(bytes)))),
                Poll::Ready(Some(Err(e))) => Poll::Ready(Some(Err(e))),
                Poll::Ready(None) => Poll::Ready(None),
                Poll::Pending => Poll::Pending,
            },
        }
    }

    fn is_end_stream(&self) -> bool {
        matches!(self.source, Source::Once(None))
    }

    fn size_hint(&self) -> SizeHint {
        match self.size {
            Some(size) => SizeHint::with_exact(size),
            None => SizeHint::new(),
        }
    }
}
