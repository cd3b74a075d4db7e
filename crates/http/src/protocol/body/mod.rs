//! Request and response bodies.
//!
//! A [`Body`] knows its size (when it can), its MIME type and where its bytes come from:
//!
//! - nothing, or an in-memory [`Bytes`] buffer
//! - a pull source: a supplier opening an [`io::Read`] when the body is consumed
//! - a push source: a producer writing into an [`io::Write`] sink
//!
//! Push sources are consumed either directly with [`Body::write_to`], or as a reader through
//! [`Body::into_reader`], which runs the producer on a worker thread behind a bounded
//! [`pipe`](PipeReader) so the payload is never buffered as a whole.
//!
//! Async transports can turn any body into an `http_body::Body` with
//! [`Body::into_channel_body`].

mod channel;
mod pipe;

pub use channel::ChannelBody;
pub use pipe::{BUFFER_SIZE, PipeReader, PipeWriter};

use crate::protocol::BodyError;
use bytes::Bytes;
use mime::Mime;
use std::collections::HashMap;
use std::fmt;
use std::io::{self, Cursor, Read, Write};

type Supplier = Box<dyn FnOnce() -> io::Result<Box<dyn Read + Send>> + Send>;
type Producer = Box<dyn FnOnce(&mut dyn Write) -> io::Result<()> + Send>;

pub struct Body {
    kind: Kind,
    size: Option<u64>,
    mime: Mime,
}

enum Kind {
    Empty,
    Once(Bytes),
    Reader(Supplier),
    Producer(Producer),
}

impl Body {
    pub fn empty() -> Self {
        Self { kind: Kind::Empty, size: Some(0), mime: mime::APPLICATION_OCTET_STREAM }
    }

    pub fn bytes(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Self::empty();
        }
        Self { size: Some(bytes.len() as u64), kind: Kind::Once(bytes), mime: mime::APPLICATION_OCTET_STREAM }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::bytes(text.into()).with_mime(mime::TEXT_PLAIN)
    }

    pub fn html(html: impl Into<String>) -> Self {
        Self::bytes(html.into()).with_mime(mime::TEXT_HTML)
    }

    pub fn urlencoded(pairs: &HashMap<String, String>) -> Self {
        // a flat string map always serializes
        let encoded = serde_urlencoded::to_string(pairs).unwrap_or_default();
        Self::bytes(encoded).with_mime(mime::APPLICATION_WWW_FORM_URLENCODED)
    }

    /// A pull-sourced body; `supplier` is called once, when the body is consumed.
    pub fn reader<F, R>(size: Option<u64>, supplier: F) -> Self
    where
        F: FnOnce() -> io::Result<R> + Send + 'static,
        R: Read + Send + 'static,
    {
        let supplier: Supplier = Box::new(move || supplier().map(|r| Box::new(r) as Box<dyn Read + Send>));
        Self { kind: Kind::Reader(supplier), size, mime: mime::APPLICATION_OCTET_STREAM }
    }

    /// A push-sourced body; `producer` writes the whole payload into the sink it is given.
    pub fn producer<F>(size: Option<u64>, producer: F) -> Self
    where
        F: FnOnce(&mut dyn Write) -> io::Result<()> + Send + 'static,
    {
        Self { kind: Kind::Producer(Box::new(producer)), size, mime: mime::APPLICATION_OCTET_STREAM }
    }

    /// The default error page served for a failed request.
    pub fn error_page(status: http::StatusCode) -> Self {
        let code = status.as_u16();
        let side = if status.is_server_error() { "Server" } else { "Client" };
        let reason = status.canonical_reason().unwrap_or("");
        Self::html(format!(
            "<!DOCTYPE html><html lang=\"en\"><head><title>{code}</title><meta charset=\"UTF-8\"></head>\
             <body><h1>{code}</h1><p>{reason}</p><footer>{side} Error</footer></body></html>"
        ))
    }

    pub fn with_mime(mut self, mime: Mime) -> Self {
        self.mime = mime;
        self
    }

    pub fn with_size(mut self, size: Option<u64>) -> Self {
        self.size = size;
        self
    }

    /// Size in bytes, `None` when unknown.
    #[inline]
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    #[inline]
    pub fn mime(&self) -> &Mime {
        &self.mime
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == Some(0)
    }

    /// `true` if the body is produced by pushing into a sink.
    #[inline]
    pub fn is_pushed(&self) -> bool {
        matches!(self.kind, Kind::Producer(_))
    }

    /// Opens the body for reading. Push-sourced bodies start their producer on a worker thread.
    pub fn into_reader(self) -> io::Result<BodyReader> {
        match self.kind {
            Kind::Empty => Ok(BodyReader::Buffered(Cursor::new(Bytes::new()))),
            Kind::Once(bytes) => Ok(BodyReader::Buffered(Cursor::new(bytes))),
            Kind::Reader(supplier) => supplier().map(BodyReader::Stream),
            Kind::Producer(producer) => PipeReader::spawn(move |w| producer(w)).map(BodyReader::Pipe),
        }
    }

    /// Writes the whole body into `sink`, returning the number of bytes written.
    ///
    /// Push-sourced bodies write straight into the sink, without a pipe.
    pub fn write_to(self, sink: &mut dyn Write) -> io::Result<u64> {
        let written = match self.kind {
            Kind::Empty => 0,
            Kind::Once(bytes) => {
                sink.write_all(&bytes)?;
                bytes.len() as u64
            }
            Kind::Reader(supplier) => {
                let mut reader = supplier()?;
                io::copy(&mut reader, sink)?
            }
            Kind::Producer(producer) => {
                let mut counting = CountingWriter { inner: sink, count: 0 };
                producer(&mut counting)?;
                counting.count
            }
        };
        sink.flush()?;
        Ok(written)
    }

    pub fn into_bytes(self) -> io::Result<Bytes> {
        match self.kind {
            Kind::Empty => Ok(Bytes::new()),
            Kind::Once(bytes) => Ok(bytes),
            _ => {
                let capacity = self.size.and_then(|s| usize::try_from(s).ok()).unwrap_or(0);
                let mut buf = Vec::with_capacity(capacity);
                self.write_to(&mut buf)?;
                Ok(Bytes::from(buf))
            }
        }
    }

    pub fn into_text(self) -> Result<String, BodyError> {
        let bytes = self.into_bytes()?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    pub fn into_urlencoded(self) -> Result<HashMap<String, String>, BodyError> {
        let bytes = self.into_bytes()?;
        Ok(serde_urlencoded::from_bytes(&bytes)?)
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            Kind::Empty => "empty",
            Kind::Once(_) => "once",
            Kind::Reader(_) => "reader",
            Kind::Producer(_) => "producer",
        };
        f.debug_struct("Body").field("kind", &kind).field("size", &self.size).field("mime", &self.mime).finish()
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<String> for Body {
    fn from(value: String) -> Self {
        Body::text(value)
    }
}

impl From<&'static str> for Body {
    fn from(value: &'static str) -> Self {
        Body::bytes(Bytes::from_static(value.as_bytes())).with_mime(mime::TEXT_PLAIN)
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Body::bytes(bytes)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::bytes(bytes)
    }
}

impl From<()> for Body {
    fn from(_: ()) -> Self {
        Self::empty()
    }
}

/// A readable, opened [`Body`].
///
/// Readers backed by a pipe should be finished with [`BodyReader::close`], which is the only
/// way to observe an error raised by the producer after the last byte was read.
pub enum BodyReader {
    Buffered(Cursor<Bytes>),
    Stream(Box<dyn Read + Send>),
    Pipe(PipeReader),
}

impl fmt::Debug for BodyReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BodyReader::Buffered(cursor) => f.debug_tuple("Buffered").field(&cursor.get_ref().len()).finish(),
            BodyReader::Stream(_) => f.write_str("Stream"),
            BodyReader::Pipe(pipe) => f.debug_tuple("Pipe").field(pipe).finish(),
        }
    }
}

impl BodyReader {
    pub fn close(self) -> io::Result<()> {
        match self {
            BodyReader::Pipe(pipe) => pipe.close(),
            BodyReader::Buffered(_) | BodyReader::Stream(_) => Ok(()),
        }
    }
}

impl Read for BodyReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            BodyReader::Buffered(cursor) => cursor.read(buf),
            BodyReader::Stream(reader) => reader.read(buf),
            BodyReader::Pipe(pipe) => pipe.read(buf),
        }
    }
}

struct CountingWriter<'a> {
    inner: &'a mut dyn Write,
    count: u64,
}

impl Write for CountingWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.count += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
