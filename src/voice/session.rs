//! Recording session lifecycle
//!
//! A [`RecordingSession`] owns an open capture stream and the chunks it has
//! produced. The stream is stopped exactly once: by [`RecordingSession::close`]
//! or, if the session is abandoned, when it is dropped.

use async_trait::async_trait;

use crate::Result;

/// Default MIME type for captured audio
pub const DEFAULT_MIME_TYPE: &str = "audio/webm";

/// One complete recording ready for verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioPayload {
    /// Encoded audio bytes
    pub data: Vec<u8>,

    /// MIME type of `data`
    pub mime_type: String,
}

impl AudioPayload {
    /// Create a payload, falling back to the default MIME type when blank
    #[must_use]
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        let mime_type = mime_type.into();
        let mime_type = if mime_type.trim().is_empty() {
            DEFAULT_MIME_TYPE.to_string()
        } else {
            mime_type
        };
        Self { data, mime_type }
    }

    /// Payload size in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether no audio was captured
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A platform microphone
#[async_trait]
pub trait Microphone: Send + Sync {
    /// Request access and open a live capture stream
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` when access is refused and `Device` when
    /// the stream cannot be started
    async fn open(&self) -> Result<Box<dyn CaptureStream>>;
}

/// A live capture stream holding the input device
pub trait CaptureStream: Send {
    /// MIME type of the chunks this stream produces
    fn mime_type(&self) -> &str;

    /// Stop capture, release the device and return any remaining chunks
    ///
    /// # Errors
    ///
    /// Returns error if the device fails while stopping; the device is
    /// released either way
    fn stop(&mut self) -> Result<Vec<Vec<u8>>>;
}

/// Exclusive ownership of one open capture stream
pub struct RecordingSession {
    stream: Option<Box<dyn CaptureStream>>,
    mime_type: String,
    chunks: Vec<Vec<u8>>,
}

impl RecordingSession {
    /// Open a session on the given microphone
    ///
    /// # Errors
    ///
    /// Returns error if the microphone cannot be opened
    pub async fn open(microphone: &dyn Microphone) -> Result<Self> {
        let stream = microphone.open().await?;
        Ok(Self::from_stream(stream))
    }

    /// Wrap an already open stream
    #[must_use]
    pub fn from_stream(stream: Box<dyn CaptureStream>) -> Self {
        let mime_type = stream.mime_type().to_string();
        tracing::debug!(mime_type = %mime_type, "recording session opened");
        Self {
            stream: Some(stream),
            mime_type,
            chunks: Vec::new(),
        }
    }

    /// Add a chunk of captured audio; empty chunks are ignored
    pub fn append_chunk(&mut self, chunk: Vec<u8>) {
        if !chunk.is_empty() {
            self.chunks.push(chunk);
        }
    }

    /// Number of non-empty chunks collected so far
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Stop capture and assemble the payload
    ///
    /// Returns `None` when nothing was captured.
    ///
    /// # Errors
    ///
    /// Returns error if the device fails while stopping; the device has
    /// been released regardless
    pub fn close(mut self) -> Result<Option<AudioPayload>> {
        if let Some(mut stream) = self.stream.take() {
            for chunk in stream.stop()? {
                self.append_chunk(chunk);
            }
        }

        if self.chunks.is_empty() {
            tracing::debug!("recording session closed with no audio");
            return Ok(None);
        }

        let data = std::mem::take(&mut self.chunks).concat();
        tracing::debug!(bytes = data.len(), "recording session closed");
        Ok(Some(AudioPayload::new(data, std::mem::take(&mut self.mime_type))))
    }
}

impl Drop for RecordingSession {
    fn drop(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.stop() {
                tracing::warn!(error = %e, "failed to stop abandoned capture stream");
            } else {
                tracing::debug!("abandoned recording session released");
            }
        }
    }
}

impl std::fmt::Debug for RecordingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingSession")
            .field("open", &self.stream.is_some())
            .field("mime_type", &self.mime_type)
            .field("chunks", &self.chunks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct CountingStream {
        stops: Arc<AtomicUsize>,
        tail: Vec<Vec<u8>>,
    }

    impl CaptureStream for CountingStream {
        fn mime_type(&self) -> &str {
            "audio/wav"
        }

        fn stop(&mut self) -> Result<Vec<Vec<u8>>> {
            self.stops.fetch_add(1, Ordering::SeqCst);
            Ok(std::mem::take(&mut self.tail))
        }
    }

    fn session(tail: Vec<Vec<u8>>) -> (RecordingSession, Arc<AtomicUsize>) {
        let stops = Arc::new(AtomicUsize::new(0));
        let stream = CountingStream {
            stops: Arc::clone(&stops),
            tail,
        };
        (RecordingSession::from_stream(Box::new(stream)), stops)
    }

    #[test]
    fn test_close_assembles_chunks() {
        let (mut session, stops) = session(vec![vec![5, 6]]);
        session.append_chunk(vec![1, 2]);
        session.append_chunk(Vec::new());
        session.append_chunk(vec![3, 4]);
        assert_eq!(session.chunk_count(), 2);

        let payload = session.close().unwrap().unwrap();
        assert_eq!(payload.data, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(payload.mime_type, "audio/wav");
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_close_without_audio() {
        let (session, stops) = session(vec![Vec::new()]);
        assert!(session.close().unwrap().is_none());
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_releases_stream_once() {
        let (session, stops) = session(Vec::new());
        drop(session);
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_blank_mime_type_defaults() {
        let payload = AudioPayload::new(vec![1], " ");
        assert_eq!(payload.mime_type, DEFAULT_MIME_TYPE);
        assert_eq!(payload.len(), 1);
    }
}
