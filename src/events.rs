//! Event frames and the injected event sink.
//!
//! The orchestrator reports progress through an abstract [`EventSink`]
//! rather than a concrete transport, so unit tests can capture frames in
//! memory and hosts can forward them over SSE, WebSocket, or anything else
//! that carries discrete JSON frames.
//!
//! Exactly one terminal frame ([`EventFrame::Error`] or
//! [`EventFrame::Complete`]) is written per request; any number of
//! `Progress` frames (including zero) may precede it, with monotonically
//! increasing percentages. Nothing is written after the terminal frame.

use crate::document::FinalDocument;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tokio::sync::mpsc;

/// One discrete event frame.
///
/// Serialises to the wire shape the editor frontend expects:
/// `{"type":"progress","step":"extracting","progress":10,"label":"…"}` and
/// so on, ready for line-delimited framing by the host transport.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EventFrame {
    Progress {
        step: String,
        progress: u8,
        label: String,
    },
    /// Terminal failure frame. Carries only the user-facing message;
    /// operator detail goes to logs, never onto the wire.
    Error { error: String },
    /// Terminal success frame carrying the finished document.
    Complete {
        content: FinalDocument,
        step: String,
        progress: u8,
        label: String,
    },
}

impl EventFrame {
    pub fn progress(step: &str, progress: u8, label: impl Into<String>) -> Self {
        EventFrame::Progress {
            step: step.to_string(),
            progress,
            label: label.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        EventFrame::Error {
            error: message.into(),
        }
    }

    pub fn complete(content: FinalDocument) -> Self {
        EventFrame::Complete {
            content,
            step: "complete".to_string(),
            progress: 100,
            label: "Conversion complete".to_string(),
        }
    }

    /// Whether this frame ends the event sequence for a request.
    pub fn is_terminal(&self) -> bool {
        matches!(self, EventFrame::Error { .. } | EventFrame::Complete { .. })
    }
}

/// Destination for event frames, injected into the orchestrator.
///
/// `send` is async because real sinks write to a network transport; the
/// pipeline awaits each write so frames are delivered in stage order.
/// Implementations must not fail the pipeline — a sink that loses its
/// client should swallow the write, not panic.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn send(&self, frame: EventFrame);
}

/// An in-memory sink that buffers every frame.
///
/// Useful for tests and for hosts that want to inspect the full event
/// sequence after a run.
#[derive(Default)]
pub struct MemorySink {
    frames: Mutex<Vec<EventFrame>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all frames received so far.
    pub fn frames(&self) -> Vec<EventFrame> {
        self.frames
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl EventSink for MemorySink {
    async fn send(&self, frame: EventFrame) {
        self.frames
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(frame);
    }
}

/// A sink that forwards frames into a tokio channel.
///
/// The receiving half can be wrapped in
/// `tokio_stream::wrappers::UnboundedReceiverStream` to drive an SSE or
/// WebSocket response. A closed receiver drops frames silently: the
/// pipeline finishes its run even if the client went away.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<EventFrame>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<EventFrame>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl EventSink for ChannelSink {
    async fn send(&self, frame: EventFrame) {
        let _ = self.tx.send(frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_stream::{wrappers::UnboundedReceiverStream, StreamExt};

    #[test]
    fn progress_frame_wire_shape() {
        let frame = EventFrame::progress("extracting", 10, "Extracting document content");
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["type"], "progress");
        assert_eq!(json["step"], "extracting");
        assert_eq!(json["progress"], 10);
    }

    #[test]
    fn error_frame_wire_shape() {
        let frame = EventFrame::error("No file provided");
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["error"], "No file provided");
        assert!(frame.is_terminal());
    }

    #[test]
    fn complete_frame_carries_document() {
        let frame = EventFrame::complete(FinalDocument::new(vec![], vec![]));
        assert!(frame.is_terminal());
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["type"], "complete");
        assert_eq!(json["progress"], 100);
        assert_eq!(json["content"]["type"], "doc");
    }

    #[tokio::test]
    async fn memory_sink_buffers_in_order() {
        let sink = MemorySink::new();
        sink.send(EventFrame::progress("extracting", 10, "a")).await;
        sink.send(EventFrame::progress("converting", 60, "b")).await;
        let frames = sink.frames();
        assert_eq!(frames.len(), 2);
        assert!(!frames[0].is_terminal());
    }

    #[tokio::test]
    async fn channel_sink_feeds_a_stream() {
        let (sink, rx) = ChannelSink::new();
        sink.send(EventFrame::error("boom")).await;
        drop(sink);

        let frames: Vec<EventFrame> = UnboundedReceiverStream::new(rx).collect().await;
        assert_eq!(frames, vec![EventFrame::error("boom")]);
    }

    #[tokio::test]
    async fn channel_sink_survives_dropped_receiver() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        sink.send(EventFrame::progress("extracting", 10, "x")).await;
    }
}
