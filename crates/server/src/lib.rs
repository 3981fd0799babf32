//! Line-protocol glue between stdin/stdout and the decision engine.
//!
//! One JSON request per line in, one JSON record per line out. The sink is
//! also the engine's diagnostic sink: diagnostics map onto `info`, `debug`
//! and `error` wire records so every observability event shares the one
//! output channel.

use std::io::Write;
use std::sync::Mutex;

use palaver_engine::TurnEngine;
use palaver_events::{ClassifyRequest, ClassifyResult, Diagnostic, DiagnosticSink, OutboundMessage};

/// Serializes outbound records as NDJSON onto a writer.
///
/// Writes are line-atomic behind a mutex and flushed immediately: the peer
/// reads the stream incrementally and must never wait on buffering.
pub struct LineSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> LineSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Write one record. Transport write failures are logged, not
    /// propagated: a broken pipe must not take down classification.
    pub fn send(&self, message: &OutboundMessage) {
        let line = match serde_json::to_string(message) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize outbound record");
                return;
            }
        };
        let Ok(mut writer) = self.writer.lock() else {
            return;
        };
        if writeln!(writer, "{line}")
            .and_then(|_| writer.flush())
            .is_err()
        {
            tracing::warn!("failed to write outbound record");
        }
    }
}

impl<W: Write + Send> DiagnosticSink for LineSink<W> {
    fn emit(&self, diagnostic: Diagnostic) {
        self.send(&OutboundMessage::from(diagnostic));
    }
}

/// Process one input line.
///
/// Blank lines and blank-text requests are silently skipped. Malformed
/// lines produce an `error` record and the loop carries on; every
/// non-empty fragment yields exactly one `result` record.
pub fn handle_line<W: Write + Send>(engine: &mut TurnEngine, sink: &LineSink<W>, line: &str) {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return;
    }

    let request: ClassifyRequest = match serde_json::from_str(trimmed) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(error = %e, "malformed request line");
            sink.send(&OutboundMessage::Error {
                error: format!("invalid request: {e}"),
            });
            return;
        }
    };

    if request.text.trim().is_empty() {
        tracing::debug!("skipping empty fragment");
        return;
    }

    let status = engine.classify(&request.text);
    tracing::debug!(status = status.as_str(), "fragment classified");

    sink.send(&OutboundMessage::Result {
        request_id: request.request_id,
        result: ClassifyResult { status },
    });
}
