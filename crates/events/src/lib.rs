//! Wire contracts for the classification line protocol.
//!
//! This crate defines the formal DTOs for every record that crosses the
//! stdin/stdout boundary, plus the typed diagnostic channel the engine
//! uses to surface events without knowing about the transport.

mod diagnostic;

pub use diagnostic::{Diagnostic, DiagnosticSink, DiagnosticSinkRef, InMemorySink, NullSink};

use palaver_turn::TurnStatus;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inbound classification request, one JSON object per line.
///
/// `requestId` is opaque: any JSON value, echoed back verbatim on the
/// matching result line. Missing means `null`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyRequest {
    pub text: String,
    #[serde(rename = "requestId", default)]
    pub request_id: Value,
}

/// Payload of a result line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyResult {
    pub status: TurnStatus,
}

/// Outbound line-protocol records, discriminated by `type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutboundMessage {
    /// Emitted once at startup, after the engine is constructed.
    Ready,
    /// One per non-empty request.
    Result {
        #[serde(rename = "requestId")]
        request_id: Value,
        result: ClassifyResult,
    },
    /// Operational notices, e.g. the semantic backend failing to load.
    Info { message: String },
    /// Similarity scores per semantic evaluation, for threshold tuning.
    Debug { message: String },
    /// Malformed request or unexpected fault; the loop continues.
    Error { error: String },
    /// Emitted on a termination signal, right before exit.
    Shutdown { message: String },
}

/// How engine diagnostics appear on the wire.
impl From<Diagnostic> for OutboundMessage {
    fn from(diagnostic: Diagnostic) -> Self {
        match diagnostic {
            Diagnostic::ModelLoadFailed { message } => OutboundMessage::Info { message },
            Diagnostic::SemanticScores {
                sim_complete,
                sim_incomplete,
                text,
                ..
            } => OutboundMessage::Debug {
                message: format!(
                    "Sentence detection scores: complete={sim_complete:.4}, \
                     incomplete={sim_incomplete:.4}, text='{text}'"
                ),
            },
            Diagnostic::ClassifyError { message } => OutboundMessage::Error { error: message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_deserialize() {
        let req: ClassifyRequest =
            serde_json::from_str(r#"{"text": "hello there", "requestId": 7}"#).unwrap();
        assert_eq!(req.text, "hello there");
        assert_eq!(req.request_id, json!(7));
    }

    #[test]
    fn test_request_id_defaults_to_null() {
        let req: ClassifyRequest = serde_json::from_str(r#"{"text": "hi"}"#).unwrap();
        assert!(req.request_id.is_null());
    }

    #[test]
    fn test_request_id_accepts_strings() {
        let req: ClassifyRequest =
            serde_json::from_str(r#"{"text": "hi", "requestId": "abc-123"}"#).unwrap();
        assert_eq!(req.request_id, json!("abc-123"));
    }

    #[test]
    fn test_result_line_shape() {
        let msg = OutboundMessage::Result {
            request_id: json!(3),
            result: ClassifyResult {
                status: TurnStatus::Complete,
            },
        };
        let line = serde_json::to_string(&msg).unwrap();
        let value: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["type"], "result");
        assert_eq!(value["requestId"], 3);
        assert_eq!(value["result"]["status"], "COMPLETE");
    }

    #[test]
    fn test_ready_line_shape() {
        let line = serde_json::to_string(&OutboundMessage::Ready).unwrap();
        assert_eq!(line, r#"{"type":"ready"}"#);
    }

    #[test]
    fn test_load_failure_maps_to_info() {
        let message = OutboundMessage::from(Diagnostic::ModelLoadFailed {
            message: "no model".to_string(),
        });
        let value: Value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["type"], "info");
        assert_eq!(value["message"], "no model");
    }

    #[test]
    fn test_scores_map_to_debug_with_original_wording() {
        let message = OutboundMessage::from(Diagnostic::SemanticScores {
            sim_complete: 0.9123,
            sim_incomplete: 0.1,
            text: "are you there".to_string(),
            ts_ms: 0,
        });
        let OutboundMessage::Debug { message } = message else {
            panic!("expected a debug record");
        };
        assert!(message.starts_with("Sentence detection scores:"));
        assert!(message.contains("complete=0.9123"));
        assert!(message.contains("incomplete=0.1000"));
        assert!(message.contains("text='are you there'"));
    }

    #[test]
    fn test_classify_error_maps_to_error() {
        let message = OutboundMessage::from(Diagnostic::ClassifyError {
            message: "inference fault".to_string(),
        });
        let value: Value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(value["error"], "inference fault");
    }
}
