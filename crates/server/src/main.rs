//! `palaver` - turn-state classification over NDJSON stdin/stdout.
//!
//! Reads `{"text", "requestId"}` requests one per line, classifies each
//! fragment as COMPLETE / CONTINUE / INTERRUPT, and writes result and
//! diagnostic records back to stdout. Fragments are processed strictly
//! one at a time in arrival order.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal::unix::{signal, SignalKind};
use tracing_subscriber::EnvFilter;

use palaver_embed::{default_model_dir, OnnxEmbedderLoader};
use palaver_engine::{DecisionConfig, TurnEngine};
use palaver_events::{DiagnosticSinkRef, OutboundMessage};
use palaver_server::{handle_line, LineSink};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // stdout carries the protocol; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,palaver=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = DecisionConfig::from_env();
    let model_dir = default_model_dir();
    tracing::info!(?config, model_dir = %model_dir.display(), "starting turn classification service");

    let sink = Arc::new(LineSink::new(std::io::stdout()));
    let loader = OnnxEmbedderLoader::new(model_dir);
    let mut engine = TurnEngine::new(Box::new(loader), config, sink.clone() as DiagnosticSinkRef);

    sink.send(&OutboundMessage::Ready);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut sigterm = signal(SignalKind::terminate())?;

    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => handle_line(&mut engine, &sink, &line),
                Ok(None) => {
                    tracing::info!("stdin closed, exiting");
                    break;
                }
                Err(e) => {
                    sink.send(&OutboundMessage::Error {
                        error: format!("failed to read request line: {e}"),
                    });
                }
            },
            _ = tokio::signal::ctrl_c() => {
                sink.send(&OutboundMessage::Shutdown {
                    message: "SIGINT".to_string(),
                });
                break;
            }
            _ = sigterm.recv() => {
                sink.send(&OutboundMessage::Shutdown {
                    message: "SIGTERM".to_string(),
                });
                break;
            }
        }
    }

    Ok(())
}
