//! A scripted in-process "compiler" for driver tests.
//!
//! Runs the child side of the protocol over an in-memory duplex: it
//! answers the version handshake itself and delegates every other
//! inbound message to the test's script, writing whatever outbound
//! messages the script returns. Each spawner call builds a fresh
//! child, so driver resets are exercised for real.

use crate::child::Connection;
use crate::codec;
use crate::driver::Spawner;
use futures::future::FutureExt;
use proto_sass::{self as proto, inbound_message, outbound_message};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

pub(crate) const PROTOCOL_VERSION: &str = "2.7.1";

type Script =
    Arc<dyn Fn(inbound_message::Message) -> Vec<proto::OutboundMessage> + Send + Sync>;

pub(crate) fn spawner(
    script: impl Fn(inbound_message::Message) -> Vec<proto::OutboundMessage> + Send + Sync + 'static,
) -> Spawner {
    spawner_with_versions(vec![PROTOCOL_VERSION.to_string()], script)
}

/// Like [`spawner`], but each successive child reports the next
/// protocol version in the list (the last one repeating).
pub(crate) fn spawner_with_versions(
    versions: Vec<String>,
    script: impl Fn(inbound_message::Message) -> Vec<proto::OutboundMessage> + Send + Sync + 'static,
) -> Spawner {
    assert!(!versions.is_empty());
    let script: Script = Arc::new(script);
    let spawns = Arc::new(AtomicUsize::new(0));

    Box::new(move || {
        let script = script.clone();
        let spawn = spawns.fetch_add(1, Ordering::SeqCst);
        let version = versions[spawn.min(versions.len() - 1)].clone();
        async move {
            let (host, child) = tokio::io::duplex(1 << 16);
            tokio::spawn(run_child(child, version, script));
            let (reader, writer) = tokio::io::split(host);
            Ok(Connection::from_streams(reader, writer))
        }
        .boxed()
    })
}

async fn run_child(stream: tokio::io::DuplexStream, version: String, script: Script) {
    let (mut reader, mut writer) = tokio::io::split(stream);

    while let Ok(Some(message)) =
        codec::decode_message::<proto::InboundMessage, _>(&mut reader).await
    {
        let Some(message) = message.message else {
            continue;
        };
        let replies = match message {
            inbound_message::Message::VersionRequest(request) => {
                vec![version_response(request.id, &version)]
            }
            other => script(other),
        };
        for reply in replies {
            if writer
                .write_all(&codec::encode_message(&reply))
                .await
                .is_err()
            {
                return;
            }
        }
    }
}

pub(crate) fn outbound(message: outbound_message::Message) -> proto::OutboundMessage {
    proto::OutboundMessage {
        message: Some(message),
    }
}

fn version_response(id: u32, protocol_version: &str) -> proto::OutboundMessage {
    outbound(outbound_message::Message::VersionResponse(
        outbound_message::VersionResponse {
            id,
            protocol_version: protocol_version.to_string(),
            compiler_version: "1.99.0".to_string(),
            implementation_version: "1.99.0".to_string(),
            implementation_name: "mock-sass".to_string(),
        },
    ))
}

pub(crate) fn success(compilation_id: u32, css: &str) -> proto::OutboundMessage {
    outbound(outbound_message::Message::CompileResponse(
        outbound_message::CompileResponse {
            id: compilation_id,
            result: Some(outbound_message::compile_response::Result::Success(
                outbound_message::compile_response::CompileSuccess {
                    css: css.to_string(),
                    source_map: String::new(),
                },
            )),
            loaded_urls: vec![],
        },
    ))
}

pub(crate) fn failure(compilation_id: u32, message: &str) -> proto::OutboundMessage {
    outbound(outbound_message::Message::CompileResponse(
        outbound_message::CompileResponse {
            id: compilation_id,
            result: Some(outbound_message::compile_response::Result::Failure(
                outbound_message::compile_response::CompileFailure {
                    message: message.to_string(),
                    span: None,
                    stack_trace: String::new(),
                    formatted: String::new(),
                },
            )),
            loaded_urls: vec![],
        },
    ))
}

pub(crate) fn warning(compilation_id: u32, message: &str) -> proto::OutboundMessage {
    outbound(outbound_message::Message::LogEvent(
        outbound_message::LogEvent {
            compilation_id,
            r#type: proto::LogEventType::Warning as i32,
            message: message.to_string(),
            span: None,
            stack_trace: String::new(),
            formatted: String::new(),
        },
    ))
}

pub(crate) fn protocol_error(message: &str) -> proto::OutboundMessage {
    outbound(outbound_message::Message::Error(proto::ProtocolError {
        r#type: proto::ProtocolErrorType::Internal as i32,
        id: 0,
        message: message.to_string(),
    }))
}
