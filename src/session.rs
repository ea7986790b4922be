//! Per-connection session handler
//!
//! One handler per browser tab. The socket greets the client with a
//! `connected` message, then processes commands strictly in order: receive
//! one frame, dispatch, send the reply, repeat. A malformed or unknown
//! message gets an `error` reply and the loop continues; only the peer
//! going away ends the session, and both clean and abnormal closes are
//! ordinary teardown.

use crate::fs_ops::MutationEngine;
use crate::navigation::PendingNavigation;
use crate::protocol::{EditorCommand, EditorReply, decode_command};
use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;

/// Everything a session needs, shared across all sessions.
pub struct EditorState {
    pub engine: MutationEngine,
    pub nav: Arc<PendingNavigation>,
}

impl EditorState {
    pub fn new(engine: MutationEngine, nav: Arc<PendingNavigation>) -> Self {
        Self { engine, nav }
    }
}

/// Execute one command against the shared state.
///
/// Returns at most one reply: every command answers exactly once, except
/// `ready`, which answers only when a pending navigation fact is waiting.
pub fn dispatch(state: &EditorState, command: EditorCommand) -> Option<EditorReply> {
    match command {
        EditorCommand::GetContents { path } => Some(match state.engine.read(&path) {
            Ok(contents) => EditorReply::GetContents {
                path,
                success: true,
                contents: Some(contents),
                error: None,
            },
            Err(e) => EditorReply::GetContents {
                path,
                success: false,
                contents: None,
                error: Some(e.to_string()),
            },
        }),

        EditorCommand::SetContents { path, contents } => {
            Some(match state.engine.write(&path, &contents) {
                Ok(()) => {
                    tracing::info!("wrote {path}");
                    EditorReply::SetContents {
                        path,
                        success: true,
                        error: None,
                    }
                }
                Err(e) => EditorReply::SetContents {
                    path,
                    success: false,
                    error: Some(e.to_string()),
                },
            })
        }

        EditorCommand::RenameFile { path, new_filename } => {
            Some(match state.engine.rename(&path, &new_filename) {
                Ok(renamed) => {
                    tracing::info!("renamed {path} -> {}", renamed.new_rel);
                    if let Some(url) = &renamed.new_url {
                        state.nav.record_rename(url.clone());
                    }
                    EditorReply::RenameFile {
                        old_path: path,
                        new_path: renamed.new_rel.into_string(),
                        success: true,
                        new_url: renamed.new_url,
                        error: None,
                    }
                }
                Err(e) => EditorReply::RenameFile {
                    old_path: path.clone(),
                    new_path: path,
                    success: false,
                    new_url: None,
                    error: Some(e.to_string()),
                },
            })
        }

        EditorCommand::DeleteFile { path } => Some(match state.engine.delete(&path) {
            Ok(()) => {
                tracing::info!("deleted {path}");
                EditorReply::DeleteFile {
                    path,
                    success: true,
                    error: None,
                }
            }
            Err(e) => EditorReply::DeleteFile {
                path,
                success: false,
                error: Some(e.to_string()),
            },
        }),

        EditorCommand::NewFile { path, title } => Some(match state.engine.create(&path, &title) {
            Ok(abs) => {
                tracing::info!("created {path}");
                state.nav.record_create(abs);
                EditorReply::NewFile {
                    path,
                    success: true,
                    error: None,
                }
            }
            Err(e) => EditorReply::NewFile {
                path,
                success: false,
                error: Some(e.to_string()),
            },
        }),

        EditorCommand::Ready => state.nav.take_redirect().map(|new_url| {
            tracing::info!("redirecting client to {new_url}");
            EditorReply::Redirect { new_url }
        }),

        EditorCommand::Unknown { raw_action } => Some(EditorReply::Error {
            message: format!("unknown action {raw_action}"),
        }),
    }
}

/// Drive one websocket session until the peer disconnects.
pub async fn handle_socket(socket: WebSocket, state: Arc<EditorState>) {
    let (mut sender, mut receiver) = socket.split();

    tracing::info!("live-edit client connected");

    let hello = EditorReply::Connected {
        message: "connected to live-edit".into(),
    };
    if send_reply(&mut sender, &hello).await.is_err() {
        return;
    }

    loop {
        match receiver.next().await {
            Some(Ok(Message::Text(text))) => {
                let reply = match decode_command(text.as_str()) {
                    Ok(command) => dispatch(&state, command),
                    Err(e) => Some(EditorReply::Error {
                        message: e.to_string(),
                    }),
                };
                if let Some(reply) = reply {
                    if send_reply(&mut sender, &reply).await.is_err() {
                        tracing::info!("live-edit client went away mid-reply");
                        break;
                    }
                }
            }
            Some(Ok(Message::Ping(data))) => {
                if sender.send(Message::Pong(data)).await.is_err() {
                    break;
                }
            }
            Some(Ok(Message::Close(_))) | None => {
                tracing::info!("live-edit client disconnected");
                break;
            }
            Some(Ok(_)) => {
                // Binary and pong frames are not part of the protocol
            }
            Some(Err(e)) => {
                tracing::info!("live-edit session ended: {e}");
                break;
            }
        }
    }
}

async fn send_reply(
    sender: &mut SplitSink<WebSocket, Message>,
    reply: &EditorReply,
) -> Result<(), axum::Error> {
    let json = reply.encode().map_err(axum::Error::new)?;
    sender.send(Message::Text(json.into())).await
}
