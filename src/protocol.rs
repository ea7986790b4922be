//! Wire protocol between the browser bridge and the editing service
//!
//! One newline-free JSON object per websocket text frame. The `action`
//! field selects the variant on both directions. Commands are decoded once
//! at this boundary into a closed sum type; an unrecognized action becomes
//! [`EditorCommand::Unknown`] rather than an error so the session can reply
//! and keep going.

use crate::error::EditError;
use serde::Serialize;
use serde_json::Value;

/// A command received from a client.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorCommand {
    GetContents { path: String },
    SetContents { path: String, contents: String },
    RenameFile { path: String, new_filename: String },
    DeleteFile { path: String },
    NewFile { path: String, title: String },
    Ready,
    Unknown { raw_action: String },
}

/// Decode one text frame into a command.
///
/// Malformed JSON, a missing/non-string `action`, or missing fields for a
/// known action are protocol errors; the caller answers with an `error`
/// reply and the session continues.
pub fn decode_command(frame: &str) -> Result<EditorCommand, EditError> {
    let value: Value = serde_json::from_str(frame)
        .map_err(|e| EditError::Protocol(format!("malformed message: {e}")))?;

    let action = value
        .get("action")
        .and_then(Value::as_str)
        .ok_or_else(|| EditError::Protocol("missing action field".into()))?;

    let field = |name: &str| -> Result<String, EditError> {
        value
            .get(name)
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| EditError::Protocol(format!("{action}: missing field {name:?}")))
    };

    Ok(match action {
        "get_contents" => EditorCommand::GetContents {
            path: field("path")?,
        },
        "set_contents" => EditorCommand::SetContents {
            path: field("path")?,
            contents: field("contents")?,
        },
        "rename_file" => EditorCommand::RenameFile {
            path: field("path")?,
            new_filename: field("new_filename")?,
        },
        "delete_file" => EditorCommand::DeleteFile {
            path: field("path")?,
        },
        "new_file" => EditorCommand::NewFile {
            path: field("path")?,
            title: field("title")?,
        },
        "ready" => EditorCommand::Ready,
        other => EditorCommand::Unknown {
            raw_action: other.to_string(),
        },
    })
}

/// A reply sent to a client. Serialized with the same `action` tag the
/// browser bridge dispatches on; absent optional fields are omitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum EditorReply {
    Connected {
        message: String,
    },
    GetContents {
        path: String,
        success: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        contents: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    SetContents {
        path: String,
        success: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    RenameFile {
        old_path: String,
        new_path: String,
        success: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        new_url: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    DeleteFile {
        path: String,
        success: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    NewFile {
        path: String,
        success: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    Redirect {
        new_url: String,
    },
    Error {
        message: String,
    },
}

impl EditorReply {
    /// Encode for the wire. Our own types always serialize; an error here
    /// would be a bug, so it is surfaced as a protocol error rather than
    /// a panic.
    pub fn encode(&self) -> Result<String, EditError> {
        serde_json::to_string(self).map_err(|e| EditError::Protocol(e.to_string()))
    }
}
