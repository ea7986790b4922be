//! End-to-end editing flows, exercised through the command dispatcher
//!
//! Frames go through the real wire codec on both ends; only the socket
//! itself is skipped.

use camino::Utf8PathBuf;
use livedit::bridge::RebuildBridge;
use livedit::fs_ops::MutationEngine;
use livedit::navigation::PendingNavigation;
use livedit::paths::DirectoryUrls;
use livedit::protocol::decode_command;
use livedit::session::{EditorState, dispatch};
use serde_json::Value;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    docs: Utf8PathBuf,
    state: EditorState,
    bridge: RebuildBridge,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let docs = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let urls = Arc::new(DirectoryUrls::new(docs.clone()));
        let nav = Arc::new(PendingNavigation::new());
        let engine = MutationEngine::new(docs.clone(), urls.clone());
        let state = EditorState::new(engine, nav.clone());
        let bridge = RebuildBridge::new(nav, urls);
        Self {
            _dir: dir,
            docs,
            state,
            bridge,
        }
    }

    /// Send one wire frame through the codec and dispatcher, returning
    /// the reply as parsed JSON.
    fn send(&self, frame: &str) -> Option<Value> {
        let reply = match decode_command(frame) {
            Ok(command) => dispatch(&self.state, command)?,
            Err(e) => panic!("frame should decode: {e}"),
        };
        Some(serde_json::from_str(&reply.encode().unwrap()).unwrap())
    }
}

#[test]
fn test_set_contents_writes_to_disk() {
    let fx = Fixture::new();
    fs::write(fx.docs.join("index.md"), "# Old").unwrap();

    let reply = fx
        .send(r##"{"action":"set_contents","path":"index.md","contents":"# New\n"}"##)
        .unwrap();
    assert_eq!(reply["action"], "set_contents");
    assert_eq!(reply["path"], "index.md");
    assert_eq!(reply["success"], true);

    assert_eq!(
        fs::read_to_string(fx.docs.join("index.md")).unwrap(),
        "# New\n"
    );
}

#[test]
fn test_rename_reports_new_path_and_url() {
    let fx = Fixture::new();
    fs::create_dir_all(fx.docs.join("guide")).unwrap();
    fs::write(fx.docs.join("guide/old.md"), "# Page").unwrap();

    let reply = fx
        .send(r#"{"action":"rename_file","path":"guide/old.md","new_filename":"new.md"}"#)
        .unwrap();
    assert_eq!(reply["action"], "rename_file");
    assert_eq!(reply["success"], true);
    assert_eq!(reply["old_path"], "guide/old.md");
    assert_eq!(reply["new_path"], "guide/new.md");
    assert_eq!(reply["new_url"], "/guide/new/");

    assert!(!fx.docs.join("guide/old.md").exists());
    assert!(fx.docs.join("guide/new.md").exists());
}

#[test]
fn test_get_contents_of_missing_file_fails_with_reason() {
    let fx = Fixture::new();

    let reply = fx
        .send(r#"{"action":"get_contents","path":"missing.md"}"#)
        .unwrap();
    assert_eq!(reply["action"], "get_contents");
    assert_eq!(reply["success"], false);
    assert!(reply.get("contents").is_none());
    assert!(!reply["error"].as_str().unwrap().is_empty());
}

#[test]
fn test_new_file_creates_parents_and_is_readable() {
    let fx = Fixture::new();

    let reply = fx
        .send(r#"{"action":"new_file","path":"guide/advanced/tips.md","title":"Tips"}"#)
        .unwrap();
    assert_eq!(reply["action"], "new_file");
    assert_eq!(reply["success"], true);

    let reply = fx
        .send(r#"{"action":"get_contents","path":"guide/advanced/tips.md"}"#)
        .unwrap();
    assert_eq!(reply["success"], true);
    assert_eq!(
        reply["contents"],
        "# Tips\n\nThis page was created by live-edit."
    );
}

#[test]
fn test_delete_file_removes_it() {
    let fx = Fixture::new();
    fs::write(fx.docs.join("scratch.md"), "x").unwrap();

    let reply = fx
        .send(r#"{"action":"delete_file","path":"scratch.md"}"#)
        .unwrap();
    assert_eq!(reply["success"], true);
    assert!(!fx.docs.join("scratch.md").exists());

    // A second delete reports failure over the same session
    let reply = fx
        .send(r#"{"action":"delete_file","path":"scratch.md"}"#)
        .unwrap();
    assert_eq!(reply["success"], false);
}

#[test]
fn test_unknown_action_does_not_end_the_session() {
    let fx = Fixture::new();
    fs::write(fx.docs.join("index.md"), "# Hi").unwrap();

    let reply = fx.send(r#"{"action":"frobnicate"}"#).unwrap();
    assert_eq!(reply["action"], "error");
    assert!(reply["message"].as_str().unwrap().contains("frobnicate"));

    // Subsequent commands still work
    let reply = fx
        .send(r#"{"action":"get_contents","path":"index.md"}"#)
        .unwrap();
    assert_eq!(reply["success"], true);
}

#[test]
fn test_traversal_is_rejected_with_error_reply() {
    let fx = Fixture::new();

    let reply = fx
        .send(r#"{"action":"get_contents","path":"../outside.md"}"#)
        .unwrap();
    assert_eq!(reply["success"], false);
    assert!(reply["error"].as_str().unwrap().contains("invalid path"));
}

#[test]
fn test_rename_then_ready_redirects_exactly_once() {
    let fx = Fixture::new();
    fs::write(fx.docs.join("a.md"), "# A").unwrap();

    fx.send(r#"{"action":"rename_file","path":"a.md","new_filename":"b.md"}"#)
        .unwrap();

    // The reconnecting client announces readiness and is redirected
    let reply = fx.send(r#"{"action":"ready"}"#).unwrap();
    assert_eq!(reply["action"], "redirect");
    assert_eq!(reply["new_url"], "/b/");

    // A second ready gets nothing
    assert!(fx.send(r#"{"action":"ready"}"#).is_none());
}

#[test]
fn test_rename_redirect_via_not_found_interception() {
    let fx = Fixture::new();
    fs::write(fx.docs.join("a.md"), "# A").unwrap();

    fx.send(r#"{"action":"rename_file","path":"a.md","new_filename":"b.md"}"#)
        .unwrap();

    // The browser reloads the old URL and hits a 404; the interceptor
    // answers with a redirect page instead.
    let page = fx.bridge.intercept_not_found().unwrap();
    assert!(page.contains("url=/b/"));

    // The fact is consumed: the next ready stays silent
    assert!(fx.send(r#"{"action":"ready"}"#).is_none());
}

#[test]
fn test_create_redirects_after_rebuild() {
    let fx = Fixture::new();

    fx.send(r#"{"action":"new_file","path":"guide/fresh.md","title":"Fresh"}"#)
        .unwrap();

    // Until the rebuild reports the page, there is nowhere to send the client
    assert!(fx.send(r#"{"action":"ready"}"#).is_none());

    // The 404 interceptor never consumes a create-origin fact
    fx.bridge
        .page_rebuilt(&fx.docs.join("guide/fresh.md"));
    assert!(fx.bridge.intercept_not_found().is_none());

    let reply = fx.send(r#"{"action":"ready"}"#).unwrap();
    assert_eq!(reply["action"], "redirect");
    assert_eq!(reply["new_url"], "/guide/fresh/");
}

#[test]
fn test_rebuild_of_unrelated_page_does_not_redirect() {
    let fx = Fixture::new();
    fs::write(fx.docs.join("other.md"), "# Other").unwrap();

    fx.send(r#"{"action":"new_file","path":"fresh.md","title":"Fresh"}"#)
        .unwrap();
    fx.bridge.page_rebuilt(&fx.docs.join("other.md"));

    assert!(fx.send(r#"{"action":"ready"}"#).is_none());
}
