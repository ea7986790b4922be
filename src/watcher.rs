//! Rebuild watcher for the docs directory
//!
//! Watches the docs root for page sources being written or moved into
//! place and reports each one to the [`RebuildBridge`]. This is how a
//! file created over the websocket gets its canonical URL: the rebuild
//! observes the new source and the bridge resolves the pending
//! navigation.

use crate::bridge::RebuildBridge;
use camino::{Utf8Path, Utf8PathBuf};
use notify::{
    EventKind, RecommendedWatcher, RecursiveMode, Watcher,
    event::{ModifyKind, RenameMode},
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Check if a path is a page source worth reporting.
fn is_page_source(path: &Path) -> bool {
    let path_str = path.to_string_lossy();

    // Skip editor temp files
    if path_str.contains(".tmp.") || path_str.ends_with('~') || path_str.contains(".swp") {
        return false;
    }

    path.extension().map(|e| e == "md").unwrap_or(false)
}

/// Extract the page sources a notify event says were (re)built.
///
/// Creates, content modifications and rename destinations count; a rename
/// source or a removal is not a rebuilt page.
pub fn rebuilt_paths(event: &notify::Event) -> Vec<Utf8PathBuf> {
    let to_utf8 = |path: &Path| {
        if is_page_source(path) {
            Utf8Path::from_path(path).map(Utf8Path::to_owned)
        } else {
            None
        }
    };

    match event.kind {
        EventKind::Create(_)
        | EventKind::Modify(ModifyKind::Data(_))
        | EventKind::Modify(ModifyKind::Any)
        | EventKind::Modify(ModifyKind::Name(RenameMode::To))
        | EventKind::Modify(ModifyKind::Name(RenameMode::Any)) => {
            event.paths.iter().filter_map(|p| to_utf8(p)).collect()
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            // First path is the old name, second the new
            event.paths.iter().skip(1).filter_map(|p| to_utf8(p)).collect()
        }
        _ => Vec::new(),
    }
}

/// Watch `docs_dir` recursively and report rebuilt pages to the bridge.
///
/// Runs on its own thread; events are debounced so a burst of writes to
/// the same file reports once. The returned watcher must stay alive for
/// watching to continue.
pub fn spawn_rebuild_watcher(
    docs_dir: &Utf8Path,
    bridge: Arc<RebuildBridge>,
) -> color_eyre::Result<RecommendedWatcher> {
    let (tx, rx) = std::sync::mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |res| {
        let _ = tx.send(res);
    })?;
    watcher.watch(docs_dir.as_std_path(), RecursiveMode::Recursive)?;

    std::thread::spawn(move || {
        while let Ok(res) = rx.recv() {
            let mut pending = Vec::new();
            match res {
                Ok(event) => pending.extend(rebuilt_paths(&event)),
                Err(e) => {
                    tracing::warn!("watch error: {e}");
                    continue;
                }
            }

            // Collect the rest of the burst before reporting
            std::thread::sleep(Duration::from_millis(100));
            while let Ok(res) = rx.try_recv() {
                if let Ok(event) = res {
                    pending.extend(rebuilt_paths(&event));
                }
            }

            pending.sort();
            pending.dedup();
            for path in pending {
                tracing::debug!("page rebuilt: {path}");
                bridge.page_rebuilt(&path);
            }
        }
    });

    Ok(watcher)
}
