//! Live editing sidecar for documentation preview servers
//!
//! Exposes a websocket endpoint browsers connect to for in-place editing
//! of page sources: read, write, rename, delete and create, plus the
//! navigation bookkeeping that keeps the browser pointed at a page while
//! it moves underneath it.

pub mod bridge;
pub mod config;
pub mod error;
pub mod fs_ops;
pub mod logging;
pub mod navigation;
pub mod paths;
pub mod protocol;
pub mod serve;
pub mod session;
pub mod watcher;
