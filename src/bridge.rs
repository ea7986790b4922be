//! Glue between the site builder and the navigation tracker
//!
//! The builder tells the bridge when a page has been rebuilt; the preview
//! server asks it whether a not-found request should be answered with a
//! redirect instead. Both sides stay decoupled from the tracker's state
//! machine.

use crate::navigation::PendingNavigation;
use crate::paths::SiteUrls;
use camino::Utf8Path;
use std::sync::Arc;

pub struct RebuildBridge {
    nav: Arc<PendingNavigation>,
    urls: Arc<dyn SiteUrls>,
}

impl RebuildBridge {
    pub fn new(nav: Arc<PendingNavigation>, urls: Arc<dyn SiteUrls>) -> Self {
        Self { nav, urls }
    }

    /// Notify the tracker that a page source has been rebuilt. If that
    /// source is the one a freshly-created file is waiting on, the
    /// navigation fact becomes consumable.
    pub fn page_rebuilt(&self, source: &Utf8Path) {
        let Some(url) = self.urls.url_for(source) else {
            return;
        };
        if self.nav.resolve_rebuilt(source, &url) {
            tracing::info!("resolved pending navigation for {source} -> {url}");
        }
    }

    /// Called by the preview server when a request would otherwise 404.
    ///
    /// After a rename the browser may still be pointed at the old URL; if a
    /// rename-origin fact is pending, answer with a redirect page to the new
    /// URL instead of the 404. Create-origin facts are left alone, they
    /// belong to the next client `ready`.
    pub fn intercept_not_found(&self) -> Option<String> {
        self.nav
            .take_rename_redirect()
            .map(|new_url| render_redirect_page(&new_url))
    }
}

/// A minimal page that sends the browser to `new_url` immediately.
pub fn render_redirect_page(new_url: &str) -> String {
    format!(
        "<!doctype html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <meta http-equiv=\"refresh\" content=\"0; url={new_url}\">\n\
         <title>Redirecting</title>\n</head>\n<body>\n\
         <p>Redirecting to <a href=\"{new_url}\">{new_url}</a>…</p>\n\
         </body>\n</html>\n"
    )
}
