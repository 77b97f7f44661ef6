use scraper::{ElementRef, Html, Selector, element_ref::Select};
use tracing::debug;
use url::Url;

/// A parsed page with navigation chrome, scripts and ad/share widgets removed.
///
/// Removed subtrees stay in the arena but are detached from the tree, so all
/// queries must go through [`NormalizedDocument::select`] (which walks from the
/// root) rather than `Html::select` (which scans every node in the arena).
pub struct NormalizedDocument {
    html: Html,
    base_url: Url,
    removed: usize,
}

impl NormalizedDocument {
    /// Parse permissively and strip every node matching `noise_selectors`.
    ///
    /// Never fails: html5ever recovers from unclosed tags and synthesises
    /// missing `<html>`/`<body>` elements.
    pub fn parse(html: &str, base_url: Url, noise_selectors: &[Selector]) -> Self {
        let mut document = Html::parse_document(html);
        let mut removed = 0;

        for selector in noise_selectors {
            let ids: Vec<_> = document
                .root_element()
                .select(selector)
                .map(|element| element.id())
                .collect();

            for id in ids {
                if let Some(mut node) = document.tree.get_mut(id) {
                    node.detach();
                    removed += 1;
                }
            }
        }

        debug!(removed, "normalized document");

        Self {
            html: document,
            base_url,
            removed,
        }
    }

    pub fn root(&self) -> ElementRef<'_> {
        self.html.root_element()
    }

    pub fn select<'a, 'b>(&'a self, selector: &'b Selector) -> Select<'a, 'b> {
        self.root().select(selector)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Number of subtrees detached by the denylist.
    pub fn removed(&self) -> usize {
        self.removed
    }
}
