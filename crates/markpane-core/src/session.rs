//! The owned application context: document, converter and renderer, kept in sync.

use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use crate::{ConversionError, Converter, Document, Page, page};

/// Displays a complete HTML page, replacing whatever was shown before.
pub trait Renderer {
    fn show_page(&mut self, page: Page);
}

#[derive(Clone, Debug, Default)]
pub struct SessionOptions {
    /// Quiet period before an edit is rendered. Zero renders on every edit.
    pub debounce: Duration,
    /// Base URL used while the document has no path.
    pub base_url: String,
}

pub struct Session<C, R> {
    doc: Document,
    converter: C,
    renderer: R,
    options: SessionOptions,
    pending_since: Option<Instant>,
    conversion_error: Option<ConversionError>,
}

impl<C: Converter, R: Renderer> Session<C, R> {
    /// Start with an empty document; the renderer immediately receives its preview.
    pub fn new(converter: C, renderer: R, options: SessionOptions) -> Self {
        let mut session = Self {
            doc: Document::default(),
            converter,
            renderer,
            options,
            pending_since: None,
            conversion_error: None,
        };
        session.sync();
        session
    }

    pub const fn document(&self) -> &Document {
        &self.doc
    }

    pub fn text(&self) -> &str {
        self.doc.text()
    }

    pub fn path(&self) -> Option<&std::path::Path> {
        self.doc.path()
    }

    /// Record the file location. The preview is not re-rendered.
    pub fn set_path(&mut self, path: Option<PathBuf>) {
        self.doc.set_path(path);
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.doc.set_text(text);
        self.text_changed();
    }

    /// Let an editor widget mutate the buffer in place.
    ///
    /// `edit` returns whether it changed anything; only then is the preview synced.
    pub fn edit_text(&mut self, edit: impl FnOnce(&mut String) -> bool) -> bool {
        let changed = edit(self.doc.text_mut());
        if changed {
            self.doc.mark_dirty();
            self.text_changed();
        }
        changed
    }

    /// Replace the document wholesale and render it right away.
    pub fn reset(&mut self, doc: Document) {
        self.doc = doc;
        self.doc.mark_clean();
        self.pending_since = None;
        self.sync();
    }

    pub const fn mark_saved(&mut self) {
        self.doc.mark_clean();
    }

    fn text_changed(&mut self) {
        if self.options.debounce.is_zero() {
            self.sync();
        } else {
            self.pending_since = Some(Instant::now());
        }
    }

    /// Convert the current text and push the resulting page to the renderer.
    ///
    /// A converter failure renders an error page and is kept until the next
    /// successful sync.
    pub fn sync(&mut self) {
        self.pending_since = None;
        let base_url = self.base_url();
        let page = match self.converter.convert(self.doc.text()) {
            Ok(fragment) => {
                self.conversion_error = None;
                Page::from_fragment(&fragment, &base_url)
            }
            Err(err) => {
                tracing::warn!(%err, "preview conversion failed");
                let page = Page::conversion_failed(&err, &base_url);
                self.conversion_error = Some(err);
                page
            }
        };
        tracing::debug!(bytes = self.doc.text().len(), "preview synced");
        self.renderer.show_page(page);
    }

    /// Sync if a debounced edit has waited long enough.
    ///
    /// Returns how much longer to wait when an edit is still pending.
    pub fn flush_due(&mut self, now: Instant) -> Option<Duration> {
        let since = self.pending_since?;
        let waited = now.saturating_duration_since(since);
        if waited >= self.options.debounce {
            self.sync();
            None
        } else {
            Some(self.options.debounce - waited)
        }
    }

    pub const fn is_sync_pending(&self) -> bool {
        self.pending_since.is_some()
    }

    pub const fn conversion_error(&self) -> Option<&ConversionError> {
        self.conversion_error.as_ref()
    }

    pub fn base_url(&self) -> String {
        self.doc
            .path()
            .and_then(page::base_url_for)
            .unwrap_or_else(|| self.options.base_url.clone())
    }

    pub const fn renderer(&self) -> &R {
        &self.renderer
    }

    pub const fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}
