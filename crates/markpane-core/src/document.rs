use std::{
    borrow::Cow,
    path::{Path, PathBuf},
};

/// The editable text buffer and the file it belongs to, if any.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Document {
    text: String,
    path: Option<PathBuf>,
    dirty: bool,
}

impl Document {
    pub fn new(text: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self {
            text: text.into(),
            path,
            dirty: false,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.dirty = true;
    }

    pub(crate) fn text_mut(&mut self) -> &mut String {
        &mut self.text
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn set_path(&mut self, path: Option<PathBuf>) {
        self.path = path;
    }

    /// Edited since the last New/Open/Save.
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) const fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) const fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn title(&self) -> Cow<'_, str> {
        self.path
            .as_ref()
            .and_then(|path| path.file_name())
            .map_or_else(|| Cow::Borrowed("Untitled"), |name| name.to_string_lossy())
    }

    pub fn path_label(&self) -> Cow<'_, str> {
        self.path
            .as_ref()
            .map_or_else(|| Cow::Borrowed("Unsaved"), |path| path.to_string_lossy())
    }
}
