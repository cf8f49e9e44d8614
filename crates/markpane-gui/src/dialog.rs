#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

use markpane_core::{FileDialog, FileFilter};

/// Blocking OS file pickers.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct NativeDialog;

impl FileDialog for NativeDialog {
    fn pick_open(&mut self, filter: &FileFilter) -> Option<PathBuf> {
        rfd::FileDialog::new()
            .set_title("Open Markdown file")
            .add_filter(filter.name.as_str(), filter.extensions.as_slice())
            .pick_file()
    }

    fn pick_save(&mut self, filter: &FileFilter, suggested: Option<&Path>) -> Option<PathBuf> {
        let mut dialog = rfd::FileDialog::new()
            .set_title("Save Markdown file")
            .add_filter(filter.name.as_str(), filter.extensions.as_slice());
        if let Some(path) = suggested {
            if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
                dialog = dialog.set_directory(dir);
            }
            if let Some(name) = path.file_name() {
                dialog = dialog.set_file_name(name.to_string_lossy());
            }
        }
        dialog.save_file()
    }
}
