//! New/Open/Save over a [`Session`].

use std::path::{Path, PathBuf};

use crate::{Command, Converter, Document, FileError, Renderer, Session, disk_io};

/// The file-type filter shown by open/save prompts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileFilter {
    pub name: String,
    pub extensions: Vec<String>,
}

impl Default for FileFilter {
    fn default() -> Self {
        Self {
            name: "Markdown files".to_owned(),
            extensions: vec!["md".to_owned()],
        }
    }
}

/// A blocking file-selection prompt. `None` means the user dismissed it.
pub trait FileDialog {
    fn pick_open(&mut self, filter: &FileFilter) -> Option<PathBuf>;
    fn pick_save(&mut self, filter: &FileFilter, suggested: Option<&Path>) -> Option<PathBuf>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// A prompt was dismissed; nothing changed.
    Cancelled,
}

#[derive(Clone, Debug, Default)]
pub struct FileLifecycle {
    filter: FileFilter,
    track_path: bool,
}

impl FileLifecycle {
    /// With `track_path` off, Open leaves the document path alone and Save
    /// always prompts. With it on, both remember the chosen file.
    pub const fn new(filter: FileFilter, track_path: bool) -> Self {
        Self { filter, track_path }
    }

    pub const fn filter(&self) -> &FileFilter {
        &self.filter
    }

    pub fn run<C, R, D>(
        &self,
        command: Command,
        session: &mut Session<C, R>,
        dialog: &mut D,
    ) -> Result<Outcome, FileError>
    where
        C: Converter,
        R: Renderer,
        D: FileDialog + ?Sized,
    {
        match command {
            Command::New => {
                Self::new_document(session);
                Ok(Outcome::Completed)
            }
            Command::Open => self.open(session, dialog),
            Command::Save => self.save(session, dialog),
        }
    }

    pub fn new_document<C: Converter, R: Renderer>(session: &mut Session<C, R>) {
        tracing::debug!("new document");
        session.reset(Document::default());
    }

    pub fn open<C, R, D>(
        &self,
        session: &mut Session<C, R>,
        dialog: &mut D,
    ) -> Result<Outcome, FileError>
    where
        C: Converter,
        R: Renderer,
        D: FileDialog + ?Sized,
    {
        let Some(path) = dialog.pick_open(&self.filter) else {
            tracing::debug!("open cancelled");
            return Ok(Outcome::Cancelled);
        };
        self.open_path(session, path)?;
        Ok(Outcome::Completed)
    }

    /// Load `path` into the session without prompting.
    ///
    /// On failure the session is left untouched.
    pub fn open_path<C: Converter, R: Renderer>(
        &self,
        session: &mut Session<C, R>,
        path: PathBuf,
    ) -> Result<(), FileError> {
        let text = disk_io::read_utf8(&path)?;
        tracing::info!(path = %path.display(), bytes = text.len(), "opened");

        let path = if self.track_path {
            Some(path)
        } else {
            session.path().map(Path::to_path_buf)
        };
        session.reset(Document::new(text, path));
        Ok(())
    }

    pub fn save<C, R, D>(
        &self,
        session: &mut Session<C, R>,
        dialog: &mut D,
    ) -> Result<Outcome, FileError>
    where
        C: Converter,
        R: Renderer,
        D: FileDialog + ?Sized,
    {
        let known = self
            .track_path
            .then(|| session.path().map(Path::to_path_buf))
            .flatten();
        let path = match known {
            Some(path) => path,
            None => {
                let Some(path) = dialog.pick_save(&self.filter, session.path()) else {
                    tracing::debug!("save cancelled");
                    return Ok(Outcome::Cancelled);
                };
                path
            }
        };

        disk_io::write_utf8(&path, session.text())?;
        tracing::info!(path = %path.display(), bytes = session.text().len(), "saved");

        session.mark_saved();
        if self.track_path {
            session.set_path(Some(path));
        }
        Ok(Outcome::Completed)
    }
}
