//! Automation-session abstraction over the office application.
//!
//! A backend implements [`AppLauncher`] to start sessions and
//! [`AppSession`] for the document operations. [`SessionGuard`] and
//! [`OpenDocument`] tie session and document lifetimes to a scope so
//! that every exit path closes the document and releases the session.

use std::path::{Path, PathBuf};

use crate::error::ConvertError;
use crate::format::SaveFormat;

/// Handle of a document opened in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(pub u64);

/// How a document is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenOptions {
    pub read_only: bool,
    /// Keep auto-run macros in the document from executing.
    pub suppress_macros: bool,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            read_only: true,
            suppress_macros: true,
        }
    }
}

/// One live instance of the office application.
pub trait AppSession {
    fn open_document(
        &mut self,
        path: &Path,
        options: &OpenOptions,
    ) -> Result<DocumentId, ConvertError>;

    /// Detach the document from its own template so the save uses the
    /// application's default one.
    ///
    /// Backends without a template API approximate this; the LibreOffice
    /// backend only stops linked content, the template link included, from
    /// being refreshed when the document loads.
    fn attach_template(&mut self, document: DocumentId) -> Result<(), ConvertError>;

    fn save_as(
        &mut self,
        document: DocumentId,
        destination: &Path,
        format: SaveFormat,
    ) -> Result<(), ConvertError>;

    fn close_document(&mut self, document: DocumentId) -> Result<(), ConvertError>;

    /// Shut the application down and release everything the session holds.
    fn quit(&mut self) -> Result<(), ConvertError>;
}

/// Starts office application sessions.
pub trait AppLauncher {
    /// Start a session. Failure means the application cannot be driven at all.
    fn launch(&self) -> Result<Box<dyn AppSession>, ConvertError>;
}

/// Owns a session and quits it when released or dropped.
pub struct SessionGuard {
    session: Box<dyn AppSession>,
    released: bool,
}

impl SessionGuard {
    pub fn acquire(launcher: &dyn AppLauncher) -> Result<Self, ConvertError> {
        let session = launcher.launch()?;
        tracing::debug!("office session started");
        Ok(Self {
            session,
            released: false,
        })
    }

    pub fn session(&mut self) -> &mut dyn AppSession {
        self.session.as_mut()
    }

    /// Quit the session, reporting a failure to shut down.
    pub fn release(mut self) -> Result<(), ConvertError> {
        self.released = true;
        let result = self.session.quit();
        tracing::debug!("office session released");
        result
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.session.quit() {
            tracing::warn!("failed to quit office session: {e}");
        } else {
            tracing::debug!("office session released");
        }
    }
}

/// A document open in a session, closed when closed explicitly or dropped.
pub struct OpenDocument<'a> {
    session: &'a mut dyn AppSession,
    id: DocumentId,
    path: PathBuf,
    closed: bool,
}

impl<'a> OpenDocument<'a> {
    pub fn open(
        session: &'a mut dyn AppSession,
        path: &Path,
        options: &OpenOptions,
    ) -> Result<Self, ConvertError> {
        let id = session.open_document(path, options)?;
        Ok(Self {
            session,
            id,
            path: path.to_path_buf(),
            closed: false,
        })
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn attach_template(&mut self) -> Result<(), ConvertError> {
        self.session.attach_template(self.id)
    }

    pub fn save_as(&mut self, destination: &Path, format: SaveFormat) -> Result<(), ConvertError> {
        self.session.save_as(self.id, destination, format)
    }

    pub fn close(mut self) -> Result<(), ConvertError> {
        self.closed = true;
        self.session.close_document(self.id)
    }
}

impl Drop for OpenDocument<'_> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.session.close_document(self.id) {
            tracing::warn!(path = %self.path.display(), "failed to close document: {e}");
        }
    }
}
