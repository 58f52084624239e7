//! Shared test utilities for integration tests.
//!
//! [`FakeOffice`] stands in for the office application: saving writes a
//! small marker file instead of a real conversion, and every call is
//! recorded so tests can assert on ordering and cleanup.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use docbatch::error::ConvertError;
use docbatch::format::SaveFormat;
use docbatch::session::{AppLauncher, AppSession, DocumentId, OpenOptions};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Launch,
    Open(PathBuf),
    AttachTemplate(PathBuf),
    SaveAs(PathBuf, u32),
    Close(PathBuf),
    Quit,
}

#[derive(Default)]
pub struct FakeOffice {
    pub calls: Rc<RefCell<Vec<Call>>>,
    /// File names whose save fails.
    pub fail_on: Vec<String>,
    pub refuse_launch: bool,
}

impl FakeOffice {
    pub fn failing_on(names: &[&str]) -> Self {
        Self {
            fail_on: names.iter().map(|n| n.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, wanted: fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| wanted(c)).count()
    }

    pub fn saved_sources(&self) -> Vec<PathBuf> {
        let calls = self.calls.borrow();
        let mut open = None;
        let mut saved = Vec::new();
        for call in calls.iter() {
            match call {
                Call::Open(path) => open = Some(path.clone()),
                Call::SaveAs(..) => saved.extend(open.clone()),
                _ => {}
            }
        }
        saved
    }
}

impl AppLauncher for FakeOffice {
    fn launch(&self) -> Result<Box<dyn AppSession>, ConvertError> {
        if self.refuse_launch {
            return Err(ConvertError::SessionUnavailable(
                "fake office not installed".to_string(),
            ));
        }
        self.calls.borrow_mut().push(Call::Launch);
        Ok(Box::new(FakeSession {
            calls: Rc::clone(&self.calls),
            fail_on: self.fail_on.clone(),
            documents: HashMap::new(),
            next_id: 0,
        }))
    }
}

struct FakeSession {
    calls: Rc<RefCell<Vec<Call>>>,
    fail_on: Vec<String>,
    documents: HashMap<u64, PathBuf>,
    next_id: u64,
}

impl FakeSession {
    fn path(&self, document: DocumentId) -> PathBuf {
        self.documents[&document.0].clone()
    }
}

impl AppSession for FakeSession {
    fn open_document(
        &mut self,
        path: &Path,
        _options: &OpenOptions,
    ) -> Result<DocumentId, ConvertError> {
        if !path.is_file() {
            return Err(ConvertError::Open {
                path: path.to_path_buf(),
                message: "file not found".to_string(),
            });
        }
        self.calls.borrow_mut().push(Call::Open(path.to_path_buf()));
        let id = self.next_id;
        self.next_id += 1;
        self.documents.insert(id, path.to_path_buf());
        Ok(DocumentId(id))
    }

    fn attach_template(&mut self, document: DocumentId) -> Result<(), ConvertError> {
        let path = self.path(document);
        self.calls.borrow_mut().push(Call::AttachTemplate(path));
        Ok(())
    }

    fn save_as(
        &mut self,
        document: DocumentId,
        destination: &Path,
        format: SaveFormat,
    ) -> Result<(), ConvertError> {
        let source = self.path(document);
        self.calls
            .borrow_mut()
            .push(Call::SaveAs(destination.to_path_buf(), format.code));

        let name = source.file_name().unwrap().to_string_lossy().to_string();
        if self.fail_on.contains(&name) {
            return Err(ConvertError::Save {
                path: source,
                message: "fake save failure".to_string(),
            });
        }
        if destination.exists() {
            return Err(ConvertError::Save {
                path: source,
                message: "destination exists".to_string(),
            });
        }
        let content = std::fs::read_to_string(&source).unwrap_or_default();
        std::fs::write(destination, format!("converted {}: {content}", format.code))?;
        Ok(())
    }

    fn close_document(&mut self, document: DocumentId) -> Result<(), ConvertError> {
        let path = self.path(document);
        self.documents.remove(&document.0);
        self.calls.borrow_mut().push(Call::Close(path));
        Ok(())
    }

    fn quit(&mut self) -> Result<(), ConvertError> {
        self.calls.borrow_mut().push(Call::Quit);
        Ok(())
    }
}

/// Write `content` to `root/relative`, creating parent directories.
pub fn write_file(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, content).unwrap();
    path
}
