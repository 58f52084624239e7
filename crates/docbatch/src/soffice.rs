//! LibreOffice backend.
//!
//! Each session runs `soffice` in headless mode against a private,
//! temporary user profile, so a desktop instance the operator has open is
//! never reused or disturbed. Conversions are staged inside the profile
//! directory and then moved to their destination.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

use crate::error::ConvertError;
use crate::format::SaveFormat;
use crate::session::{AppLauncher, AppSession, DocumentId, OpenOptions};

/// Executable names tried on `PATH` when no program is configured.
const PROGRAM_CANDIDATES: &[&str] = &["soffice", "libreoffice"];

/// Highest macro security level: only signed macros from trusted sources.
const MACRO_SECURITY_VERY_HIGH: u8 = 3;

/// Writer setting for updating links when loading: never.
const LINK_UPDATE_NEVER: u8 = 2;

/// LibreOffice `--convert-to` argument for a save format.
///
/// XPS has no LibreOffice export filter; saving to it fails for that document.
pub fn export_filter(format: SaveFormat) -> Option<&'static str> {
    match format {
        SaveFormat::DOCUMENT_97 => Some("doc:MS Word 97"),
        SaveFormat::TEXT => Some("txt:Text (encoded):UTF8"),
        SaveFormat::RTF => Some("rtf:Rich Text Format"),
        SaveFormat::FILTERED_HTML => Some("html:HTML (StarWriter)"),
        SaveFormat::DOCUMENT_DEFAULT => Some("docx:MS Word 2007 XML"),
        SaveFormat::PDF => Some("pdf:writer_pdf_Export"),
        SaveFormat::OPEN_DOCUMENT_TEXT => Some("odt:writer8"),
        _ => None,
    }
}

/// Starts headless LibreOffice sessions.
#[derive(Debug, Clone, Default)]
pub struct SofficeLauncher {
    program: Option<PathBuf>,
}

impl SofficeLauncher {
    /// Use `program` if given, otherwise look `soffice` up on `PATH`.
    pub fn new(program: Option<PathBuf>) -> Self {
        Self { program }
    }

    fn locate(&self) -> Result<PathBuf, ConvertError> {
        if let Some(program) = &self.program {
            return which::which(program).map_err(|e| {
                ConvertError::SessionUnavailable(format!("{}: {e}", program.display()))
            });
        }
        PROGRAM_CANDIDATES
            .iter()
            .find_map(|name| which::which(name).ok())
            .ok_or_else(|| {
                ConvertError::SessionUnavailable(
                    "LibreOffice not found on PATH (tried soffice, libreoffice)".to_string(),
                )
            })
    }
}

impl AppLauncher for SofficeLauncher {
    fn launch(&self) -> Result<Box<dyn AppSession>, ConvertError> {
        let program = self.locate()?;

        let output = Command::new(&program)
            .args(["--headless", "--version"])
            .output()
            .map_err(|e| ConvertError::SessionUnavailable(format!("{}: {e}", program.display())))?;
        if !output.status.success() {
            return Err(ConvertError::SessionUnavailable(format!(
                "{} --version exited with {}: {}",
                program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        tracing::debug!(
            program = %program.display(),
            version = %String::from_utf8_lossy(&output.stdout).trim(),
            "found LibreOffice"
        );

        let profile = tempfile::Builder::new()
            .prefix("docbatch-profile-")
            .tempdir()
            .map_err(|e| ConvertError::SessionUnavailable(format!("creating profile: {e}")))?;

        Ok(Box::new(SofficeSession {
            program,
            profile: Some(profile),
            documents: HashMap::new(),
            next_id: 0,
        }))
    }
}

#[derive(Debug)]
struct SofficeDocument {
    path: PathBuf,
    suppress_macros: bool,
    reset_template: bool,
}

/// A headless LibreOffice session bound to a private user profile.
pub struct SofficeSession {
    program: PathBuf,
    profile: Option<TempDir>,
    documents: HashMap<u64, SofficeDocument>,
    next_id: u64,
}

impl SofficeSession {
    fn profile_dir(&self) -> Result<&Path, ConvertError> {
        self.profile
            .as_ref()
            .map(TempDir::path)
            .ok_or_else(|| ConvertError::SessionUnavailable("session already quit".to_string()))
    }

    fn document(&mut self, id: DocumentId) -> Result<&mut SofficeDocument, ConvertError> {
        self.documents.get_mut(&id.0).ok_or_else(|| ConvertError::Open {
            path: PathBuf::new(),
            message: format!("no open document with handle {}", id.0),
        })
    }

    fn convert_command(&self, source: &Path, filter: &str, outdir: &Path) -> Result<Command, ConvertError> {
        let profile = self.profile_dir()?;
        let mut command = Command::new(&self.program);
        command
            .args([
                "--headless",
                "--invisible",
                "--nologo",
                "--nodefault",
                "--norestore",
                "--nolockcheck",
            ])
            .arg(format!("-env:UserInstallation={}", file_url(&profile.join("user-root"))))
            .arg("--convert-to")
            .arg(filter)
            .arg("--outdir")
            .arg(outdir)
            .arg(source);
        Ok(command)
    }
}

impl AppSession for SofficeSession {
    fn open_document(
        &mut self,
        path: &Path,
        options: &OpenOptions,
    ) -> Result<DocumentId, ConvertError> {
        self.profile_dir()?;
        fs::File::open(path).map_err(|e| ConvertError::Open {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let id = self.next_id;
        self.next_id += 1;
        self.documents.insert(
            id,
            SofficeDocument {
                path: path.to_path_buf(),
                suppress_macros: options.suppress_macros,
                reset_template: false,
            },
        );
        Ok(DocumentId(id))
    }

    fn attach_template(&mut self, document: DocumentId) -> Result<(), ConvertError> {
        self.document(document)?.reset_template = true;
        Ok(())
    }

    fn save_as(
        &mut self,
        document: DocumentId,
        destination: &Path,
        format: SaveFormat,
    ) -> Result<(), ConvertError> {
        let (source, suppress_macros, reset_template) = {
            let doc = self.document(document)?;
            (doc.path.clone(), doc.suppress_macros, doc.reset_template)
        };
        let save_error = |message: String| ConvertError::Save {
            path: source.clone(),
            message,
        };

        let filter = export_filter(format).ok_or_else(|| {
            save_error(format!(
                "{} (code {}) has no LibreOffice export filter",
                format.extension, format.code
            ))
        })?;

        let profile = self.profile_dir()?.to_path_buf();
        write_profile_settings(&profile.join("user-root"), suppress_macros, reset_template)
            .map_err(|e| save_error(format!("writing profile settings: {e}")))?;

        let outdir = profile.join("out");
        if outdir.exists() {
            fs::remove_dir_all(&outdir).map_err(|e| save_error(e.to_string()))?;
        }
        fs::create_dir_all(&outdir).map_err(|e| save_error(e.to_string()))?;

        let mut command = self.convert_command(&source, filter, &outdir)?;
        tracing::debug!(?command, "running LibreOffice conversion");
        let output = command
            .output()
            .map_err(|e| save_error(format!("running {}: {e}", self.program.display())))?;
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(save_error(format!(
                "LibreOffice exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        // soffice can exit 0 without writing anything when the filter rejects the input.
        let produced = staged_output(&outdir, &source, format);
        if !produced.is_file() {
            return Err(save_error(format!(
                "LibreOffice produced no output: {}",
                stderr.trim()
            )));
        }

        move_file(&produced, destination)
            .map_err(|e| save_error(format!("moving output to {}: {e}", destination.display())))?;

        // HTML export writes embedded images next to the page; they belong with it.
        let target_dir = destination.parent().unwrap_or(Path::new("."));
        let moved = move_companions(&outdir, target_dir)
            .map_err(|e| save_error(format!("moving companion files: {e}")))?;
        if !moved.is_empty() {
            tracing::debug!(count = moved.len(), dir = %target_dir.display(), "moved companion files");
        }
        Ok(())
    }

    fn close_document(&mut self, document: DocumentId) -> Result<(), ConvertError> {
        self.documents.remove(&document.0);
        Ok(())
    }

    fn quit(&mut self) -> Result<(), ConvertError> {
        self.documents.clear();
        if let Some(profile) = self.profile.take() {
            profile.close()?;
        }
        Ok(())
    }
}

/// Path of the file `soffice --convert-to` writes for `source`.
fn staged_output(outdir: &Path, source: &Path, format: SaveFormat) -> PathBuf {
    let stem = source.file_stem().unwrap_or(source.as_os_str());
    let mut name = stem.to_os_string();
    name.push(".");
    name.push(format.extension);
    outdir.join(name)
}

/// Move every file left in `outdir` into `target_dir`, keeping its name.
fn move_companions(outdir: &Path, target_dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut moved = Vec::new();
    for entry in fs::read_dir(outdir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            tracing::debug!(path = %entry.path().display(), "leaving staged directory behind");
            continue;
        }
        let target = target_dir.join(entry.file_name());
        move_file(&entry.path(), &target)?;
        moved.push(target);
    }
    Ok(moved)
}

/// Rename, falling back to copy and delete across file systems.
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to)?;
    fs::remove_file(from)
}

/// `file://` URL of an absolute path, as `-env:UserInstallation` expects.
fn file_url(path: &Path) -> String {
    let text = path
        .to_string_lossy()
        .replace('\\', "/")
        .replace('%', "%25")
        .replace(' ', "%20");
    if text.starts_with('/') {
        format!("file://{text}")
    } else {
        format!("file:///{text}")
    }
}

fn registry_settings(suppress_macros: bool, reset_template: bool) -> String {
    let mut items = String::new();
    if suppress_macros {
        items.push_str(&registry_item(
            "/org.openoffice.Office.Common/Security/Scripting",
            "MacroSecurityLevel",
            &MACRO_SECURITY_VERY_HIGH.to_string(),
        ));
        items.push_str(&registry_item(
            "/org.openoffice.Office.Common/Security/Scripting",
            "DisableMacrosExecution",
            "true",
        ));
    }
    if reset_template {
        items.push_str(&registry_item(
            "/org.openoffice.Office.Writer/Content/Update",
            "Link",
            &LINK_UPDATE_NEVER.to_string(),
        ));
    }
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<oor:items xmlns:oor="http://openoffice.org/2001/registry" xmlns:xs="http://www.w3.org/2001/XMLSchema" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
{items}</oor:items>
"#
    )
}

fn registry_item(path: &str, name: &str, value: &str) -> String {
    format!(
        "<item oor:path=\"{path}\"><prop oor:name=\"{name}\" oor:op=\"fuse\"><value>{value}</value></prop></item>\n"
    )
}

/// Write the per-document settings into the session's user profile.
///
/// Rewritten before every conversion since the profile is shared by all
/// documents of the session.
fn write_profile_settings(
    user_root: &Path,
    suppress_macros: bool,
    reset_template: bool,
) -> io::Result<()> {
    let user = user_root.join("user");
    fs::create_dir_all(&user)?;
    fs::write(
        user.join("registrymodifications.xcu"),
        registry_settings(suppress_macros, reset_template),
    )
}
