//! Per-document conversion: open, optionally reset the template, save
//! as the target format, close, then carry the source timestamps over.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::ConvertOptions;
use crate::error::ConvertError;
use crate::format::SaveFormat;
use crate::session::{AppSession, OpenDocument, OpenOptions};
use crate::timestamps::FileTimestamps;

/// A single document to convert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub source: PathBuf,
    /// Source extension including the leading dot, empty if there is none.
    pub source_extension: String,
    pub destination: PathBuf,
    pub format: SaveFormat,
    pub delete_existing: bool,
    pub delete_original: bool,
    pub reset_template: bool,
    pub open: OpenOptions,
}

impl ConversionRequest {
    /// Build the request for `source`, rejecting it when the destination
    /// would overwrite the source itself.
    pub fn new(source: PathBuf, options: &ConvertOptions) -> Result<Self, ConvertError> {
        let format = options.target_format.save_format();
        let source_extension = source
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        let destination = destination_path(&source, &source_extension, format.extension);
        if destination == source {
            return Err(ConvertError::SamePath(source));
        }

        Ok(Self {
            source,
            source_extension,
            destination,
            format,
            delete_existing: options.delete_existing,
            delete_original: options.delete_original,
            reset_template: options.reset_template,
            open: OpenOptions {
                read_only: true,
                suppress_macros: options.suppress_macros,
            },
        })
    }
}

/// Derive the destination by replacing the first occurrence of
/// `source_extension` anywhere in the path with `.{target_extension}`.
///
/// The substitution is textual: a directory name containing the
/// extension text is rewritten instead of the file suffix. Paths without
/// an extension get the target extension appended.
pub fn destination_path(source: &Path, source_extension: &str, target_extension: &str) -> PathBuf {
    let target = format!(".{target_extension}");
    match source.to_str() {
        Some(text) if !source_extension.is_empty() => {
            PathBuf::from(text.replacen(source_extension, &target, 1))
        }
        Some(text) => PathBuf::from(format!("{text}{target}")),
        None => source.with_extension(target_extension),
    }
}

/// Convert one document in an already running session.
///
/// The document is closed on every exit path; the session is left to
/// its owner.
pub fn convert(session: &mut dyn AppSession, request: &ConversionRequest) -> Result<(), ConvertError> {
    let source = &request.source;
    let destination = &request.destination;
    let timestamps = FileTimestamps::capture(source).map_err(|e| ConvertError::Open {
        path: source.clone(),
        message: e.to_string(),
    })?;

    let mut document = OpenDocument::open(session, source, &request.open)?;
    tracing::debug!(path = %source.display(), id = document.id().0, "document opened");

    if request.reset_template {
        document.attach_template()?;
    }

    if request.delete_existing && destination.exists() {
        fs::remove_file(destination).map_err(|e| ConvertError::Save {
            path: source.clone(),
            message: format!("removing existing {}: {e}", destination.display()),
        })?;
        tracing::debug!(path = %destination.display(), "removed existing destination");
    }

    document.save_as(destination, request.format)?;
    document.close()?;

    timestamps.apply(destination).map_err(|e| ConvertError::Save {
        path: source.clone(),
        message: format!("copying timestamps to {}: {e}", destination.display()),
    })?;

    if request.delete_original && destination.exists() {
        fs::remove_file(source).map_err(|e| ConvertError::Save {
            path: source.clone(),
            message: format!("deleting original: {e}"),
        })?;
        tracing::debug!(path = %source.display(), "deleted original");
    }

    tracing::info!(
        source = %source.display(),
        destination = %destination.display(),
        "converted"
    );
    Ok(())
}
