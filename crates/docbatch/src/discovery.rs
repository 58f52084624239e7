//! Source path resolution: a single file, or a recursive walk of a
//! directory filtered by a glob on the file name.

use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use walkdir::WalkDir;

use crate::error::ConvertError;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Lazy sequence of documents to convert.
///
/// Directory walks are sorted by file name within each directory, so the
/// order is stable across runs over the same tree.
pub enum Discovery {
    Single(Option<PathBuf>),
    Walk {
        walker: walkdir::IntoIter,
        pattern: Pattern,
    },
}

/// Resolve `source` into the documents to convert.
///
/// A file source yields exactly that file, whatever `include_filter` says.
pub fn resolve(source: &Path, include_filter: &str) -> Result<Discovery, ConvertError> {
    if source.as_os_str().is_empty() {
        tracing::warn!("no source path given, nothing to convert");
        return Err(ConvertError::SourcePathMissing);
    }

    let metadata = match std::fs::metadata(source) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path = %source.display(), "source path does not exist");
            return Err(ConvertError::SourceNotFound(source.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };

    if metadata.is_file() {
        return Ok(Discovery::Single(Some(source.to_path_buf())));
    }

    let pattern = Pattern::new(include_filter)
        .map_err(|e| ConvertError::InvalidFilter(format!("{include_filter}: {e}")))?;
    tracing::debug!(dir = %source.display(), filter = include_filter, "walking source directory");

    Ok(Discovery::Walk {
        walker: WalkDir::new(source)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter(),
        pattern,
    })
}

impl Iterator for Discovery {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        match self {
            Self::Single(path) => path.take(),
            Self::Walk { walker, pattern } => loop {
                let entry = match walker.next()? {
                    Ok(entry) => entry,
                    Err(e) => {
                        tracing::warn!("skipping unreadable entry: {e}");
                        continue;
                    }
                };
                if !entry.file_type().is_file() {
                    continue;
                }
                let name = entry.file_name().to_string_lossy();
                if pattern.matches_with(&name, MATCH_OPTIONS) {
                    return Some(entry.into_path());
                }
            },
        }
    }
}
