use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ConvertError;
use crate::format::SaveFormat;

/// Include filter used when the source is a directory.
pub const DEFAULT_INCLUDE_FILTER: &str = "*.doc";

/// Target formats selectable by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetFormat {
    /// The application's current default document format.
    #[default]
    Default,
    Pdf,
    Xps,
    Html,
}

impl TargetFormat {
    /// All selectable formats, in display order.
    pub const ALL: [Self; 4] = [Self::Default, Self::Pdf, Self::Xps, Self::Html];

    /// Resolve the save-as code and destination extension.
    pub fn save_format(self) -> SaveFormat {
        match self {
            Self::Default => SaveFormat::DOCUMENT_DEFAULT,
            Self::Pdf => SaveFormat::PDF,
            Self::Xps => SaveFormat::XPS,
            Self::Html => SaveFormat::FILTERED_HTML,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::Pdf => "PDF",
            Self::Xps => "XPS",
            Self::Html => "HTML",
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TargetFormat {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConvertError::UnsupportedFormat(s.to_string()))
    }
}

/// Options controlling a batch run.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// File or directory to convert.
    pub source: PathBuf,
    /// Glob matched against file names when `source` is a directory.
    pub include_filter: String,
    pub target_format: TargetFormat,
    /// Delete a destination file that already exists before saving.
    pub delete_existing: bool,
    /// Delete the source document once the destination exists.
    pub delete_original: bool,
    /// Log a failed document and move on instead of aborting the run.
    pub continue_on_error: bool,
    /// Launch a fresh application session for every document.
    pub instance_per_file: bool,
    /// Reattach each document to the default template before saving.
    pub reset_template: bool,
    /// Keep document macros from running when a document is opened.
    pub suppress_macros: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            source: PathBuf::new(),
            include_filter: DEFAULT_INCLUDE_FILTER.to_string(),
            target_format: TargetFormat::Default,
            delete_existing: false,
            delete_original: false,
            continue_on_error: false,
            instance_per_file: false,
            reset_template: false,
            suppress_macros: true,
        }
    }
}

impl ConvertOptions {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }
}
