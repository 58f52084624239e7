//! Save-as format table.
//!
//! Codes follow the word-processing application's save-format
//! enumeration; each entry pairs a code with the extension the saved
//! file receives.

/// A save-as target understood by the office application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SaveFormat {
    /// Numeric save-format code.
    pub code: u32,
    /// Destination file extension, without the leading dot.
    pub extension: &'static str,
}

impl SaveFormat {
    pub const DOCUMENT_97: Self = Self::new(0, "doc");
    pub const TEXT: Self = Self::new(2, "txt");
    pub const RTF: Self = Self::new(6, "rtf");
    pub const FILTERED_HTML: Self = Self::new(10, "html");
    pub const DOCUMENT_DEFAULT: Self = Self::new(16, "docx");
    pub const PDF: Self = Self::new(17, "pdf");
    pub const XPS: Self = Self::new(18, "xps");
    pub const OPEN_DOCUMENT_TEXT: Self = Self::new(23, "odt");

    /// Every entry of the table, selectable or not.
    pub const ALL: [Self; 8] = [
        Self::DOCUMENT_97,
        Self::TEXT,
        Self::RTF,
        Self::FILTERED_HTML,
        Self::DOCUMENT_DEFAULT,
        Self::PDF,
        Self::XPS,
        Self::OPEN_DOCUMENT_TEXT,
    ];

    const fn new(code: u32, extension: &'static str) -> Self {
        Self { code, extension }
    }

    /// Look up a table entry by its numeric code.
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.code == code)
    }

    /// The extension with its leading dot, as used for path substitution.
    pub fn dotted_extension(&self) -> String {
        format!(".{}", self.extension)
    }
}
