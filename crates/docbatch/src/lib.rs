pub mod batch;
pub mod config;
pub mod discovery;
pub mod error;
pub mod executor;
pub mod format;
pub mod session;
pub mod soffice;
pub mod timestamps;

use std::path::PathBuf;

use config::ConvertOptions;
use error::ConvertError;
use soffice::SofficeLauncher;

/// Convert the documents selected by `options` with LibreOffice found on `PATH`.
pub fn convert(options: &ConvertOptions) -> Result<(), ConvertError> {
    convert_with_program(options, None)
}

/// Convert the documents selected by `options` with a specific office executable.
pub fn convert_with_program(
    options: &ConvertOptions,
    program: Option<PathBuf>,
) -> Result<(), ConvertError> {
    let launcher = SofficeLauncher::new(program);
    batch::run(options, &launcher)
}
