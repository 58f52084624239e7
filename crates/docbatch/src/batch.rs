use std::path::PathBuf;

use crate::config::ConvertOptions;
use crate::discovery;
use crate::error::ConvertError;
use crate::executor::{self, ConversionRequest};
use crate::session::{AppLauncher, SessionGuard};

/// Drives a whole run: resolves the source, then converts each document
/// in discovery order, one at a time.
pub struct BatchConverter<'a> {
    options: &'a ConvertOptions,
    launcher: &'a dyn AppLauncher,
    /// Session reused across documents unless running one per file.
    shared: Option<SessionGuard>,
}

impl<'a> BatchConverter<'a> {
    pub fn new(options: &'a ConvertOptions, launcher: &'a dyn AppLauncher) -> Self {
        Self {
            options,
            launcher,
            shared: None,
        }
    }

    /// Convert every discovered document.
    ///
    /// Returns the first error that stops the run, leaving its reporting to
    /// the caller. Per-document failures are only logged when the options
    /// say to continue on error.
    pub fn run(mut self) -> Result<(), ConvertError> {
        let sources = discovery::resolve(&self.options.source, &self.options.include_filter)?;
        tracing::info!(
            source = %self.options.source.display(),
            format = %self.options.target_format,
            "starting conversion"
        );

        for source in sources {
            match self.convert_one(source.clone()) {
                Ok(()) => {}
                Err(e) if e.is_per_file() && self.options.continue_on_error => {
                    tracing::error!(path = %source.display(), "conversion failed, continuing: {e}");
                }
                Err(e) => return Err(e),
            }
        }

        if let Some(guard) = self.shared.take() {
            if let Err(e) = guard.release() {
                tracing::warn!("failed to quit office session: {e}");
            }
        }
        Ok(())
    }

    fn convert_one(&mut self, source: PathBuf) -> Result<(), ConvertError> {
        let request = ConversionRequest::new(source, self.options)?;

        if self.options.instance_per_file {
            let mut guard = SessionGuard::acquire(self.launcher)?;
            let result = executor::convert(guard.session(), &request);
            if let Err(e) = guard.release() {
                tracing::warn!("failed to quit office session: {e}");
            }
            return result;
        }

        let guard = match self.shared.take() {
            Some(guard) => guard,
            None => SessionGuard::acquire(self.launcher)?,
        };
        let guard = self.shared.insert(guard);
        executor::convert(guard.session(), &request)
    }
}

/// Run a batch conversion with the given session launcher.
pub fn run(options: &ConvertOptions, launcher: &dyn AppLauncher) -> Result<(), ConvertError> {
    BatchConverter::new(options, launcher).run()
}
