//! `cedoc decode` command implementation.

use cedoc_annotate::SessionDescriptor;
use clap::Args;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the decode command.
#[derive(Args)]
pub(crate) struct DecodeArgs {
    /// Client-state URL or bare base64 payload.
    url: String,

    /// Print only the source of the first session.
    #[arg(short, long)]
    source: bool,
}

impl DecodeArgs {
    /// Execute the decode command.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL does not carry a valid descriptor.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let descriptor = SessionDescriptor::from_url(self.url.trim())?;

        if self.source {
            let source = descriptor
                .source()
                .ok_or_else(|| CliError::Validation("descriptor has no sessions".to_owned()))?;
            output.result(source)?;
        } else {
            let json = serde_json::to_string_pretty(&descriptor)
                .map_err(cedoc_annotate::SessionError::from)?;
            output.result(&json)?;
        }
        Ok(())
    }
}
