//! `docgraph show` command implementation.

use clap::Args;

use super::ContentArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the show command.
#[derive(Args)]
pub(crate) struct ShowArgs {
    #[command(flatten)]
    pub content: ContentArgs,

    /// Document slug, e.g. /en/6/getting-started/.
    slug: String,

    /// Omit the markdown body.
    #[arg(long)]
    no_content: bool,
}

impl ShowArgs {
    /// Execute the show command.
    ///
    /// # Errors
    ///
    /// Returns an error if aggregation fails or no document has the slug.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let ctx = self.content.load()?;

        let mut doc = ctx
            .store
            .get_document_by_slug(ctx.category, &self.slug)?
            .ok_or_else(|| CliError::NotFound(self.slug.clone()))?;
        if self.no_content {
            doc.content.clear();
        }

        output.result(&serde_json::to_string_pretty(&doc)?);
        Ok(())
    }
}
