//! `docgraph children` command implementation.

use clap::Args;
use docgraph_site::{ChildrenOptions, Hierarchy, parse_marker};

use super::ContentArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the children command.
#[derive(Args)]
pub(crate) struct ChildrenArgs {
    #[command(flatten)]
    pub content: ContentArgs,

    /// Slug of the parent document.
    slug: String,

    /// Full `[CHILDREN ...]` marker to evaluate instead of the filter flags.
    #[arg(long, conflicts_with_all = ["folder", "exclude", "only", "include_folders", "reverse"])]
    marker: Option<String>,

    /// List the children of this child folder.
    #[arg(long)]
    folder: Option<String>,

    /// Names to leave out, comma-separated.
    #[arg(long, value_delimiter = ',')]
    exclude: Vec<String>,

    /// Names to keep, comma-separated.
    #[arg(long, value_delimiter = ',')]
    only: Vec<String>,

    /// Include child folders.
    #[arg(long)]
    include_folders: bool,

    /// Reverse the result.
    #[arg(long)]
    reverse: bool,

    /// Print the result as JSON.
    #[arg(long)]
    json: bool,
}

impl ChildrenArgs {
    /// Execute the children command.
    ///
    /// # Errors
    ///
    /// Returns an error if aggregation fails, the marker is malformed, or no
    /// document has the slug.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let ctx = self.content.load()?;
        let snapshot = ctx.store.snapshot(ctx.category)?;
        let hierarchy = Hierarchy::new(&snapshot);

        let doc = snapshot
            .get(&self.slug)
            .ok_or_else(|| CliError::NotFound(self.slug.clone()))?;

        let children = if let Some(marker) = &self.marker {
            parse_marker(marker)?.query(&hierarchy, doc)
        } else {
            let options = ChildrenOptions {
                folder_name: self.folder,
                exclude: self.exclude,
                only: self.only,
                include_folders: self.include_folders,
                reverse: self.reverse,
            };
            hierarchy.get_children_filtered(doc, &options)
        };

        if self.json {
            output.result(&serde_json::to_string_pretty(&children)?);
        } else {
            for child in &children {
                output.entry(0, &child.title, &child.slug);
            }
        }
        Ok(())
    }
}
