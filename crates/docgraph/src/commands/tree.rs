//! `docgraph tree` command implementation.

use clap::Args;
use docgraph_site::{Document, Hierarchy, normalize_version, sort_documents};

use super::ContentArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the tree command.
#[derive(Args)]
pub(crate) struct TreeArgs {
    #[command(flatten)]
    pub content: ContentArgs,

    /// Only print this version.
    #[arg(long)]
    version: Option<String>,

    /// Include documents flagged `hideSelf`.
    #[arg(long)]
    all: bool,
}

impl TreeArgs {
    /// Execute the tree command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or aggregation fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let ctx = self.content.load()?;
        let snapshot = ctx.store.snapshot(ctx.category)?;
        let hierarchy = Hierarchy::new(&snapshot);
        let wanted = self.version.as_deref().map(normalize_version);

        let roots: Vec<Document> = snapshot
            .documents()
            .iter()
            .filter(|doc| doc.is_root())
            .filter(|doc| wanted.is_none_or(|v| doc.version == v))
            .cloned()
            .collect();

        if roots.is_empty() {
            output.warning("No documents found");
            return Ok(());
        }

        let printer = TreePrinter {
            output: &output,
            hierarchy: &hierarchy,
            show_hidden: self.all,
        };
        for root in sort_documents(&roots) {
            printer.print(&root, 0);
        }
        Ok(())
    }
}

struct TreePrinter<'a> {
    output: &'a Output,
    hierarchy: &'a Hierarchy<'a>,
    show_hidden: bool,
}

impl TreePrinter<'_> {
    fn print(&self, doc: &Document, depth: usize) {
        self.output.entry(depth, &doc.title, &doc.slug);
        for child in self.hierarchy.get_children(doc, true) {
            if child.hide_self && !self.show_hidden {
                continue;
            }
            self.print(&child, depth + 1);
        }
    }
}
