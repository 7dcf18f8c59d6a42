//! `docgraph check` command implementation.

use clap::Args;
use docgraph_site::{Category, Document, Snapshot, find_markers};

use super::ContentArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    #[command(flatten)]
    pub content: ContentArgs,

    /// Treat warnings (unresolved parents, malformed markers) as errors.
    #[arg(long)]
    strict: bool,
}

impl CheckArgs {
    /// Execute the check command.
    ///
    /// # Errors
    ///
    /// Returns an error if any category fails to aggregate, or if warnings
    /// were found in strict mode.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let ctx = self.content.load()?;

        output.info(&format!(
            "Content: {}",
            ctx.config.content_resolved.root.display()
        ));

        let mut warnings = 0;
        for category in Category::ALL {
            let snapshot = ctx.store.snapshot(category)?;
            output.highlight(&format!("{category}"));

            for version in snapshot.versions() {
                let main = ctx.store.version_documents(category, version)?;
                let features = ctx.store.feature_documents(category, version)?;
                output.info(&format!(
                    "  v{version}: {} documents, {} optional feature documents",
                    main.len(),
                    features.len()
                ));
            }

            for problem in problems(&snapshot) {
                output.warning(&format!("  {problem}"));
                warnings += 1;
            }
        }

        if warnings > 0 && self.strict {
            return Err(CliError::Validation(format!(
                "{warnings} warning(s) found"
            )));
        }
        if warnings > 0 {
            output.warning(&format!("Check finished with {warnings} warning(s)"));
        } else {
            output.success("Check passed");
        }
        Ok(())
    }
}

/// Non-fatal problems in a snapshot.
fn problems(snapshot: &Snapshot) -> Vec<String> {
    let mut problems = Vec::new();
    for doc in snapshot.documents() {
        if !doc.is_root() && snapshot.get(&doc.parent_slug).is_none() {
            problems.push(format!(
                "{}: parent {} does not exist",
                doc.slug, doc.parent_slug
            ));
        }
        problems.extend(marker_problems(doc));
    }
    problems
}

fn marker_problems(doc: &Document) -> impl Iterator<Item = String> + '_ {
    find_markers(&doc.content)
        .into_iter()
        .filter_map(move |found| {
            found
                .marker
                .err()
                .map(|e| format!("{}: {} at byte {}", doc.slug, e, found.range.start))
        })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use docgraph_site::{DocumentStore, StoreConfig};
    use docgraph_storage::FsStorage;

    use super::*;

    fn write(root: &std::path::Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_problems_reports_orphans_and_bad_markers() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        write(root, "docs/v6/index.md", "[CHILDREN]");
        write(root, "docs/v6/guide/intro.md", "[CHILDREN bogus]");

        let store = DocumentStore::new(
            Arc::new(FsStorage::new(PathBuf::from(root))),
            StoreConfig {
                versions: vec!["6".to_owned()],
                ..StoreConfig::default()
            },
        );
        let snapshot = store.snapshot(Category::Docs).unwrap();

        let problems = problems(&snapshot);

        assert_eq!(problems.len(), 2);
        assert!(problems[0].contains("parent /en/6/guide/ does not exist"));
        assert!(problems[1].contains("unknown marker attribute 'bogus'"));
    }
}
