//! CLI command implementations.

pub(crate) mod check;
pub(crate) mod children;
pub(crate) mod show;
pub(crate) mod tree;

pub(crate) use check::CheckArgs;
pub(crate) use children::ChildrenArgs;
pub(crate) use show::ShowArgs;
pub(crate) use tree::TreeArgs;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use docgraph_config::{CliSettings, Config};
use docgraph_site::{Category, DocumentStore, StoreConfig};
use docgraph_storage::{FsStorage, Storage};

use crate::error::CliError;

/// Content selection arguments shared by every command.
#[derive(Args)]
pub(crate) struct ContentArgs {
    /// Path to configuration file (default: auto-discover docgraph.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Content root directory (overrides config).
    #[arg(short = 'r', long, env = "DOCGRAPH_CONTENT_ROOT")]
    content_root: Option<PathBuf>,

    /// Category to query: docs or user (overrides config).
    #[arg(long)]
    category: Option<String>,

    /// Versions to aggregate, comma-separated (overrides config).
    #[arg(long, value_delimiter = ',')]
    versions: Option<Vec<String>>,

    /// Enable verbose output (show aggregation timing logs).
    #[arg(short, long)]
    pub verbose: bool,
}

/// Loaded configuration with a ready document store.
pub(crate) struct Context {
    pub config: Config,
    pub category: Category,
    pub store: DocumentStore,
}

impl ContentArgs {
    /// Load configuration and create the document store.
    pub(crate) fn load(self) -> Result<Context, CliError> {
        let cli_settings = CliSettings {
            content_root: self.content_root,
            category: self.category,
            versions: self.versions,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let category = config.site.category.parse::<Category>()?;
        tracing::debug!(
            config = ?config.config_path,
            root = %config.content_resolved.root.display(),
            %category,
            "Configuration loaded"
        );

        let storage: Arc<dyn Storage> =
            Arc::new(FsStorage::new(config.content_resolved.root.clone()));
        let store = DocumentStore::new(storage, store_config(&config));

        Ok(Context {
            config,
            category,
            store,
        })
    }
}

/// Map resolved content settings onto the store configuration.
fn store_config(config: &Config) -> StoreConfig {
    let content = &config.content_resolved;
    StoreConfig {
        versions: content.versions.clone(),
        docs_root: PathBuf::from(&content.docs_dir),
        user_root: PathBuf::from(&content.user_dir),
        features_dir: content.features_dir.clone(),
        legacy_dir: content.legacy_dir.clone(),
        deprecated_features: content.deprecated_features.clone(),
    }
}
