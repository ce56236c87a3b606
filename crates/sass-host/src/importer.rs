//! Stylesheet import resolution.

use crate::options::Syntax;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use url::Url;

/// A custom importer: host code that resolves `@use`/`@import` URLs.
///
/// Both operations may suspend. An error from either is reported to
/// the compiler, which turns it into a compilation failure at the rule
/// that triggered the load.
#[async_trait]
pub trait Importer: Send + Sync {
    /// Resolve `url` to a canonical absolute URL, or `None` when this
    /// importer does not recognize it. `from_import` distinguishes
    /// `@import` from `@use`/`@forward`, for importers that resolve
    /// the legacy rule differently.
    async fn canonicalize(&self, url: &str, from_import: bool) -> anyhow::Result<Option<Url>>;

    /// Load the stylesheet at a canonical URL this importer produced.
    async fn load(&self, canonical_url: &Url) -> anyhow::Result<ImporterResults>;
}

/// A loaded stylesheet.
#[derive(Debug, Clone)]
pub struct ImporterResults {
    pub contents: String,
    pub syntax: Syntax,
    /// Where the contents claim to live, for source maps.
    pub source_map_url: Option<Url>,
}

impl ImporterResults {
    pub fn new(contents: impl Into<String>, syntax: Syntax) -> Self {
        ImporterResults {
            contents: contents.into(),
            syntax,
            source_map_url: None,
        }
    }
}

/// One slot in a compilation's importer list.
#[derive(Clone)]
pub enum ImportResolver {
    /// A directory the compiler searches itself, using the standard
    /// Sass extension and partial-underscore rules.
    LoadPath(PathBuf),
    /// A custom importer serviced by the host.
    Importer(Arc<dyn Importer>),
}

impl ImportResolver {
    /// Convenience wrapper over [`ImportResolver::Importer`].
    pub fn custom(importer: impl Importer + 'static) -> Self {
        ImportResolver::Importer(Arc::new(importer))
    }
}

impl std::fmt::Debug for ImportResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportResolver::LoadPath(path) => f.debug_tuple("LoadPath").field(path).finish(),
            ImportResolver::Importer(_) => f.write_str("Importer(..)"),
        }
    }
}
