//! Static resource classification.
//!
//! The `<include path="..."/>` patterns of `static-resources.xml` are loaded
//! the first time a request is classified and never change afterwards. The
//! verdict for a request is kept in its extensions so later layers do not
//! evaluate the patterns again.

use crate::ant::ant_match;
use crate::config::ConfigError;
use crate::metrics::{STATIC_CONFIG_LOADS_TOTAL, STATIC_REQUESTS_TOTAL};
use axum::http::Request;
use once_cell::sync::OnceCell;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, trace};

/// Per-request memo of the classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticCheck(pub bool);

pub struct StaticResources {
    config_path: PathBuf,
    context_path: String,
    patterns: OnceCell<BTreeSet<String>>,
    loads: AtomicUsize,
}

impl StaticResources {
    pub fn new(config_path: impl Into<PathBuf>, context_path: impl Into<String>) -> Self {
        Self {
            config_path: config_path.into(),
            context_path: context_path.into(),
            patterns: OnceCell::new(),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Patterns in lexicographic order, loading them on first use. Concurrent
    /// first callers block until the single load finishes.
    pub fn patterns(&self) -> Result<&BTreeSet<String>, ConfigError> {
        self.patterns.get_or_try_init(|| self.load())
    }

    /// How many times the definition file has been read.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    fn load(&self) -> Result<BTreeSet<String>, ConfigError> {
        trace!(path = %self.config_path.display(), "reading static resources definition");
        self.loads.fetch_add(1, Ordering::SeqCst);
        STATIC_CONFIG_LOADS_TOTAL.inc();
        if !self.config_path.exists() {
            return Err(ConfigError::Missing(self.config_path.clone()));
        }
        let xml = std::fs::read_to_string(&self.config_path).map_err(|source| {
            ConfigError::Read {
                path: self.config_path.clone(),
                source,
            }
        })?;
        let patterns = parse_patterns(&xml)?;
        debug!(count = patterns.len(), ?patterns, "static path patterns loaded");
        Ok(patterns)
    }

    /// Whether `path` (as requested, context path included) is static.
    pub fn matches(&self, path: &str) -> Result<bool, ConfigError> {
        let hit = self
            .patterns()?
            .iter()
            .any(|p| ant_match(&format!("{}{}", self.context_path, p), path));
        Ok(hit)
    }

    pub fn is_static<B>(&self, req: &mut Request<B>) -> Result<bool, ConfigError> {
        if let Some(StaticCheck(hit)) = req.extensions().get::<StaticCheck>() {
            return Ok(*hit);
        }
        let hit = self.matches(req.uri().path())?;
        req.extensions_mut().insert(StaticCheck(hit));
        STATIC_REQUESTS_TOTAL
            .with_label_values(&[if hit { "static" } else { "dynamic" }])
            .inc();
        Ok(hit)
    }
}

pub fn parse_patterns(xml: &str) -> Result<BTreeSet<String>, ConfigError> {
    let doc = roxmltree::Document::parse(xml)?;
    Ok(doc
        .descendants()
        .filter(|n| n.has_tag_name("include"))
        .filter_map(|n| n.attribute("path"))
        .map(str::to_string)
        .collect())
}
