//! Taxonomy loading and export service
//!
//! Reads a source file (CSV or JSON records), builds the tree under a
//! synthesized root and writes record or nested projections back out.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::codec::{decode_records, encode_nested, encode_records, SourceFormat};
use crate::application::{ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{Taxonomy, TaxonomyBuilder};
use crate::infrastructure::traits::FileSystem;

/// Loads and exports taxonomies through the filesystem boundary.
pub struct TaxonomyService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
}

impl TaxonomyService {
    /// Create a new taxonomy service.
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self { fs, settings }
    }

    fn builder(&self) -> TaxonomyBuilder {
        TaxonomyBuilder::new(self.settings.label.clone(), self.settings.version.clone())
            .include_metadata(self.settings.include_metadata)
    }

    /// Load a taxonomy from `path`.
    ///
    /// The format is taken from `format` when given, otherwise from the file
    /// extension. Unknown formats fail before the file is read.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path, format: Option<SourceFormat>) -> ApplicationResult<Taxonomy> {
        let format = match format {
            Some(f) => f,
            None => SourceFormat::from_path(path)?,
        };
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read taxonomy", path)?;

        let records = decode_records(&content, format)?;
        let taxonomy = self.builder().build(&records)?;
        info!(
            "loaded {} items from {} ({})",
            taxonomy.len(),
            path.display(),
            format
        );
        Ok(taxonomy)
    }

    /// Build a taxonomy from an in-memory source.
    pub fn parse(&self, content: &str, format: SourceFormat) -> ApplicationResult<Taxonomy> {
        let records = decode_records(content, format)?;
        Ok(self.builder().build(&records)?)
    }

    /// Write every item as a flat record, breadth-first from the root.
    ///
    /// The synthesized root is skipped so that the output loads back into
    /// an equivalent taxonomy.
    #[instrument(level = "debug", skip(self, taxonomy))]
    pub fn export_records(
        &self,
        taxonomy: &Taxonomy,
        path: &Path,
        format: SourceFormat,
    ) -> ApplicationResult<usize> {
        let root_id = taxonomy.id_of(taxonomy.require_root()?);
        let records: Vec<_> = taxonomy
            .items_to_records()?
            .into_iter()
            .filter(|r| Some(r.id) != root_id)
            .map(|mut r| {
                if r.parent == root_id {
                    r.parent = None;
                }
                r
            })
            .collect();

        let content = encode_records(&records, format)?;
        self.write(path, &content)?;
        debug!("exported {} records", records.len());
        Ok(records.len())
    }

    /// Write the nested projection of the whole taxonomy as JSON.
    #[instrument(level = "debug", skip(self, taxonomy))]
    pub fn export_nested(&self, taxonomy: &Taxonomy, path: &Path) -> ApplicationResult<()> {
        let nested = taxonomy.tree_to_nested()?;
        let content = encode_nested(&nested)?;
        self.write(path, &content)
    }

    fn write(&self, path: &Path, content: &str) -> ApplicationResult<()> {
        self.fs
            .ensure_parent(path)
            .with_path_context("create parent directory", path)?;
        self.fs
            .write(path, content)
            .with_path_context("write taxonomy", path)?;
        info!("wrote {}", path.display());
        Ok(())
    }
}
