use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use runetime_core::{CatalogData, CatalogError, CatalogLoader, SimulationLimits};
use thiserror::Error;

const BUNDLED_CATALOG: &str = include_str!("../../assets/data/catalog.json");

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Decode(#[from] CatalogError),
}

/// Reads the dataset from a JSON file, or the bundled sample when no path is given.
#[derive(Debug, Clone, Default)]
pub struct FileCatalogLoader {
    path: Option<PathBuf>,
}

impl FileCatalogLoader {
    pub const fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

impl CatalogLoader for FileCatalogLoader {
    type Error = LoaderError;

    fn load_catalog(&self) -> Result<CatalogData, Self::Error> {
        let Some(path) = &self.path else {
            log::debug!("using bundled catalog");
            return Ok(CatalogData::from_json(BUNDLED_CATALOG)?);
        };
        let json = fs::read_to_string(path).map_err(|source| LoaderError::Io {
            path: path.clone(),
            source,
        })?;
        let data = CatalogData::from_json(&json)?;
        log::debug!(
            "loaded {} scales and {} runes from {}",
            data.scales.len(),
            data.runes.len(),
            path.display()
        );
        Ok(data)
    }
}

/// Load simulation limits, falling back to defaults when no file is given.
pub fn load_limits(path: Option<&Path>) -> Result<SimulationLimits> {
    let Some(path) = path else {
        return Ok(SimulationLimits::default());
    };
    let json =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    SimulationLimits::from_json(&json).with_context(|| format!("invalid limits in {}", path.display()))
}
