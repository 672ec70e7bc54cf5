//! Configuration loader - YAML manifest of model views
//!
//! Each view pairs a dataset file with the embedding field to plot, so the
//! same pipeline serves every embedding model without duplication.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_cap() -> usize {
    1000
}

/// Main configuration loaded from views.yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Annotation cap applied until the user changes it
    #[serde(default = "default_cap")]
    pub default_cap: usize,
    pub views: Vec<ModelView>,
}

/// One visualization instance: a dataset plus the embedding field to read
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelView {
    pub id: String,
    pub name: String,
    /// Path to the dataset JSON file
    pub data: String,
    /// Model-qualified coordinate field, e.g. "clip_embedding_2d"
    pub embedding_key: String,
}

impl Config {
    /// Load configuration from YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Get a view by ID
    pub fn get_view(&self, id: &str) -> Option<&ModelView> {
        self.views.iter().find(|v| v.id == id)
    }
}
