//! Configuration for the viewer.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::graph::Layout;
use crate::loader::DEFAULT_HEADER_LINES;
use crate::session::DEFAULT_POINT_BUDGET;

/// Viewer settings; every field has a default so a config file may be partial.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ViewerConfig {
    /// Address the HTTP server listens on
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Instrument-settings lines before the CSV header
    #[serde(default = "default_header_lines")]
    pub header_lines: usize,

    /// Point budget used for a fresh upload
    #[serde(default = "default_points")]
    pub default_points: i64,

    /// Largest accepted upload in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    #[serde(default)]
    pub default_layout: Layout,
}

fn default_bind_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_header_lines() -> usize {
    DEFAULT_HEADER_LINES
}

fn default_points() -> i64 {
    DEFAULT_POINT_BUDGET
}

fn default_max_upload_bytes() -> usize {
    64 * 1024 * 1024
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            header_lines: default_header_lines(),
            default_points: default_points(),
            max_upload_bytes: default_max_upload_bytes(),
            default_layout: Layout::default(),
        }
    }
}

impl ViewerConfig {
    /// Load configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: ViewerConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Load from `path` if given, otherwise use defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }
}
