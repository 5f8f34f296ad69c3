//! Upload limit configuration

use serde::{Deserialize, Serialize};

use crate::core::ingest::UploadLimits;

/// Limits applied while ingesting a multipart upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Maximum size of a single image in bytes
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: usize,
    /// Maximum number of images per request
    #[serde(default = "default_max_files")]
    pub max_files: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: default_max_file_bytes(),
            max_files: default_max_files(),
        }
    }
}

impl UploadConfig {
    /// Convert into the limits the ingester enforces.
    pub fn limits(&self) -> UploadLimits {
        UploadLimits {
            max_file_bytes: self.max_file_bytes,
            max_files: self.max_files,
        }
    }

    /// Validate upload configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_file_bytes == 0 {
            return Err("max_file_bytes cannot be 0".to_string());
        }
        if self.max_files == 0 {
            return Err("max_files cannot be 0".to_string());
        }
        Ok(())
    }
}

fn default_max_file_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_max_files() -> usize {
    20
}
