//! Filesystem infrastructure: implements the `LocalFs` port.

use std::path::Path;

use anyhow::{Context, Result};

/// Production filesystem implementation of `LocalFs`.
pub struct LocalFs;

impl crate::application::ports::LocalFs for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path).with_context(|| format!("reading file {}", path.display()))
    }
}
