// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Current-persona selection.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use futures_util::future::{self, BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Single-slot store for the selected persona id.
pub trait SelectionStore: Send + Sync {
    fn get(&self) -> BoxFuture<'_, Result<Option<String>>>;
    fn set(&self, id: String) -> BoxFuture<'_, Result<()>>;
    fn clear(&self) -> BoxFuture<'_, Result<()>>;
}

#[derive(Default)]
pub struct MemorySelection {
    current: RwLock<Option<String>>,
}

impl MemorySelection {
    pub fn new() -> Self {
        Self::default()
    }

    fn replace(&self, value: Option<String>) -> Result<()> {
        let mut guard = self
            .current
            .write()
            .map_err(|_| Error::Poisoned("selection"))?;
        *guard = value;
        Ok(())
    }
}

impl SelectionStore for MemorySelection {
    fn get(&self) -> BoxFuture<'_, Result<Option<String>>> {
        let result = self
            .current
            .read()
            .map(|guard| guard.clone())
            .map_err(|_| Error::Poisoned("selection"));
        future::ready(result).boxed()
    }

    fn set(&self, id: String) -> BoxFuture<'_, Result<()>> {
        future::ready(self.replace(Some(id))).boxed()
    }

    fn clear(&self) -> BoxFuture<'_, Result<()>> {
        future::ready(self.replace(None)).boxed()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SelectionFile {
    persona_id: Option<String>,
}

/// Selection persisted as a small JSON file.
pub struct FileSelection {
    path: PathBuf,
}

impl FileSelection {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(FileSelection { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        let file: SelectionFile = serde_json::from_str(&content)?;
        Ok(file.persona_id)
    }

    fn write(&self, persona_id: Option<String>) -> Result<()> {
        let tmp = self.path.with_extension("tmp");
        {
            let mut file = File::create(&tmp)?;
            let json = serde_json::to_string(&SelectionFile { persona_id })?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl SelectionStore for FileSelection {
    fn get(&self) -> BoxFuture<'_, Result<Option<String>>> {
        future::ready(self.read()).boxed()
    }

    fn set(&self, id: String) -> BoxFuture<'_, Result<()>> {
        future::ready(self.write(Some(id))).boxed()
    }

    fn clear(&self) -> BoxFuture<'_, Result<()>> {
        future::ready(self.write(None)).boxed()
    }
}

#[cfg(test)]
#[path = "selection_tests.rs"]
mod tests;
