use anyhow::{Context, Result, bail};
use log::debug;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

use super::deep_merge;

/// In-memory view of the declaration document with a load/sync/save discipline.
///
/// Edits are applied to the in-memory copy and recorded as pending.
/// [`ConfigStore::sync`] re-reads the file and replays only the pending edits
/// on top of it, so keys the caller never touched pick up whatever is on disk
/// now, and keys the caller did touch keep the caller's value. There is no
/// locking: two invocations racing on the same key still end up
/// last-writer-wins.
pub struct ConfigStore<'a, R: Runtime> {
    runtime: &'a R,
    path: PathBuf,
    document: Map<String, Value>,
    /// Values set or merged since load, replayed against the disk copy on sync.
    pending: Map<String, Value>,
    /// Key paths deleted in memory, replayed against the disk copy on sync.
    removed: Vec<Vec<String>>,
}

impl<'a, R: Runtime> ConfigStore<'a, R> {
    /// Read and parse the document at `path`.
    #[tracing::instrument(skip(runtime, path))]
    pub fn load(runtime: &'a R, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !runtime.exists(&path) {
            bail!("Config file {:?} not found", path);
        }
        let document = Self::read(runtime, &path)?;
        debug!("Loaded {} top-level key(s) from {:?}", document.len(), path);

        Ok(Self {
            runtime,
            path,
            document,
            pending: Map::new(),
            removed: Vec::new(),
        })
    }

    fn read(runtime: &R, path: &Path) -> Result<Map<String, Value>> {
        let content = runtime
            .read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let value: Value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        match value {
            Value::Object(map) => Ok(map),
            _ => bail!("Config file {:?} does not contain a JSON object", path),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn document(&self) -> &Map<String, Value> {
        &self.document
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.document.get(key)
    }

    pub fn get_or<'v>(&'v self, key: &str, fallback: &'v Value) -> &'v Value {
        self.document.get(key).unwrap_or(fallback)
    }

    pub fn has(&self, key: &str) -> bool {
        self.document.contains_key(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        self.document.insert(key.clone(), value.clone());
        self.pending.insert(key, value);
    }

    /// Delete a top-level key, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.remove_path(&[key])
    }

    /// Delete the value at a nested key path, returning it.
    ///
    /// The deletion is remembered and replayed on every later sync, so the key
    /// stays gone even though the file on disk still holds it.
    pub fn remove_path(&mut self, path: &[&str]) -> Option<Value> {
        let owned: Vec<String> = path.iter().map(|s| s.to_string()).collect();
        let previous = remove_in(&mut self.document, &owned);
        remove_in(&mut self.pending, &owned);
        if !self.removed.contains(&owned) {
            self.removed.push(owned);
        }
        previous
    }

    /// Deep-merge `patch` into the in-memory document.
    pub fn assign(&mut self, patch: Map<String, Value>) {
        deep_merge(&mut self.document, patch.clone());
        deep_merge(&mut self.pending, patch);
    }

    /// Re-read the file and replay pending edits on top of it.
    ///
    /// Deletions are replayed before values, so a key set after being
    /// removed comes back with the new value.
    #[tracing::instrument(skip(self))]
    pub fn sync(&mut self) -> Result<()> {
        let mut base = Self::read(self.runtime, &self.path)?;
        for path in &self.removed {
            remove_in(&mut base, path);
        }
        deep_merge(&mut base, self.pending.clone());
        self.document = base;
        debug!(
            "Synced {:?} ({} pending key(s), {} removal(s))",
            self.path,
            self.pending.len(),
            self.removed.len()
        );
        Ok(())
    }

    /// Sync, then write the document back as pretty-printed JSON.
    #[tracing::instrument(skip(self))]
    pub fn save(&mut self) -> Result<()> {
        self.sync()?;
        let content = self.to_json()?;
        self.runtime
            .write(self.path(), content.as_bytes())
            .with_context(|| format!("Failed to write config file {:?}", self.path()))
    }

    pub fn to_json(&self) -> Result<String> {
        let mut content = serde_json::to_string_pretty(&self.document)?;
        content.push('\n');
        Ok(content)
    }
}

fn remove_in(map: &mut Map<String, Value>, path: &[String]) -> Option<Value> {
    match path {
        [] => None,
        [key] => map.shift_remove(key),
        [key, rest @ ..] => match map.get_mut(key) {
            Some(Value::Object(inner)) => remove_in(inner, rest),
            _ => None,
        },
    }
}
