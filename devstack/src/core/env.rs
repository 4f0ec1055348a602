//! Snapshot of a process environment that child commands inherit.
//!
//! Names and values are kept as `OsString`, so variables that are not valid
//! unicode pass through to the child unchanged.

use std::collections::BTreeMap;
use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

const PATH_KEY: &str = "PATH";

/// Ordered environment map.
///
/// Keys are matched case-insensitively on Windows, where `Path` and `PATH`
/// name the same variable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessEnv {
    vars: BTreeMap<OsString, OsString>,
}

impl ProcessEnv {
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&OsStr> {
        self.vars.get(&self.resolve_key(key)).map(OsString::as_os_str)
    }

    /// Value of `key` for display; non-unicode bytes are replaced.
    pub fn get_lossy(&self, key: &str) -> String {
        self.get(key)
            .map(|value| value.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn set(&mut self, key: &str, value: impl Into<OsString>) {
        let key = self.resolve_key(key);
        self.vars.insert(key, value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<OsString> {
        let key = self.resolve_key(key);
        self.vars.remove(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OsStr, &OsStr)> {
        self.vars.iter().map(|(k, v)| (k.as_os_str(), v.as_os_str()))
    }

    /// Entries of `PATH`, in lookup order.
    pub fn path_entries(&self) -> Vec<PathBuf> {
        self.get(PATH_KEY)
            .map(|value| env::split_paths(value).collect())
            .unwrap_or_default()
    }

    /// Put `dir` in front of `PATH` so its executables win lookup.
    pub fn prepend_path(&mut self, dir: &Path) -> Result<()> {
        let mut entries = vec![dir.to_path_buf()];
        entries.extend(self.path_entries());
        let joined = env::join_paths(entries)
            .with_context(|| format!("add {} to PATH", dir.display()))?;
        self.set(PATH_KEY, joined);
        Ok(())
    }

    fn resolve_key(&self, key: &str) -> OsString {
        if cfg!(windows)
            && let Some(existing) = self
                .vars
                .keys()
                .find(|k| k.to_str().is_some_and(|k| k.eq_ignore_ascii_case(key)))
        {
            return existing.clone();
        }
        OsString::from(key)
    }
}
