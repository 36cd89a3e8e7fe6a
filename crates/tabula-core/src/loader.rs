//! Reads [`TableDescriptor`]s from a directory, one JSON file per table.
//!
//! The table name is the file name up to its first `.`, so `posts.json` and
//! `posts` both describe table `posts`. Hidden files are ignored.

use std::{
  fs,
  path::{Path, PathBuf},
};

use crate::descriptor::{ColumnDescriptor, DescriptorError, TableDescriptor};

/// The outcome of scanning a descriptor directory.
///
/// A malformed file only disqualifies its own table; the other descriptors are
/// still returned so they can be applied.
#[derive(Debug, Default)]
pub struct LoadedDescriptors {
  /// Valid descriptors, sorted by table name.
  pub tables: Vec<TableDescriptor>,
  pub errors: Vec<DescriptorError>,
}

impl LoadedDescriptors {
  pub fn is_complete(&self) -> bool { self.errors.is_empty() }
}

/// Scan `dir` and decode every descriptor in it.
///
/// Fails outright only when the directory itself cannot be listed.
pub fn load_descriptors(
  dir: impl AsRef<Path>,
) -> Result<LoadedDescriptors, DescriptorError> {
  let dir = dir.as_ref();
  let directory_error = |source| DescriptorError::Directory {
    path: dir.display().to_string(),
    source,
  };

  let mut paths: Vec<PathBuf> = Vec::new();
  for entry in fs::read_dir(dir).map_err(directory_error)? {
    let entry = entry.map_err(directory_error)?;
    let path = entry.path();
    if path.is_file() {
      paths.push(path);
    }
  }
  paths.sort();

  let mut loaded = LoadedDescriptors::default();
  let mut sources: Vec<(String, String)> = Vec::new();

  for path in paths {
    let Some(table) = table_name(&path) else {
      tracing::debug!(path = %path.display(), "skipping hidden file");
      continue;
    };

    if let Some((_, first)) = sources.iter().find(|(t, _)| *t == table) {
      loaded.errors.push(DescriptorError::DuplicateTable {
        table,
        first:  first.clone(),
        second: path.display().to_string(),
      });
      continue;
    }
    sources.push((table.clone(), path.display().to_string()));

    match load_descriptor(&path, table) {
      Ok(descriptor) => loaded.tables.push(descriptor),
      Err(e) => loaded.errors.push(e),
    }
  }

  loaded.tables.sort_by(|a, b| a.name.cmp(&b.name));
  Ok(loaded)
}

/// Decode a single descriptor file as table `table`.
pub fn load_descriptor(
  path: &Path,
  table: String,
) -> Result<TableDescriptor, DescriptorError> {
  let text = fs::read_to_string(path).map_err(|source| DescriptorError::Read {
    path: path.display().to_string(),
    source,
  })?;
  let columns: Vec<ColumnDescriptor> =
    serde_json::from_str(&text).map_err(|source| DescriptorError::Parse {
      path: path.display().to_string(),
      source,
    })?;
  TableDescriptor::new(table, columns)
}

/// File name up to the first `.`; `None` for hidden files.
fn table_name(path: &Path) -> Option<String> {
  let file_name = path.file_name()?.to_str()?;
  let stem = file_name.split('.').next().unwrap_or_default();
  (!stem.is_empty()).then(|| stem.to_owned())
}
