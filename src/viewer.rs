// Copyright (C) 2023 Dheatly23
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Application context tying the store to the file system.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{info, warn};

use crate::codec;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::pixels::PixelBuffer;
use crate::store::ImageStore;

#[derive(Debug)]
pub struct Viewer {
    config: Config,
    store: ImageStore,
}

impl Viewer {
    pub fn new(config: Config) -> Self {
        let store = ImageStore::with_config(&config);
        Self { config, store }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &ImageStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ImageStore {
        &mut self.store
    }

    /// Loads one file and selects it.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let id = identifier(path)?;
        let buf = codec::load(path)?;
        self.store.add(id, buf)
    }

    /// Loads several files. Decoding runs in parallel, the store receives
    /// them in the given order. Nothing is added if any file fails.
    pub fn open_all<P>(&mut self, paths: &[P]) -> Result<()>
    where
        P: AsRef<Path> + Sync,
    {
        let decoded: Vec<(String, PixelBuffer)> = paths
            .par_iter()
            .map(|p| -> Result<_> {
                let p = p.as_ref();
                Ok((identifier(p)?, codec::load(p)?))
            })
            .collect::<Result<_>>()?;

        if decoded.len() > self.store.capacity() {
            warn!(
                count = decoded.len(),
                capacity = self.store.capacity(),
                "more images than capacity, oldest will be evicted"
            );
        }
        for (id, buf) in decoded {
            self.store.add(id, buf)?;
        }
        Ok(())
    }

    /// Where the current image goes when no explicit path is given.
    pub fn default_target(&self) -> Option<PathBuf> {
        let entry = self.store.current()?;
        Some(
            self.config
                .save_dir
                .join(codec::default_save_name(entry.identifier())),
        )
    }

    /// Writes the current working buffer to `path`, or to
    /// [`default_target`](Self::default_target) if `path` is `None`.
    pub fn save_current(&mut self, path: Option<&Path>) -> Result<PathBuf> {
        let target = match path {
            Some(p) => p.to_path_buf(),
            None => self.default_target().ok_or(Error::NoSelection)?,
        };
        let entry = self.store.current().ok_or(Error::NoSelection)?;
        codec::save(&target, entry.working())?;

        if self.config.save_and_clean {
            self.store.remove_current();
        }
        Ok(target)
    }

    /// Writes every working buffer into the save folder.
    ///
    /// Entries sharing a file name get `-1`, `-2`, ... appended to the
    /// stem so no two of them land on the same file.
    pub fn save_all(&mut self) -> Result<Vec<PathBuf>> {
        let dir = &self.config.save_dir;
        let mut used = HashSet::new();
        let jobs: Vec<_> = self
            .store
            .entries()
            .map(|e| {
                let name = unique_name(codec::default_save_name(e.identifier()), &mut used);
                (dir.join(name), e)
            })
            .collect();

        let written = jobs
            .into_par_iter()
            .map(|(target, e)| -> Result<PathBuf> {
                codec::save(&target, e.working())?;
                Ok(target)
            })
            .collect::<Result<Vec<_>>>()?;

        if self.config.save_and_clean {
            self.store.remove_all();
        }
        Ok(written)
    }

    /// Deletes the current image's source file, then drops it from the store.
    pub fn delete_source(&mut self) -> Result<PathBuf> {
        let entry = self.store.current().ok_or(Error::NoSelection)?;
        // Identifiers are taken verbatim from UTF-8 paths in `open`.
        let path = PathBuf::from(entry.identifier());
        std::fs::remove_file(&path)?;
        info!(path = %path.display(), "deleted source file");

        self.store.remove_current();
        Ok(path)
    }
}

fn identifier(path: &Path) -> Result<String> {
    path.to_str()
        .map(str::to_owned)
        .ok_or_else(|| Error::NonUtf8Path(path.to_path_buf()))
}

/// `name`, or `name` with a numbered stem if it is already in `used`.
fn unique_name(name: PathBuf, used: &mut HashSet<PathBuf>) -> PathBuf {
    if used.insert(name.clone()) {
        return name;
    }
    let stem = name.file_stem().unwrap_or_default().to_string_lossy();
    let ext = name.extension().map(|e| e.to_string_lossy());
    for n in 1u64.. {
        let candidate = PathBuf::from(match &ext {
            Some(ext) => format!("{stem}-{n}.{ext}"),
            None => format!("{stem}-{n}"),
        });
        if used.insert(candidate.clone()) {
            warn!(from = %name.display(), to = %candidate.display(), "renamed clashing output");
            return candidate;
        }
    }
    unreachable!("ran out of suffixes")
}
