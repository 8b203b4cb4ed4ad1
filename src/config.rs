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

use std::path::PathBuf;

pub const DEFAULT_CAPACITY: usize = 100;

/// Viewer settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of images kept at once. Always at least 1.
    pub capacity: usize,
    /// Folder used by direct save and save-all.
    pub save_dir: PathBuf,
    /// Save to `save_dir` under the source file name instead of asking for a path.
    pub direct_save: bool,
    /// Drop images from the store once they are saved.
    pub save_and_clean: bool,
}

impl Default for Config {
    fn default() -> Self {
        ConfigBuilder::new().build()
    }
}

#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config {
                capacity: DEFAULT_CAPACITY,
                save_dir: PathBuf::from("."),
                direct_save: false,
                save_and_clean: false,
            },
        }
    }

    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity.max(1);
        self
    }

    pub fn save_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.save_dir = dir.into();
        self
    }

    pub fn direct_save(mut self, v: bool) -> Self {
        self.config.direct_save = v;
        self
    }

    pub fn save_and_clean(mut self, v: bool) -> Self {
        self.config.save_and_clean = v;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
