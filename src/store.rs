use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::{EnrichedIndex, EnrichedRestaurant};

pub const RESTAURANTS_FILE: &str = "01_restaurants.json";
pub const MENU_ITEMS_FILE: &str = "02_menu_items.json";
pub const ENRICHED_FILE: &str = "03_enriched_data.json";

const CHECKPOINT_PREFIX: &str = "checkpoint_";

/// Pretty JSON files under the output directory.
pub struct DataStore {
    dir: PathBuf,
}

impl DataStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    pub fn exists(&self, filename: &str) -> bool {
        self.path(filename).is_file()
    }

    pub fn save_json<T: Serialize + ?Sized>(&self, data: &T, filename: &str) -> Result<()> {
        let path = self.path(filename);
        write_json(&path, data)?;
        info!("Saved: {}", path.display());
        Ok(())
    }

    pub fn load_json<T: DeserializeOwned>(&self, filename: &str) -> Result<T> {
        let path = self.path(filename);
        let data = read_json(&path)?;
        info!("Loaded: {}", path.display());
        Ok(data)
    }
}

/// One `checkpoint_<name>.json` per finished restaurant, each holding
/// `{name: restaurant}`.
pub struct CheckpointStore {
    dir: PathBuf,
}

impl CheckpointStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn path_for(&self, restaurant_name: &str) -> PathBuf {
        self.dir
            .join(format!("{}{}.json", CHECKPOINT_PREFIX, safe_name(restaurant_name)))
    }

    /// Write a checkpoint. A failed write is logged, never raised.
    pub fn save(&self, restaurant_name: &str, data: &EnrichedRestaurant) {
        let path = self.path_for(restaurant_name);
        let mut wrapped = EnrichedIndex::new();
        wrapped.insert(restaurant_name.to_string(), data.clone());

        match write_json(&path, &wrapped) {
            Ok(()) => debug!("Checkpoint saved: {}", path.display()),
            Err(e) => warn!("Failed to save checkpoint {}: {}", path.display(), e),
        }
    }

    /// Merge every checkpoint file, in file-name order. Unreadable files are
    /// skipped with a warning.
    pub fn load_all(&self) -> Result<EnrichedIndex> {
        let mut files: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| is_checkpoint_file(p))
            .collect();
        files.sort();
        info!("Found {} checkpoint files", files.len());

        let mut merged = EnrichedIndex::new();
        for file in files {
            match read_json::<EnrichedIndex>(&file) {
                Ok(data) => {
                    for (name, restaurant) in data {
                        info!("Loaded checkpoint: {}", name);
                        merged.insert(name, restaurant);
                    }
                }
                Err(e) => warn!("Failed to load {}: {}", file.display(), e),
            }
        }
        Ok(merged)
    }
}

/// "Ben & Jerry's/Dairy" → "Ben_&_Jerry's_Dairy".
pub fn safe_name(name: &str) -> String {
    name.replace([' ', '/', '\\'], "_")
}

fn is_checkpoint_file(path: &Path) -> bool {
    path.is_file()
        && path.extension().is_some_and(|ext| ext == "json")
        && path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(CHECKPOINT_PREFIX))
}

fn write_json<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    fs::write(path, json)?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
pub(crate) fn temp_dir(tag: &str) -> PathBuf {
    use std::sync::atomic::{AtomicUsize, Ordering};
    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    let dir = std::env::temp_dir().join(format!(
        "fastfood_scraper_{}_{}_{}",
        tag,
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::SeqCst)
    ));
    let _ = fs::remove_dir_all(&dir);
    dir
}
