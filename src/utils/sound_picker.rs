use crate::constants::SOUND_EXTENSION;
use rand::seq::IndexedRandom;
use rand::Rng;
use std::path::{Path, PathBuf};

/// Eligible sound files in `folder`, sorted by name.
/// A missing or unreadable folder yields an empty list.
pub fn list_sounds(folder: &Path) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(folder) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("[Sounds] Cannot read {}: {}", folder.display(), e);
            return Vec::new();
        }
    };

    let mut sounds: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case(SOUND_EXTENSION))
                .unwrap_or(false)
        })
        .collect();

    sounds.sort();
    sounds
}

/// Uniform pick over the folder's current contents; repeats are allowed
pub fn pick_random_sound<R: Rng + ?Sized>(folder: &Path, rng: &mut R) -> Option<PathBuf> {
    let sounds = list_sounds(folder);
    let picked = sounds.choose(rng).cloned();
    if picked.is_none() {
        log::debug!("[Sounds] No playable files in {}", folder.display());
    }
    picked
}
