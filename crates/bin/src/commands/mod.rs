pub mod info;
pub mod list;
pub mod show;

use std::path::Path;

use idmap::MemoryStore;

/// Open the store file; a missing file reads as an empty store.
pub fn open_store(path: &Path) -> Result<MemoryStore, Box<dyn std::error::Error>> {
    if !path.exists() {
        tracing::warn!("Store file {} does not exist", path.display());
    }
    let store = MemoryStore::load_from_file(path)?;
    tracing::debug!(path = %path.display(), items = store.len(), "opened store");
    Ok(store)
}
