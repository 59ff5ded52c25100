//! Store loading and saving for the CLI.

use std::path::Path;
use std::sync::Arc;

use dbauth::InMemory;

/// Load the store backed by `path`, or a fresh one if the file does not exist yet.
pub async fn open_store(path: &Path) -> Result<Arc<InMemory>, Box<dyn std::error::Error>> {
    let store = InMemory::load_from_file(path).await?;
    tracing::debug!("Loaded store from {}", path.display());
    Ok(Arc::new(store))
}

/// Write the store back to `path`.
pub async fn save_store(store: &InMemory, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    store.save_to_file(path).await?;
    tracing::debug!("Saved store to {}", path.display());
    Ok(())
}
