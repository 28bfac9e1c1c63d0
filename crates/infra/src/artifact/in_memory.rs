use std::path::Path;
use std::sync::RwLock;

use stockcast_forecast::{ArtifactError, ArtifactStore, TrainedArtifact};

/// In-memory artifact slot for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryArtifactStore {
    inner: RwLock<Slot>,
}

#[derive(Debug, Default)]
struct Slot {
    bytes: Option<Vec<u8>>,
    saves: usize,
}

impl InMemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times an artifact has been written.
    pub fn saves(&self) -> usize {
        self.inner.read().map(|s| s.saves).unwrap_or(0)
    }

    pub fn clear(&self) {
        if let Ok(mut slot) = self.inner.write() {
            slot.bytes = None;
        }
    }
}

impl ArtifactStore for InMemoryArtifactStore {
    fn location(&self) -> String {
        "memory".to_string()
    }

    fn exists(&self) -> Result<bool, ArtifactError> {
        let slot = self
            .inner
            .read()
            .map_err(|_| ArtifactError::Storage("artifact slot poisoned".to_string()))?;
        Ok(slot.bytes.is_some())
    }

    fn load(&self) -> Result<Option<TrainedArtifact>, ArtifactError> {
        let slot = self
            .inner
            .read()
            .map_err(|_| ArtifactError::Storage("artifact slot poisoned".to_string()))?;
        slot.bytes
            .as_deref()
            .map(|b| TrainedArtifact::decode(Path::new("memory"), b))
            .transpose()
    }

    fn save(&self, artifact: &TrainedArtifact) -> Result<(), ArtifactError> {
        let bytes = artifact.encode()?;
        let mut slot = self
            .inner
            .write()
            .map_err(|_| ArtifactError::Storage("artifact slot poisoned".to_string()))?;
        slot.bytes = Some(bytes);
        slot.saves += 1;
        Ok(())
    }
}
