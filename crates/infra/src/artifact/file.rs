use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use stockcast_forecast::{ArtifactError, ArtifactStore, TrainedArtifact};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Artifact persisted as a JSON file at a fixed path.
///
/// Writes go to a sibling temp file which is synced and then renamed over
/// the target, so readers see either the previous artifact or the new one.
#[derive(Debug, Clone)]
pub struct FileArtifactStore {
    path: PathBuf,
}

impl FileArtifactStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> ArtifactError {
        ArtifactError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn temp_path(&self) -> PathBuf {
        let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let name = self
            .path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "artifact".to_string());
        self.path
            .with_file_name(format!(".{name}.tmp-{}-{n}", std::process::id()))
    }
}

impl ArtifactStore for FileArtifactStore {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn exists(&self) -> Result<bool, ArtifactError> {
        self.path.try_exists().map_err(|e| self.io_err(e))
    }

    fn load(&self) -> Result<Option<TrainedArtifact>, ArtifactError> {
        let bytes = match fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_err(e)),
        };
        TrainedArtifact::decode(&self.path, &bytes).map(Some)
    }

    fn save(&self, artifact: &TrainedArtifact) -> Result<(), ArtifactError> {
        let bytes = artifact.encode()?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| self.io_err(e))?;
        }

        let tmp = self.temp_path();
        let written = File::create(&tmp).and_then(|mut f| {
            f.write_all(&bytes)?;
            f.sync_all()
        });
        if let Err(e) = written.and_then(|_| fs::rename(&tmp, &self.path)) {
            let _ = fs::remove_file(&tmp);
            return Err(self.io_err(e));
        }

        debug!(path = %self.path.display(), bytes = bytes.len(), "artifact written");
        Ok(())
    }
}
