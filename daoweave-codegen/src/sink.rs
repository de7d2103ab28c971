//! Destinations for generated artifacts.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::artifact::GeneratedArtifact;
use crate::error::GenError;

/// Accepts generated artifacts. Calls block the worker that makes them.
pub trait ArtifactSink: Send + Sync {
    fn submit(&self, artifact: &GeneratedArtifact, output_root: &Path) -> Result<(), GenError>;
}

/// Directory of a module below the source root: `crate::mapper::provider`
/// gives `<root>/mapper/provider`.
pub fn module_dir(output_root: &Path, module_path: &str) -> Result<PathBuf, GenError> {
    let mut segments = module_path.split("::").map(str::trim);
    if segments.next() != Some("crate") {
        return Err(GenError::InvalidPath(module_path.to_owned()));
    }
    let mut dir = output_root.to_path_buf();
    for segment in segments {
        if segment.is_empty() || !segment.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(GenError::InvalidPath(module_path.to_owned()));
        }
        dir.push(segment);
    }
    Ok(dir)
}

fn check_source(artifact: &GeneratedArtifact) -> Result<(), GenError> {
    syn::parse_file(&artifact.source)
        .map(|_| ())
        .map_err(|err| GenError::Compile {
            type_name: artifact.type_name.clone(),
            message: err.to_string(),
        })
}

/// Writes each artifact to `<module dir>/<snake_case type>.rs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSink;

impl FileSink {
    pub fn target_path(artifact: &GeneratedArtifact, output_root: &Path) -> Result<PathBuf, GenError> {
        let dir = module_dir(output_root, &artifact.module_path)?;
        Ok(dir.join(format!("{}.rs", artifact.module_name())))
    }
}

impl ArtifactSink for FileSink {
    fn submit(&self, artifact: &GeneratedArtifact, output_root: &Path) -> Result<(), GenError> {
        check_source(artifact)?;
        let path = Self::target_path(artifact, output_root)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|err| GenError::io(parent, err))?;
        }
        std::fs::write(&path, &artifact.source).map_err(|err| GenError::io(&path, err))?;
        println!("[OK] {} compiled -> {}", artifact.type_name, path.display());
        Ok(())
    }
}

/// Keeps accepted artifacts in memory, in submission order.
#[derive(Debug, Default)]
pub struct MemorySink {
    artifacts: Mutex<Vec<GeneratedArtifact>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn artifacts(&self) -> Vec<GeneratedArtifact> {
        self.lock().clone()
    }

    pub fn type_names(&self) -> Vec<String> {
        self.lock().iter().map(|a| a.type_name.clone()).collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<GeneratedArtifact>> {
        self.artifacts
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl ArtifactSink for MemorySink {
    fn submit(&self, artifact: &GeneratedArtifact, _output_root: &Path) -> Result<(), GenError> {
        check_source(artifact)?;
        self.lock().push(artifact.clone());
        Ok(())
    }
}

impl<T: ArtifactSink + ?Sized> ArtifactSink for std::sync::Arc<T> {
    fn submit(&self, artifact: &GeneratedArtifact, output_root: &Path) -> Result<(), GenError> {
        (**self).submit(artifact, output_root)
    }
}
