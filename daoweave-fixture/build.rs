use std::path::{Path, PathBuf};

use daoweave_codegen::{
    ArtifactSink, BuildConfig, BuildOrchestrator, FileSink, GenError, GeneratedArtifact,
};

/// Writes artifacts below `OUT_DIR` instead of the scanned source tree.
struct OutDirSink(PathBuf);

impl ArtifactSink for OutDirSink {
    fn submit(&self, artifact: &GeneratedArtifact, _src_root: &Path) -> Result<(), GenError> {
        FileSink.submit(artifact, &self.0)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=src");
    let src = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR")?).join("src");
    let out = PathBuf::from(std::env::var("OUT_DIR")?);

    let report = BuildOrchestrator::new(BuildConfig::new(src), OutDirSink(out)).run_blocking()?;
    if report.generated != ["MovieDao"] {
        return Err(format!("unexpected contracts: {:?}", report.generated).into());
    }
    Ok(())
}
