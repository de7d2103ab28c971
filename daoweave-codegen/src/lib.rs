//! Build-time half of daoweave.
//!
//! [`ContractLocator`] scans a source tree for `#[dao_proxy]` contracts and
//! `#[derive(Entity)]` structs, [`classify_methods`] and [`synth`] turn each
//! contract into statement plans, [`synthesize`] renders the three artifacts
//! and [`BuildOrchestrator`] drives the whole batch over a worker pool.

pub mod artifact;
pub mod error;
pub mod extract;
pub mod model;
pub mod naming;
pub mod orchestrator;
pub mod scan;
pub mod sink;
pub mod synth;

pub use artifact::{ArtifactRole, ArtifactSet, GeneratedArtifact, synthesize};
pub use error::GenError;
pub use extract::{classify_methods, dao_type_argument, extract_entity_type};
pub use model::{
    Capability, ClassifiedMethod, ContractDescriptor, EntityDescriptor, ExistingImpl,
    FieldDescriptor, FieldKind, MethodDescriptor, SourceIndex,
};
pub use orchestrator::{
    BuildConfig, BuildOrchestrator, BuildReport, BuildTask, dedup, partition,
};
pub use scan::ContractLocator;
pub use sink::{ArtifactSink, FileSink, MemorySink};
