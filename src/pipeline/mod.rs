//! Pipeline orchestration and emission ordering

mod orchestrator;
pub mod ordering;

pub use orchestrator::{run, run_with, PipelineResult};
pub use ordering::{apply_ordering, build_ordering, DiscoveryOrder, ManifestOrder, OrderingStrategy};
