//! Core of the novel-insertion merging pipeline: entropy screening,
//! q-gram filtered all-pairs partitioning of contigs into components,
//! and consensus-graph construction of supercontigs per component.

pub mod align;
pub mod components;
pub mod consensus_graph;
pub mod entropy;
mod error;
pub mod find_union;
pub mod input;
pub mod merge;
pub mod partition;
pub mod qgram;
#[macro_use]
extern crate log;
pub use components::{read_and_merge_components, ContigComponent};
pub use entropy::filter_by_entropy;
pub use error::MergeError;
pub use find_union::FindUnion;
pub use input::read_contigs;
pub use merge::{construct_supercontigs, MergeConfig, MergeStats};
pub use partition::{partition_contigs, write_aligned_pairs, PartitionConfig};
