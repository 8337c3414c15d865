//! Sample-to-subpopulation map files and their random founder/reference partition.

mod error;
pub use error::SampleMapError;

pub mod record;
pub use record::{SampleRecord, read_sample_ids};

pub mod partition;
pub use partition::{Partitioner, PartitionSummary, Assignment};

pub mod paths;
pub use paths::{MapPaths, suffixed_path};

/// Field separator of sample map files.
pub const MAP_SEPARATOR: char = '\t';
