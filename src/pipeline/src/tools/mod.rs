//! Typed command line builders of the external collaborators.

mod bcftools;
pub use bcftools::{Bcftools, OutputType};

mod gzip;
pub use gzip::Gzip;

mod simulate;
pub use simulate::{Simulate, SimulateParams};
