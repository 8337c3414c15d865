//! Sequencing of the external tools involved in an admixture simulation.

mod error;
pub use error::PipelineError;

pub mod runner;
pub use runner::{CommandRunner, CommandStatus, DryRunner, Invocation, SystemRunner};

pub mod tools;

pub mod paths;

pub mod driver;
pub use driver::Driver;
