use thiserror::Error;
use crate::FileEntity;

#[derive(Error, Debug)]
pub enum ParserError{
    #[error("{0} {1} does not exist")]
    MissingFileEntity(FileEntity, String),

    #[error("{1} is not a {0}")]
    InvalidFileEntity(FileEntity, String),

    #[error("The provided value must lie between {0} and {1}")]
    ParseRatio(f64, f64),

    #[error("The provided value must be strictly positive")]
    NonPositive,

    #[error("At least {0} generations of random-mating are required to simulate admixture. Got {1}")]
    InsufficientGenerations(u32, u32),

    #[error("At least one thread is required")]
    InvalidThreadCount,

    #[error("Failed to create the parent directory of the output basename")]
    CreateOutputDir(#[source] std::io::Error),

    #[error("Failed to serialize command line arguments")]
    Serialize(#[source] serde_yaml::Error),

    #[error("Unable to write serialized arguments into {0}")]
    WriteArgs(String, #[source] std::io::Error),

    #[error("Failed to open {0}")]
    OpenArgs(String, #[source] std::io::Error),

    #[error("Failed to read command line arguments from {0}")]
    Deserialize(String, #[source] serde_yaml::Error),
}
