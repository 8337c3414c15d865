use thiserror::Error;

#[derive(Error, Debug)]
pub enum SampleMapError {
    #[error("Malformed sample map at line {line}: expected 2 tab-separated fields, found {fields}")]
    MalformedLine{line: usize, fields: usize},

    #[error("Founder selection probability must lie within [0, 1]. Got {0}")]
    InvalidProbability(f64),

    #[error("Failed to open sample map")]
    OpenFile(#[source] std::io::Error),

    #[error("Failed to create output sample map")]
    CreateFile(#[source] std::io::Error),

    #[error("Failed to read line from sample map")]
    ReadLine(#[source] std::io::Error),

    #[error("Failed to write record into output sample map")]
    WriteRecord(#[source] std::io::Error),
}
