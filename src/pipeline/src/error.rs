use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to spawn '{program}'. Please ensure it is installed and within your PATH")]
    Spawn{program: String, #[source] source: std::io::Error},

    #[error("Failed to feed the standard input of '{program}'")]
    Stdin{program: String, #[source] source: std::io::Error},

    #[error("Failed to redirect the standard output of '{program}' into {path}")]
    Stdout{program: String, path: String, #[source] source: std::io::Error},

    #[error("Failed to wait for '{program}' to complete")]
    Wait{program: String, #[source] source: std::io::Error},

    #[error("Command {command} failed with return code {code}")]
    ExitCode{command: String, code: i32},

    #[error("Command {command} exits with signal {signal}")]
    Signal{command: String, signal: i32},

    #[error("Invalid bcftools output type '{0}'. Expected one of 'b', 'u', 'z' or 'v'")]
    InvalidOutputType(String),

    #[error("At least one thread is required to run bcftools")]
    InvalidThreads,

    #[error("At least {min} generations of random-mating are required. Got {got}")]
    InsufficientGenerations{min: u32, got: u32},

    #[error("Phase switch rate must lie within [0, 1]. Got {0}")]
    InvalidPhaseSwitch(f64),

    #[error("Population growth rate must be strictly positive. Got {0}")]
    InvalidGrowthRate(f64),

    #[error("Maximum population size must be strictly positive")]
    InvalidMaximumSize,

    #[error("Failed to remove scratch genetic map {0}")]
    Cleanup(String, #[source] std::io::Error),
}

impl PipelineError {
    /// Process exit code mirroring a failed external command: its return code, or the number of the
    /// signal which terminated it. `None` for any other kind of failure.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::ExitCode{code, ..}   => Some(*code),
            Self::Signal{signal, ..}   => Some(*signal),
            _                          => None,
        }
    }
}
