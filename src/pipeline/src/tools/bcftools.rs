use std::{
    fmt::{self, Display, Formatter},
    path::{Path, PathBuf},
    str::FromStr,
};

use crate::{Invocation, PipelineError};

/// Value of bcftools' `--output-type` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputType {
    #[default]
    CompressedBcf,
    UncompressedBcf,
    CompressedVcf,
    UncompressedVcf,
}

impl OutputType {
    pub fn flag(&self) -> &'static str {
        match self {
            Self::CompressedBcf   => "b",
            Self::UncompressedBcf => "u",
            Self::CompressedVcf   => "z",
            Self::UncompressedVcf => "v",
        }
    }
}

impl FromStr for OutputType {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "b" => Ok(Self::CompressedBcf),
            "u" => Ok(Self::UncompressedBcf),
            "z" => Ok(Self::CompressedVcf),
            "v" => Ok(Self::UncompressedVcf),
            other => Err(PipelineError::InvalidOutputType(other.to_string())),
        }
    }
}

impl Display for OutputType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.flag())
    }
}

/// Builder of bcftools invocations.
#[derive(Debug, Clone)]
pub struct Bcftools {
    program    : PathBuf,
    threads    : usize,
    output_type: OutputType,
}

impl Bcftools {
    /// # Errors
    /// - `InvalidThreads` if `threads` is zero.
    pub fn new(program: impl AsRef<Path>, threads: usize) -> Result<Self, PipelineError> {
        if threads == 0 {
            return Err(PipelineError::InvalidThreads)
        }
        Ok(Self{program: program.as_ref().to_path_buf(), threads, output_type: OutputType::default()})
    }

    #[must_use]
    pub fn with_output_type(mut self, output_type: OutputType) -> Self {
        self.output_type = output_type;
        self
    }

    fn view(&self, output: &Path) -> Invocation {
        Invocation::new(&self.program)
            .arg("view")
            .args(["--output-type", self.output_type.flag()])
            .arg("--output-file").arg(output)
    }

    /// `bcftools view --output-type b --output-file <output> --threads <n> <input>`
    pub fn convert(&self, input: &Path, output: &Path) -> Invocation {
        self.view(output)
            .arg("--threads").arg(self.threads.to_string())
            .arg(input)
    }

    /// `bcftools index -f <file>`
    pub fn index(&self, file: &Path) -> Invocation {
        Invocation::new(&self.program)
            .args(["index", "-f"])
            .arg(file)
    }

    /// `bcftools view --output-type b --output-file <output> --samples-file - --threads <n> <input>`, with
    /// `sample_ids` fed through stdin, one per line.
    pub fn subsample(&self, input: &Path, output: &Path, sample_ids: &[String]) -> Invocation {
        let payload = sample_ids.iter()
            .map(|id| format!("{id}\n"))
            .collect::<String>()
            .into_bytes();

        self.view(output)
            .args(["--samples-file", "-"])
            .arg("--threads").arg(self.threads.to_string())
            .arg(input)
            .stdin(payload)
    }
}
