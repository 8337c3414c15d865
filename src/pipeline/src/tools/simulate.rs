use std::path::{Path, PathBuf};

use parser::MIN_GENERATIONS;

use crate::{Invocation, PipelineError};

/// Parameters of a single forward simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulateParams {
    pub founders_bcf   : PathBuf,
    pub founders_map   : PathBuf,
    pub genetic_map    : PathBuf,
    pub output_basename: PathBuf,
    pub growth_rate    : f64,
    pub maximum_size   : u32,
    pub n_output       : i64,
    pub chromosome     : u32,
    pub n_generations  : u32,
    pub phase_switch   : f64,
    pub random_seed    : i64,
    pub dephase        : bool,
}

impl SimulateParams {
    pub fn validate(&self) -> Result<(), PipelineError> {
        use PipelineError::{InsufficientGenerations, InvalidPhaseSwitch, InvalidGrowthRate, InvalidMaximumSize};
        if self.n_generations < MIN_GENERATIONS {
            return Err(InsufficientGenerations{min: MIN_GENERATIONS, got: self.n_generations})
        }
        if !(0.0..=1.0).contains(&self.phase_switch) {
            return Err(InvalidPhaseSwitch(self.phase_switch))
        }
        if !(self.growth_rate > 0.0 && self.growth_rate.is_finite()) {
            return Err(InvalidGrowthRate(self.growth_rate))
        }
        if self.maximum_size == 0 {
            return Err(InvalidMaximumSize)
        }
        Ok(())
    }
}

/// Builder of forward simulation invocations (RFMix `simulate`)
#[derive(Debug, Clone)]
pub struct Simulate {
    program: PathBuf,
}

impl Simulate {
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self{program: program.as_ref().to_path_buf()}
    }

    /// # Errors
    /// if any of the provided `params` is out of range. See [`SimulateParams::validate`]
    pub fn invocation(&self, params: &SimulateParams) -> Result<Invocation, PipelineError> {
        params.validate()?;
        let invocation = Invocation::new(&self.program)
            .arg("-f").arg(&params.founders_bcf)
            .arg("-m").arg(&params.founders_map)
            .arg("-g").arg(&params.genetic_map)
            .arg("-o").arg(&params.output_basename)
            .arg(format!("--growth-rate={}", params.growth_rate))
            .arg(format!("--maximum-size={}", params.maximum_size))
            .arg(format!("--n-output={}", params.n_output))
            .arg("-c").arg(params.chromosome.to_string())
            .arg("-G").arg(params.n_generations.to_string())
            .arg("-p").arg(format!("{:.6}", params.phase_switch))
            .arg(format!("--random-seed={}", params.random_seed));

        Ok(match params.dephase {
            true  => invocation.arg("--dephase"),
            false => invocation,
        })
    }
}
