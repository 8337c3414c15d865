use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use located_error::prelude::*;
use log::{debug, info};
use parser::{PartitionArgs, SimulateArgs, ToolArgs};
use sample_map::{read_sample_ids, Partitioner, PartitionSummary};

use crate::{
    paths::{converted_bcf_path, decompressed_path, OutputPaths},
    runner::{CommandRunner, CommandStatus, Invocation},
    tools::{Bcftools, Gzip, Simulate, SimulateParams},
    PipelineError,
};

/// Sequence every step of an admixture simulation, from the input panel to the simulated samples.
///
/// Steps are run strictly one after the other. The first failing command aborts the whole run: already
/// written files are kept as is, and the scratch genetic map (if any) is left behind.
pub struct Driver<R: CommandRunner> {
    runner     : R,
    bcftools   : Bcftools,
    gzip       : Gzip,
    simulate   : Simulate,
    partitioner: Partitioner,
    input      : PathBuf,
    sample_map : PathBuf,
    outputs    : OutputPaths,
    params     : SimulateParams,
    dry_run    : bool,
}

impl<R: CommandRunner> Driver<R> {
    /// Validate every parameter of the pipeline before anything gets written or spawned.
    ///
    /// # Errors
    /// - `InvalidProbability` if the founder probability does not lie within [0, 1]
    /// - `InvalidThreads` if zero threads are requested for bcftools
    /// - any error of [`SimulateParams::validate`]
    pub fn new(partition: &PartitionArgs, simulate: &SimulateArgs, tools: &ToolArgs, runner: R) -> Result<Self> {
        let loc_msg = "While preparing the simulation pipeline";
        let partitioner = Partitioner::new(partition.founder_probability(), partition.random_seed).loc(loc_msg)?;
        let bcftools = Bcftools::new(&tools.bcftools, tools.threads).loc(loc_msg)?;

        let outputs = OutputPaths::from_basename(&partition.output_basename);
        let params = SimulateParams {
            founders_bcf   : outputs.founders_bcf().to_path_buf(),
            founders_map   : outputs.maps().founders().to_path_buf(),
            genetic_map    : simulate.genetic_map.clone(),
            output_basename: outputs.basename().to_path_buf(),
            growth_rate    : simulate.growth_rate,
            maximum_size   : simulate.maximum_size,
            n_output       : simulate.n_output,
            chromosome     : simulate.chromosome,
            n_generations  : simulate.n_generations,
            phase_switch   : simulate.phase_switch,
            random_seed    : partition.random_seed,
            dephase        : simulate.dephase,
        };
        params.validate().loc(loc_msg)?;

        Ok(Self {
            runner,
            bcftools,
            gzip       : Gzip::new(&tools.gzip),
            simulate   : Simulate::new(&tools.simulator),
            partitioner,
            input      : simulate.input_vcf.clone(),
            sample_map : partition.sample_map.clone(),
            outputs,
            params,
            dry_run    : tools.dry_run,
        })
    }

    /// Run the pipeline to completion.
    ///
    /// # Errors
    /// - `ExitCode` or `Signal` on the first external command which does not succeed.
    /// - any partitioning or I/O error.
    pub fn run(&self) -> Result<PartitionSummary> {
        // ---- Normalize and index the reference panel.
        let panel = self.normalize_input()?;
        self.execute(&self.bcftools.index(&panel))?;

        // ---- Randomly split samples into founders and reference.
        let summary = self.partitioner.partition_files(&self.sample_map, self.outputs.maps())
            .loc("While partitioning samples")?;

        // ---- Materialize the founder and reference panels.
        let subsets = [
            (self.outputs.maps().founders(), self.outputs.founders_bcf()),
            (self.outputs.maps().reference(), self.outputs.reference_bcf()),
        ];
        for (map, bcf) in subsets {
            let ids = read_sample_ids(map)?;
            debug!("Subsampling {} sample(s) into {}", ids.len(), bcf.display());
            self.execute(&self.bcftools.subsample(&panel, bcf, &ids))?;
            self.execute(&self.bcftools.index(bcf))?;
        }

        // ---- Run forward simulations. The simulator cannot read compressed genetic maps.
        let scratch_map = decompressed_path(&self.params.genetic_map);
        let genetic_map = match &scratch_map {
            Some(decompressed) => {
                self.execute(&self.gzip.decompress(&self.params.genetic_map, decompressed))?;
                decompressed.clone()
            },
            None => self.params.genetic_map.clone(),
        };

        let params = SimulateParams{genetic_map, ..self.params.clone()};
        let invocation = self.simulate.invocation(&params).loc("While building the simulation command")?;
        if !self.dry_run {
            println!("{invocation}");
        }
        self.execute(&invocation)?;

        if let Some(scratch_map) = scratch_map {
            self.remove_scratch(&scratch_map)?;
        }

        info!("Done. Simulated samples were written under {}", self.outputs.basename().display());
        Ok(summary)
    }

    /// Convert VCF panels into a compressed BCF located next to the input. Other panels are used as is.
    fn normalize_input(&self) -> Result<PathBuf> {
        match converted_bcf_path(&self.input) {
            Some(bcf) => {
                info!("Converting {} into {}", self.input.display(), bcf.display());
                self.execute(&self.bcftools.convert(&self.input, &bcf))?;
                Ok(bcf)
            },
            None => Ok(self.input.clone()),
        }
    }

    /// Run a single command. Anything but a success is fatal.
    fn execute(&self, invocation: &Invocation) -> Result<()> {
        use PipelineError::{ExitCode, Signal};
        info!("{invocation}");
        let loc_msg = || format!("While running '{}'", invocation.program_name());
        match self.runner.run(invocation).with_loc(loc_msg)? {
            CommandStatus::Success          => Ok(()),
            CommandStatus::Exited(code)     => Err(ExitCode{command: invocation.to_string(), code}).with_loc(loc_msg),
            CommandStatus::Signaled(signal) => Err(Signal{command: invocation.to_string(), signal}).with_loc(loc_msg),
        }
    }

    /// `rm -f` the decompressed genetic map.
    fn remove_scratch(&self, path: &Path) -> Result<()> {
        if self.dry_run {
            println!("rm -f {}", path.display());
            return Ok(())
        }
        debug!("Removing scratch genetic map {}", path.display());
        match std::fs::remove_file(path) {
            Err(e) if e.kind() != ErrorKind::NotFound => {
                Err(PipelineError::Cleanup(path.display().to_string(), e)).loc("While cleaning up")
            },
            _ => Ok(()),
        }
    }
}
