extern crate parser;
extern crate logger;

use parser::{Cli, Commands::*};
use pipeline::{CommandRunner, Driver, DryRunner, PipelineError, SystemRunner};
use sample_map::{MapPaths, Partitioner};
use located_error::prelude::*;

#[macro_use]
extern crate log;

/// Unpack the command line and run the requested subcommand.
pub fn run(cli: Cli) -> Result<()> {
    match cli.commands {
        Simulate {partition, simulate, tools} => {
            info!("Running admixture simulations (output basename: {})", partition.output_basename.display());
            let summary = match tools.dry_run {
                true  => simulate_with(Driver::new(&partition, &simulate, &tools, DryRunner)?)?,
                false => {
                    let runner = SystemRunner::new(logger::Logger::multi().cloned());
                    simulate_with(Driver::new(&partition, &simulate, &tools, runner)?)?
                },
            };
            info!("Simulations were seeded from {} founder(s) out of {} samples.", summary.founders, summary.total());
        },

        Partition {partition} => {
            let partitioner = Partitioner::new(partition.founder_probability(), partition.random_seed)
                .loc("While preparing sample map partition")?;
            let outputs = MapPaths::from_basename(&partition.output_basename);
            partitioner.partition_files(&partition.sample_map, &outputs)?;
            info!("Founders written to {}", outputs.founders().display());
            info!("Reference samples written to {}", outputs.reference().display());
        },

        FromYaml {yaml} => {
            let cli = Cli::deserialize(&yaml)?;
            run(cli)?;
        },
    }
    Ok(())
}

fn simulate_with<R: CommandRunner>(driver: Driver<R>) -> Result<sample_map::PartitionSummary> {
    driver.run().loc("While running admixture simulations")
}

/// Process exit code of a failed run: the return code (or signal number) of the first external command
/// which failed, `1` for any other error.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<PipelineError>())
        .and_then(PipelineError::exit_code)
        .unwrap_or(1)
}
