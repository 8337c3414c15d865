use std::{
    fs::File,
    path::{Path, PathBuf},
    fmt::{self, Display, Formatter},
    ffi::OsStr,
};

use located_error::*;

use clap::{Parser, Subcommand, Args};
use serde::{Serialize, Deserialize};
use log::debug;
use anyhow::{anyhow, Result};

mod error;
pub use error::ParserError;

/// Default seed of the random number generator (both for partitioning, and the simulation itself).
pub const DEFAULT_SEED: i64 = 0xDEAD_BEEF;

/// Default recombination map (HapMap-phaseII), stored compressed.
pub const DEFAULT_GENETIC_MAP: &str = "hapmap-phase2-genetic-map.tsv.gz";

/// Minimal number of random-mating generations required to obtain admixed individuals.
pub const MIN_GENERATIONS: u32 = 2;

#[derive(Parser, Debug, Serialize, Deserialize)]
#[clap(name="admix-sim", author, version, about, long_about = None)]
#[clap(propagate_version = true)]
/// admix-sim: Simulate admixed individuals from a phased reference panel
pub struct Cli {
    ///Set the verbosity level (-v -vv -vvv)
    ///
    /// Set the verbosity level of this program. Multiple levels allowed {n}
    ///
    /// -v: Info  |  -vv: Debug  | -vvv: Trace {n}
    ///
    /// Note that the program will still output warnings by default, even when this flag is off.
    /// Use The --quiet/-q to disable them
    #[clap(short='v', long, parse(from_occurrences), global=true)]
    pub verbose: u8,

    /// Disable warnings.
    ///
    /// By default, warnings are emmited and redirected to the console, even when verbose mode is off.
    /// Use this argument to disable this. Only errors will be displayed.
    #[clap(short='q', long, global=true)]
    pub quiet: bool,

    #[clap(subcommand)]
    pub commands: Commands,
}

impl Cli {
    /// Console verbosity, as expected by `logger::Logger::init()`
    pub fn verbosity(&self) -> u8 {
        if self.quiet {0} else {self.verbose.saturating_add(1)}
    }

    /// Serialize command line arguments within a `.yaml` file.
    ///
    /// # Behavior
    /// - File naming follows the convention '{current time}-admix-sim-{subcommand}.yaml'. current time follows
    ///   the format `YYYY`-`MM`-`DD`T`hhmmss`
    /// - File is written within the parent directory of the user-provided `--output-basename`.
    /// - `from-yaml` runs are not serialized again.
    pub fn serialize(&self) -> Result<()> {
        use ParserError::{Serialize, WriteArgs};

        // Parse arguments to yaml and print to console.
        let serialized = serde_yaml::to_string(&self).map_err(Serialize).loc("While serializing arguments")?;
        debug!("\n---- Command line args ----\n{}\n---", serialized);

        let current_time = chrono::offset::Local::now().format("%Y-%m-%dT%H%M%S").to_string();
        let (basename, module) = match &self.commands {
            Commands::Simulate {partition, ..} => (&partition.output_basename, "simulate"),
            Commands::Partition {partition}    => (&partition.output_basename, "partition"),
            Commands::FromYaml {yaml: _}       => return Ok(()),
        };

        let output_file = output_directory(basename).join(format!("{current_time}-admix-sim-{module}.yaml"));
        std::fs::write(&output_file, serialized)
            .map_err(|e| WriteArgs(output_file.display().to_string(), e))
            .loc("While serializing arguments")
    }

    /// Deserialize a `.yaml` file into Command line arguments.
    ///
    /// # Errors
    /// - if the provided `.yaml` does not exist, or does not carry read permissions
    /// - if `serde_yaml` fails to parse the provided file into `Self`.
    pub fn deserialize(yaml: &Path) -> Result<Self> {
        use ParserError::{OpenArgs, Deserialize};
        let source = yaml.display().to_string();
        let file = File::open(yaml).map_err(|e| OpenArgs(source.clone(), e)).loc("While deserializing arguments")?;
        serde_yaml::from_reader(file).map_err(|e| Deserialize(source, e)).loc("While deserializing arguments")
    }
}

#[derive(Subcommand, Debug, Serialize, Deserialize)]
pub enum Commands {
    /// Simulate admixed individuals through Wright-Fisher random-mating.
    ///
    /// Randomly select a proportion of the reference panel as founders, split the panel into a founder and a
    /// reference subset, and run forward simulations from these founders. Local ancestry analyses of the
    /// simulated individuals should then rely on the output reference panel, since the input panel contains
    /// the exact founding haplotypes.
    Simulate {
        #[clap(flatten)]
        partition: PartitionArgs,
        #[clap(flatten)]
        simulate: SimulateArgs,
        #[clap(flatten)]
        tools: ToolArgs,
    },

    /// Randomly split a sample map into founder and reference samples, without running any simulation.
    Partition {
        #[clap(flatten)]
        partition: PartitionArgs,
    },

    /// Run admix-sim using a previously generated .yaml configuration file.
    ///
    /// This allows users to easily re-apply an admix-sim command using the exact same parameters
    /// and arguments.
    FromYaml {
        yaml: PathBuf,
    },
}

#[derive(Args, Debug, Default, Clone, Serialize, Deserialize)]
pub struct PartitionArgs {
    /// Map file linking each sample id of the input panel to a population.
    ///
    /// Expected format is a headless, tab-separated file with columns '<sample-id> <population>'
    #[clap(short='m', long, parse(try_from_os_str=valid_input_file))]
    pub sample_map: PathBuf,

    /// Percentage of samples to randomly select as founders of the admixed population.
    ///
    /// Each sample is independently selected with this probability. Populations are thus represented
    /// among founders in the same proportion as within the input sample map, on expectation.
    #[clap(short='p', long, default_value("10"), parse(try_from_str=valid_percentage))]
    pub parent_percent: f64,

    /// Output prefix of the simulated samples, and of the reference panel with founders removed.
    ///
    /// Outputs are named '<basename>.founders.map', '<basename>.ref.map', '<basename>.founders.bcf.gz',
    /// '<basename>.ref.bcf.gz', etc.
    #[clap(short='o', long, parse(try_from_os_str=valid_output_basename))]
    pub output_basename: PathBuf,

    /// Provide the random number generators with a set seed.
    #[clap(short='s', long, default_value_t=DEFAULT_SEED, allow_hyphen_values(true))]
    pub random_seed: i64,
}

impl PartitionArgs {
    /// Probability of selecting a sample as founder.
    pub fn founder_probability(&self) -> f64 {
        self.parent_percent / 100.0
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
pub struct SimulateArgs {
    /// Input phased reference panel (VCF or BCF).
    ///
    /// Files ending with '.vcf', '.vcf.gz' or '.vcf.bgz' are first converted into a compressed '.bcf.gz'
    /// file, located next to the input.
    #[clap(short='i', long, parse(try_from_os_str=valid_input_file))]
    pub input_vcf: PathBuf,

    /// Maximum number of diploid individuals to output. (-1: no limit)
    #[clap(short='n', long, default_value("-1"), allow_hyphen_values(true))]
    pub n_output: i64,

    /// Chromosome to select for simulation (only one chromosome is used)
    #[clap(short='c', long, default_value("20"))]
    pub chromosome: u32,

    /// Genetic map file of the corresponding chromosome.
    ///
    /// Compressed maps ('.gz', '.bgz') are decompressed next to the input for the duration of the simulation.
    #[clap(short='g', long, default_value(DEFAULT_GENETIC_MAP), parse(from_os_str))]
    pub genetic_map: PathBuf,

    /// Number of generations of random-mating admixture to simulate. Must be two or larger.
    #[clap(short='G', long, default_value("8"), parse(try_from_str=valid_generations))]
    pub n_generations: u32,

    /// Output unphased data for admixed samples.
    #[clap(long)]
    pub dephase: bool,

    /// Introduce phase switches at the specified rate (verification data is not switched)
    #[clap(long, default_value("0.0"), parse(try_from_str=valid_probability))]
    pub phase_switch: f64,

    /// Population growth rate per generation.
    #[clap(long, default_value("1.5"), parse(try_from_str=valid_positive))]
    pub growth_rate: f64,

    /// Maximum population size reached during simulations.
    #[clap(long, default_value("2000"))]
    pub maximum_size: u32,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
pub struct ToolArgs {
    /// Number of threads allocated to bcftools.
    #[clap(short='@', long, default_value("12"), parse(try_from_str=valid_thread_count))]
    pub threads: usize,

    /// Path to the bcftools executable.
    #[clap(long, default_value("bcftools"), parse(from_os_str))]
    pub bcftools: PathBuf,

    /// Path to the gzip executable.
    #[clap(long, default_value("gzip"), parse(from_os_str))]
    pub gzip: PathBuf,

    /// Path to the forward simulation executable (RFMix 'simulate').
    #[clap(long, default_value("rfmix/simulate"), parse(from_os_str))]
    pub simulator: PathBuf,

    /// Print every command of the pipeline, without running them.
    ///
    /// Note that the sample map partition is still performed.
    #[clap(long)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy)]
pub enum FileEntity {File, Directory}

impl Display for FileEntity {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::File      => write!(f, "File"),
            Self::Directory => write!(f, "Directory"),
        }
    }
}

impl FileEntity {
    fn validate(&self, path: &Path) -> Result<(), ParserError> {
        use ParserError::InvalidFileEntity;
        let valid = match self {
            Self::File      => path.is_file(),
            Self::Directory => path.is_dir()
        };

        if valid {
            Ok(())
        } else {
            Err(InvalidFileEntity(*self, path.display().to_string()))
        }
    }
}

/// Directory in which outputs sharing `basename` are written.
fn output_directory(basename: &Path) -> &Path {
    match basename.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn assert_filesystem_entity_is_valid(s: &OsStr, entity: &FileEntity) -> Result<()> {
    use ParserError::MissingFileEntity;
    let path = Path::new(s);
    if ! path.exists() {
        return Err(MissingFileEntity(*entity, path.display().to_string()))
            .loc("While parsing arguments.")
    }

    entity.validate(path).loc("While parsing arguments.")
}

fn valid_input_file(s: &OsStr) -> Result<PathBuf> {
    assert_filesystem_entity_is_valid(s, &FileEntity::File)
        .loc("While checking for file validity")?;
    Ok(PathBuf::from(s))
}

/// Create the leaf parent directory of the output basename if it is missing. Grand-parents are not created.
fn valid_output_basename(s: &OsStr) -> Result<PathBuf> {
    use ParserError::CreateOutputDir;
    let basename = PathBuf::from(s);
    let dir = output_directory(&basename);
    if ! dir.exists() {
        std::fs::create_dir(dir).map_err(CreateOutputDir).with_loc(|| format!("While creating {}", dir.display()))?;
    }
    assert_filesystem_entity_is_valid(dir.as_os_str(), &FileEntity::Directory)
        .loc("While checking for output directory validity")?;
    Ok(basename)
}

fn parse_bounded(s: &str, min: f64, max: f64) -> Result<f64> {
    use ParserError::ParseRatio;
    let value = s.parse::<f64>().with_loc(|| format!("While parsing {s}"))?;
    match (min..=max).contains(&value) {
        true  => Ok(value),
        false => Err(anyhow!(ParseRatio(min, max))).with_loc(|| format!("While parsing {s}"))
    }
}

/// Ensure the user input lies within the [0% - 100%] range. The value is kept as a percentage.
fn valid_percentage(s: &str) -> Result<f64> {
    parse_bounded(s, 0.0, 100.0)
}

fn valid_probability(s: &str) -> Result<f64> {
    parse_bounded(s, 0.0, 1.0)
}

fn valid_positive(s: &str) -> Result<f64> {
    let value = s.parse::<f64>().with_loc(|| format!("While parsing {s}"))?;
    match value > 0.0 && value.is_finite() {
        true  => Ok(value),
        false => Err(anyhow!(ParserError::NonPositive)).with_loc(|| format!("While parsing {s}"))
    }
}

fn valid_generations(s: &str) -> Result<u32> {
    use ParserError::InsufficientGenerations;
    let generations = s.parse::<u32>().with_loc(|| format!("While parsing {s}"))?;
    if generations < MIN_GENERATIONS {
        return Err(anyhow!(InsufficientGenerations(MIN_GENERATIONS, generations)))
            .loc("While parsing --n-generations")
    }
    Ok(generations)
}

fn valid_thread_count(s: &str) -> Result<usize> {
    match s.parse::<usize>().with_loc(|| format!("While parsing {s}"))? {
        0 => Err(anyhow!(ParserError::InvalidThreadCount)).loc("While parsing --threads"),
        n => Ok(n),
    }
}
