use std::{
    fmt::{self, Display, Formatter},
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use anyhow::Result;
use located_error::LocatedError;
use log::{debug, info, trace, warn};

use crate::{MapPaths, SampleMapError, SampleRecord};

/// Which output set a sample was drawn into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {Founder, Reference}

impl Display for Assignment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Founder   => write!(f, "founder"),
            Self::Reference => write!(f, "reference"),
        }
    }
}

/// Number of records written into each output set.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PartitionSummary {
    pub founders : usize,
    pub reference: usize,
}

impl PartitionSummary {
    pub fn total(&self) -> usize {
        self.founders + self.reference
    }

    fn record(&mut self, assignment: Assignment) {
        match assignment {
            Assignment::Founder   => self.founders  += 1,
            Assignment::Reference => self.reference += 1,
        }
    }
}

/// Randomly split a sample map into a founder and a reference set.
///
/// The generator (`fastrand`, wyrand) is seeded once, and exactly one uniform value in `[0, 1)` is drawn
/// per record, in input order. A record is a founder whenever its draw is lower than `probability`.
/// Thus, a given seed and a given input always yield the same partition.
#[derive(Debug, Clone, Copy)]
pub struct Partitioner {
    probability: f64,
    seed       : i64,
}

impl Partitioner {
    /// # Errors
    /// - `InvalidProbability` if `probability` is NaN or lies outside of `[0, 1]`
    pub fn new(probability: f64, seed: i64) -> Result<Self, SampleMapError> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(SampleMapError::InvalidProbability(probability))
        }
        Ok(Self{probability, seed})
    }

    fn rng(&self) -> fastrand::Rng {
        // Negative seeds are reinterpreted, bit for bit.
        fastrand::Rng::with_seed(self.seed as u64)
    }

    fn assign(&self, rng: &mut fastrand::Rng) -> Assignment {
        match rng.f64() < self.probability {
            true  => Assignment::Founder,
            false => Assignment::Reference,
        }
    }

    /// Read records from `reader` and dispatch each of them within `founders` or `reference`.
    /// Relative line order is preserved within each output. Blank lines are skipped without drawing.
    ///
    /// # Errors
    /// - `MalformedLine` on the first line which is not a valid sample record. Records read before
    ///   that line may already have been written.
    /// - `ReadLine` / `WriteRecord` on I/O failures.
    pub fn partition<R, W, V>(&self, reader: R, founders: &mut W, reference: &mut V) -> Result<PartitionSummary>
    where   R: BufRead,
            W: Write,
            V: Write,
    {
        use SampleMapError::{ReadLine, WriteRecord};
        let mut rng     = self.rng();
        let mut summary = PartitionSummary::default();

        for (i, line) in reader.lines().enumerate() {
            let line_number = i + 1;
            let line = line.map_err(ReadLine).with_loc(|| format!("While reading line {line_number}"))?;
            if line.trim().is_empty() {
                continue
            }

            let record = SampleRecord::from_line(&line, line_number).loc("While partitioning sample map")?;
            let assignment = self.assign(&mut rng);
            trace!("{} -> {assignment}", record.id());

            let writer: &mut dyn Write = match assignment {
                Assignment::Founder   => &mut *founders,
                Assignment::Reference => &mut *reference,
            };
            writeln!(writer, "{record}").map_err(WriteRecord).with_loc(|| format!("While writing {assignment} record '{}'", record.id()))?;
            summary.record(assignment);
        }

        founders.flush().map_err(WriteRecord).loc("While flushing founders map")?;
        reference.flush().map_err(WriteRecord).loc("While flushing reference map")?;
        Ok(summary)
    }

    /// Partition the sample map located at `sample_map`, and write the two output sets at `outputs`.
    /// Existing output files are overwritten.
    pub fn partition_files(&self, sample_map: &Path, outputs: &MapPaths) -> Result<PartitionSummary> {
        use SampleMapError::{OpenFile, CreateFile};
        let loc_msg = || format!("While partitioning sample map {}", sample_map.display());

        info!("Partitioning {} (founder probability: {}, seed: {})", sample_map.display(), self.probability, self.seed);
        let reader = BufReader::new(File::open(sample_map).map_err(OpenFile).with_loc(loc_msg)?);

        let create = |path: &Path| -> Result<BufWriter<File>> {
            debug!("Creating {}", path.display());
            let file = File::create(path).map_err(CreateFile).with_loc(|| format!("While creating {}", path.display()))?;
            Ok(BufWriter::new(file))
        };
        let mut founders  = create(outputs.founders())?;
        let mut reference = create(outputs.reference())?;

        let summary = self.partition(reader, &mut founders, &mut reference).with_loc(loc_msg)?;

        info!("Selected {} founder(s) and {} reference sample(s), out of {} samples.", summary.founders, summary.reference, summary.total());
        if summary.founders == 0 {
            warn!("No founder was selected from {}. The simulation will lack founder individuals.", sample_map.display());
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;
    use std::io::Cursor;

    const TINY_MAP: &str = "A\tpop1\nB\tpop1\nC\tpop2\n";

    fn build_map(n: usize) -> String {
        (0..n).map(|i| format!("HG{i:05}\tpop{}\n", i % 5)).collect()
    }

    fn run(map: &str, probability: f64, seed: i64) -> (String, String, PartitionSummary) {
        let partitioner = Partitioner::new(probability, seed).expect("valid probability");
        let (mut founders, mut reference) = (Vec::new(), Vec::new());
        let summary = partitioner.partition(Cursor::new(map), &mut founders, &mut reference).expect("partition");
        (String::from_utf8(founders).unwrap(), String::from_utf8(reference).unwrap(), summary)
    }

    #[test]
    fn reproducible_under_fixed_seed() {
        let map = build_map(200);
        let first = run(&map, 0.3, 42);
        for _ in 0..5 {
            assert_eq!(run(&map, 0.3, 42), first);
        }
        assert_eq!(run(TINY_MAP, 0.5, 42), run(TINY_MAP, 0.5, 42));
    }

    #[test]
    fn fixed_seed_split_is_stable() {
        let (founders, reference, summary) = run(TINY_MAP, 0.5, 42);
        assert_eq!(founders, "B\tpop1\n");
        assert_eq!(reference, "A\tpop1\nC\tpop2\n");
        assert_eq!(summary, PartitionSummary{founders: 1, reference: 2});
    }

    #[test]
    fn outputs_are_a_disjoint_cover() {
        let map = build_map(500);
        for seed in [0, 1, 42, -7, 0xDEAD_BEEF] {
            let (founders, reference, summary) = run(&map, 0.25, seed);
            let founders  = founders.lines().collect::<Vec<_>>();
            let reference = reference.lines().collect::<Vec<_>>();

            assert_eq!(summary.founders, founders.len());
            assert_eq!(summary.reference, reference.len());
            assert!(founders.iter().all(|line| !reference.contains(line)));

            let union = founders.iter().chain(reference.iter()).copied().sorted().collect::<Vec<_>>();
            let input = map.lines().sorted().collect::<Vec<_>>();
            assert_eq!(union, input);
        }
    }

    #[test]
    fn line_order_is_preserved() {
        let map = build_map(300);
        let (founders, reference, _) = run(&map, 0.5, 1234);
        for output in [founders, reference] {
            let positions = output.lines()
                .map(|line| map.lines().position(|input| input == line).expect("output line missing from input"))
                .collect::<Vec<usize>>();
            assert!(positions.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn extreme_probabilities() {
        let map = build_map(100);
        let (founders, reference, summary) = run(&map, 0.0, 42);
        assert!(founders.is_empty());
        assert_eq!(reference, map);
        assert_eq!(summary, PartitionSummary{founders: 0, reference: 100});

        let (founders, reference, summary) = run(&map, 1.0, 42);
        assert!(reference.is_empty());
        assert_eq!(founders, map);
        assert_eq!(summary, PartitionSummary{founders: 100, reference: 0});
    }

    #[test]
    fn seed_changes_partition() {
        let map = build_map(200);
        assert_ne!(run(&map, 0.5, 1).0, run(&map, 0.5, 2).0);
    }

    #[test]
    fn blank_lines_do_not_consume_draws() {
        let map    = build_map(50);
        let spaced = map.lines().map(|line| format!("{line}\n\n")).collect::<String>();
        let (founders, reference, _) = run(&map, 0.5, 9);
        let (spaced_founders, spaced_reference, _) = run(&spaced, 0.5, 9);
        assert_eq!(founders, spaced_founders);
        assert_eq!(reference, spaced_reference);
    }

    #[test]
    fn records_are_normalized() {
        let (founders, reference, _) = run("A\tpop1\r\n  B\tpop2  \n", 1.0, 0);
        assert_eq!(founders, "A\tpop1\nB\tpop2\n");
        assert!(reference.is_empty());
    }

    #[test]
    fn malformed_line_is_reported() {
        let partitioner = Partitioner::new(0.5, 42).unwrap();
        let (mut founders, mut reference) = (Vec::new(), Vec::new());
        let err = partitioner.partition(Cursor::new("A\tpop1\n\nB pop1\n"), &mut founders, &mut reference).unwrap_err();

        let malformed = err.chain().find_map(|e| e.downcast_ref::<SampleMapError>());
        assert!(matches!(malformed, Some(SampleMapError::MalformedLine{line: 3, fields: 1})), "{err:?}");
    }

    #[test]
    fn invalid_probabilities() {
        for probability in [-0.1, 1.01, f64::NAN, f64::INFINITY] {
            assert!(matches!(Partitioner::new(probability, 0), Err(SampleMapError::InvalidProbability(_))));
        }
        assert!(Partitioner::new(0.0, 0).is_ok());
        assert!(Partitioner::new(1.0, 0).is_ok());
    }

    #[test]
    fn partition_files_matches_in_memory_partition() -> Result<()> {
        let tmpdir = tempfile::tempdir()?;
        let input  = tmpdir.path().join("panel.map");
        std::fs::write(&input, build_map(64))?;

        let outputs = MapPaths::from_basename(&tmpdir.path().join("sim.v1"));
        let partitioner = Partitioner::new(0.4, 77)?;
        let summary = partitioner.partition_files(&input, &outputs)?;

        let (founders, reference, expected) = run(&build_map(64), 0.4, 77);
        assert_eq!(summary, expected);
        assert_eq!(std::fs::read_to_string(outputs.founders())?, founders);
        assert_eq!(std::fs::read_to_string(outputs.reference())?, reference);

        // Overwrite on rerun, byte-identical
        partitioner.partition_files(&input, &outputs)?;
        assert_eq!(std::fs::read_to_string(outputs.founders())?, founders);
        Ok(())
    }
}
