use std::{
    fmt::{self, Display, Formatter},
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use anyhow::Result;
use located_error::LocatedError;

use crate::{SampleMapError, MAP_SEPARATOR};

/// A single line of a sample map.
/// # Fields
/// - `id`           : sample identifier, as found within the header of the reference panel.
/// - `subpopulation`: population label attached to this sample.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SampleRecord {
    id           : String,
    subpopulation: String,
}

impl SampleRecord {
    pub fn new(id: &str, subpopulation: &str) -> Self {
        Self{id: id.to_string(), subpopulation: subpopulation.to_string()}
    }

    /// Parse a raw sample map line. Surrounding whitespace is ignored.
    ///
    /// # Errors
    /// - `MalformedLine` if the line does not hold exactly two tab-separated fields.
    ///   `line_number` is only used to report the faulty line.
    pub fn from_line(line: &str, line_number: usize) -> Result<Self, SampleMapError> {
        let fields = line.trim().split(MAP_SEPARATOR).collect::<Vec<&str>>();
        match fields.as_slice() {
            [id, subpopulation] => Ok(Self::new(id, subpopulation)),
            _ => Err(SampleMapError::MalformedLine{line: line_number, fields: fields.len()}),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn subpopulation(&self) -> &str {
        &self.subpopulation
    }
}

impl Display for SampleRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}{MAP_SEPARATOR}{}", self.id, self.subpopulation)
    }
}

/// Return the sample ids of a sample map (i.e. its first column), in file order.
/// Blank lines are skipped.
pub fn read_sample_ids(path: &Path) -> Result<Vec<String>> {
    use SampleMapError::{OpenFile, ReadLine};
    let loc_msg = || format!("While reading sample ids from {}", path.display());

    let reader = BufReader::new(File::open(path).map_err(OpenFile).with_loc(loc_msg)?);
    let mut ids = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(ReadLine).with_loc(loc_msg)?;
        let line = line.trim();
        if line.is_empty() {
            continue
        }
        let id = line.split(MAP_SEPARATOR).next().unwrap_or(line);
        ids.push(id.to_string());
    }
    Ok(ids)
}
