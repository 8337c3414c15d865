use std::path::{Path, PathBuf};

pub const FOUNDERS_MAP_SUFFIX : &str = ".founders.map";
pub const REFERENCE_MAP_SUFFIX: &str = ".ref.map";

/// Append a raw suffix to `basename`. Unlike `Path::with_extension()`, dots already present within
/// the basename are left untouched: `out/sim.v2` + `.ref.map` -> `out/sim.v2.ref.map`
pub fn suffixed_path(basename: &Path, suffix: &str) -> PathBuf {
    let mut path = basename.as_os_str().to_owned();
    path.push(suffix);
    PathBuf::from(path)
}

/// Output locations of a partitioned sample map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapPaths {
    founders : PathBuf,
    reference: PathBuf,
}

impl MapPaths {
    /// `<basename>.founders.map` and `<basename>.ref.map`
    pub fn from_basename(basename: &Path) -> Self {
        Self {
            founders : suffixed_path(basename, FOUNDERS_MAP_SUFFIX),
            reference: suffixed_path(basename, REFERENCE_MAP_SUFFIX),
        }
    }

    pub fn founders(&self) -> &Path {
        &self.founders
    }

    pub fn reference(&self) -> &Path {
        &self.reference
    }
}
