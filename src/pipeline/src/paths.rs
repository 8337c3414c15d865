use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;
use sample_map::{MapPaths, suffixed_path};

pub const FOUNDERS_BCF_SUFFIX : &str = ".founders.bcf.gz";
pub const REFERENCE_BCF_SUFFIX: &str = ".ref.bcf.gz";

lazy_static! {
    static ref VCF_EXTENSION: Regex = Regex::new(r"\.vcf(\.gz|\.bgz)?$").expect("Failed to parse regex.");
    static ref GZ_EXTENSION : Regex = Regex::new(r"\.(bgz|gz)$").expect("Failed to parse regex.");
}

fn replace_extension(path: &Path, regex: &Regex, replacement: &str) -> Option<PathBuf> {
    let path = path.to_str()?;
    regex.is_match(path).then(|| PathBuf::from(regex.replace(path, replacement).into_owned()))
}

/// Compressed BCF location of a VCF panel: `panel.vcf[.gz|.bgz]` -> `panel.bcf.gz`.
/// `None` if `input` is not recognized as a VCF file, in which case it is used as is.
pub fn converted_bcf_path(input: &Path) -> Option<PathBuf> {
    replace_extension(input, &VCF_EXTENSION, ".bcf.gz")
}

/// Decompressed location of a gzipped genetic map: `map.tsv.gz` -> `map.tsv`.
/// `None` if `map` does not end with '.gz' or '.bgz'.
pub fn decompressed_path(map: &Path) -> Option<PathBuf> {
    replace_extension(map, &GZ_EXTENSION, "")
}

/// Every output file sharing the user-provided basename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    basename     : PathBuf,
    maps         : MapPaths,
    founders_bcf : PathBuf,
    reference_bcf: PathBuf,
}

impl OutputPaths {
    pub fn from_basename(basename: &Path) -> Self {
        Self {
            basename     : basename.to_path_buf(),
            maps         : MapPaths::from_basename(basename),
            founders_bcf : suffixed_path(basename, FOUNDERS_BCF_SUFFIX),
            reference_bcf: suffixed_path(basename, REFERENCE_BCF_SUFFIX),
        }
    }

    pub fn basename(&self) -> &Path {
        &self.basename
    }

    pub fn maps(&self) -> &MapPaths {
        &self.maps
    }

    pub fn founders_bcf(&self) -> &Path {
        &self.founders_bcf
    }

    pub fn reference_bcf(&self) -> &Path {
        &self.reference_bcf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vcf_conversion_targets() {
        for input in ["data/panel.vcf", "data/panel.vcf.gz", "data/panel.vcf.bgz"] {
            assert_eq!(converted_bcf_path(Path::new(input)), Some(PathBuf::from("data/panel.bcf.gz")), "{input}");
        }
    }

    #[test]
    fn non_vcf_inputs_are_kept() {
        for input in ["panel.bcf.gz", "panel.bcf", "panel.vcf.zst", "panel.vcf.gz.tbi", "vcf"] {
            assert_eq!(converted_bcf_path(Path::new(input)), None, "{input}");
        }
    }

    #[test]
    fn only_the_trailing_extension_is_replaced() {
        let input = Path::new("runs.vcf/chr20.vcf.gz");
        assert_eq!(converted_bcf_path(input), Some(PathBuf::from("runs.vcf/chr20.bcf.gz")));
    }

    #[test]
    fn decompressed_maps() {
        assert_eq!(decompressed_path(Path::new("maps/chr20.tsv.gz")), Some(PathBuf::from("maps/chr20.tsv")));
        assert_eq!(decompressed_path(Path::new("maps/chr20.tsv.bgz")), Some(PathBuf::from("maps/chr20.tsv")));
        assert_eq!(decompressed_path(Path::new("maps/chr20.tsv")), None);
        assert_eq!(decompressed_path(Path::new("maps/chr20.tgz")), None);
    }

    #[test]
    fn output_paths() {
        let paths = OutputPaths::from_basename(Path::new("out/sim"));
        assert_eq!(paths.basename(), Path::new("out/sim"));
        assert_eq!(paths.maps().founders(), Path::new("out/sim.founders.map"));
        assert_eq!(paths.maps().reference(), Path::new("out/sim.ref.map"));
        assert_eq!(paths.founders_bcf(), Path::new("out/sim.founders.bcf.gz"));
        assert_eq!(paths.reference_bcf(), Path::new("out/sim.ref.bcf.gz"));
    }
}
