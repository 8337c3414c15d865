use std::path::{Path, PathBuf};

use crate::Invocation;

#[derive(Debug, Clone)]
pub struct Gzip {
    program: PathBuf,
}

impl Gzip {
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self{program: program.as_ref().to_path_buf()}
    }

    /// `gzip -dc <input> > <output>`
    pub fn decompress(&self, input: &Path, output: &Path) -> Invocation {
        Invocation::new(&self.program)
            .arg("-dc")
            .arg(input)
            .stdout(output)
    }
}
