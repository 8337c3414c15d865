//! Shell scripts standing in for bcftools, gzip and the forward simulator.
//!
//! Every stand-in appends its own command line to a shared `calls.log` file, so that tests may check
//! which commands ran, and in which order.

use std::{fs, os::unix::fs::PermissionsExt, path::PathBuf};

use tempfile::TempDir;

pub const BCFTOOLS: &str = "bcftools";
pub const GZIP    : &str = "gzip";
pub const SIMULATE: &str = "simulate";

/// `bcftools view` writes the sample ids it receives through stdin into its output file.
const BCFTOOLS_BODY: &str = r#"
if [ "$1" = "view" ]; then
    out=""; samples=""
    while [ $# -gt 0 ]; do
        case "$1" in
            --output-file)  out="$2";     shift ;;
            --samples-file) samples="$2"; shift ;;
        esac
        shift
    done
    if [ "$samples" = "-" ]; then cat > "$out"; else : > "$out"; fi
fi
exit 0
"#;

/// `gzip -dc <file>`: test maps are stored uncompressed.
const GZIP_BODY: &str = r#"
cat "$2"
"#;

/// Fails with code 9 if the genetic map is missing at simulation time.
const SIMULATE_BODY: &str = r#"
while [ $# -gt 0 ]; do
    if [ "$1" = "-g" ]; then map="$2"; fi
    shift
done
[ -f "$map" ] || exit 9
exit 0
"#;

pub struct StandIns {
    dir: TempDir,
}

impl StandIns {
    pub fn new() -> Self {
        let stand_ins = Self{dir: tempfile::tempdir().expect("Failed to generate temp directory")};
        for tool in [BCFTOOLS, GZIP, SIMULATE] {
            stand_ins.set_hook(tool, "");
        }
        stand_ins
    }

    /// Rewrite `tool` so that `hook` runs right after the call is logged.
    /// e.g. `[ "$1" = "index" ] && exit 3`
    pub fn set_hook(&self, tool: &str, hook: &str) {
        let body = match tool {
            BCFTOOLS => BCFTOOLS_BODY,
            GZIP     => GZIP_BODY,
            SIMULATE => SIMULATE_BODY,
            other    => panic!("Unknown stand-in {other}"),
        };
        let script = format!("#!/bin/sh\necho \"{tool} $*\" >> '{}'\n{hook}\n{body}", self.log().display());
        let path = self.path(tool);
        fs::write(&path, script).expect("Failed to write stand-in script");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("Failed to set permissions");
    }

    pub fn path(&self, tool: &str) -> PathBuf {
        self.dir.path().join(tool)
    }

    fn log(&self) -> PathBuf {
        self.dir.path().join("calls.log")
    }

    /// Every logged call, in order. Each call is rendered as `<tool> <args...>`
    pub fn calls(&self) -> Vec<String> {
        match fs::read_to_string(self.log()) {
            Ok(log) => log.lines().map(str::to_string).collect(),
            Err(_)  => Vec::new(),
        }
    }

    /// Calls, truncated to their tool name and first argument.
    pub fn steps(&self) -> Vec<String> {
        self.calls().iter()
            .map(|call| call.split_whitespace().take(2).collect::<Vec<_>>().join(" "))
            .collect()
    }
}
