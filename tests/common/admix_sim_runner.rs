use std::{
    ffi::OsString,
    os::unix::process::CommandExt,
    path::Path,
    process::{Command, Output},
};

use clap::Parser;
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};

use super::StandIns;

/// Command line builder for end-to-end runs of `admix_sim::run()`
pub struct AdmixSimRunnerBuilder {
    args: Vec<OsString>,
}

impl AdmixSimRunnerBuilder {
    pub fn new(subcommand: &str) -> Self {
        Self{args: vec!["admix-sim".into(), subcommand.into()]}
    }

    pub fn arg(mut self, flag: &str, value: impl AsRef<Path>) -> Self {
        self.args.push(flag.into());
        self.args.push(value.as_ref().as_os_str().to_os_string());
        self
    }

    pub fn flag(mut self, flag: &str) -> Self {
        self.args.push(flag.into());
        self
    }

    /// Point every external tool towards its stand-in.
    pub fn stand_ins(self, stand_ins: &StandIns) -> Self {
        self.arg("--bcftools", stand_ins.path(super::stand_in::BCFTOOLS))
            .arg("--gzip", stand_ins.path(super::stand_in::GZIP))
            .arg("--simulator", stand_ins.path(super::stand_in::SIMULATE))
    }

    pub fn cli(&self) -> parser::Cli {
        parser::Cli::try_parse_from(self.args.clone()).unwrap_or_else(|e| panic!("Invalid command line: {e}"))
    }

    /// Run and return the process exit code.
    pub fn run(&self) -> i32 {
        match admix_sim::run(self.cli()) {
            Ok(())   => 0,
            Err(err) => {
                println!("{err:?}");
                admix_sim::exit_code(&err)
            },
        }
    }

    /// Run the `admix-sim` executable within its own process group.
    pub fn spawn(&self) -> Output {
        let mut command = Command::new(env!("CARGO_BIN_EXE_admix-sim"));
        command.args(&self.args[1..]).process_group(0);
        // SAFETY: sigaction is async-signal-safe. Interrupts may be ignored by whoever launched the tests.
        unsafe {
            command.pre_exec(|| {
                let default = SigAction::new(SigHandler::SigDfl, SaFlags::empty(), SigSet::empty());
                sigaction(Signal::SIGINT, &default).map(drop).map_err(std::io::Error::from)
            });
        }
        command.output().expect("Failed to run admix-sim")
    }
}
