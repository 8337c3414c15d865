use std::{
    ffi::{OsStr, OsString},
    fmt::{self, Display, Formatter},
    fs::File,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    process::{Command, ExitStatus, Stdio},
    time::Duration,
};

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::debug;

use crate::PipelineError;

/// A fully resolved external command: executable, ordered arguments, and optional stdin/stdout plumbing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: PathBuf,
    args   : Vec<OsString>,
    stdin  : Option<Vec<u8>>,
    stdout : Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self{program: program.as_ref().to_path_buf(), args: Vec::new(), stdin: None, stdout: None}
    }

    #[must_use]
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where   I: IntoIterator<Item = S>,
            S: AsRef<OsStr>,
    {
        self.args.extend(args.into_iter().map(|arg| arg.as_ref().to_os_string()));
        self
    }

    /// Feed `payload` to the standard input of the process.
    #[must_use]
    pub fn stdin(mut self, payload: Vec<u8>) -> Self {
        self.stdin = Some(payload);
        self
    }

    /// Redirect the standard output of the process into `path` (truncated).
    #[must_use]
    pub fn stdout(mut self, path: impl AsRef<Path>) -> Self {
        self.stdout = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    pub fn stdin_payload(&self) -> Option<&[u8]> {
        self.stdin.as_deref()
    }

    pub fn stdout_path(&self) -> Option<&Path> {
        self.stdout.as_deref()
    }

    /// Short name of the executable, for log messages.
    pub fn program_name(&self) -> String {
        self.program.file_name()
            .unwrap_or(self.program.as_os_str())
            .to_string_lossy()
            .into_owned()
    }
}

impl Display for Invocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        if let Some(payload) = &self.stdin {
            write!(f, " < [{} line(s) from stdin]", payload.iter().filter(|&&b| b == b'\n').count())?;
        }
        if let Some(path) = &self.stdout {
            write!(f, " > {}", path.display())?;
        }
        Ok(())
    }
}

/// Termination status of an external command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Success,
    Exited(i32),
    Signaled(i32),
}

impl From<ExitStatus> for CommandStatus {
    fn from(status: ExitStatus) -> Self {
        if status.success() {
            return Self::Success
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Self::Signaled(signal)
            }
        }

        Self::Exited(status.code().unwrap_or(1))
    }
}

/// Execute an [`Invocation`] to completion.
#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandStatus, PipelineError>;
}

/// Spawn invocations as child processes, one at a time.
#[derive(Debug, Default)]
pub struct SystemRunner {
    progress: Option<MultiProgress>,
}

impl SystemRunner {
    /// Display a spinner within `progress` while each command is running.
    pub fn new(progress: Option<MultiProgress>) -> Self {
        Self{progress}
    }

    fn spinner(&self, invocation: &Invocation) -> Option<Spinner> {
        let style = ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());

        self.progress.as_ref().map(|multi| {
            let spinner = multi.add(ProgressBar::new_spinner());
            spinner.set_style(style);
            spinner.set_message(invocation.program_name());
            spinner.enable_steady_tick(Duration::from_millis(120));
            Spinner(spinner)
        })
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandStatus, PipelineError> {
        use PipelineError::{Spawn, Stdin, Stdout, Wait};
        let program = invocation.program_name();

        let mut command = Command::new(invocation.program());
        command.args(invocation.get_args());

        if invocation.stdin_payload().is_some() {
            command.stdin(Stdio::piped());
        }

        if let Some(path) = invocation.stdout_path() {
            let file = File::create(path)
                .map_err(|source| Stdout{program: program.clone(), path: path.display().to_string(), source})?;
            command.stdout(Stdio::from(file));
        }

        let mut child = command.spawn().map_err(|source| Spawn{program: program.clone(), source})?;
        debug!("Spawned '{program}' (pid: {})", child.id());

        // The child was spawned with default dispositions: only the driver ignores interrupts.
        #[cfg(unix)]
        let _interrupts = interrupts::Ignored::new();
        let _spinner = self.spinner(invocation);

        if let (Some(payload), Some(mut stdin)) = (invocation.stdin_payload(), child.stdin.take()) {
            // A child exiting early closes the pipe on its own: its exit status is what matters then.
            match stdin.write_all(payload) {
                Err(e) if e.kind() != ErrorKind::BrokenPipe => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(Stdin{program, source: e})
                },
                _ => drop(stdin),
            }
        }

        let status = CommandStatus::from(child.wait().map_err(|source| Wait{program: program.clone(), source})?);
        debug!("'{program}' terminated with status {status:?}");
        Ok(status)
    }
}

/// Progress spinner of a running command. Cleared once dropped.
struct Spinner(ProgressBar);

impl Drop for Spinner {
    fn drop(&mut self) {
        self.0.finish_and_clear();
    }
}

#[cfg(unix)]
mod interrupts {
    use std::sync::{Mutex, PoisonError};

    use log::warn;
    use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};

    const SIGNALS: [Signal; 2] = [Signal::SIGINT, Signal::SIGQUIT];

    struct Dispositions {
        holders : usize,
        previous: Vec<(Signal, SigAction)>,
    }

    static DISPOSITIONS: Mutex<Dispositions> = Mutex::new(Dispositions{holders: 0, previous: Vec::new()});

    /// Ignore SIGINT and SIGQUIT within the current process, the way `system(3)` does while its child
    /// runs. An interrupt sent to the whole process group then only terminates the child, and its
    /// status gets reported. Previous dispositions are restored once the last guard is dropped.
    pub struct Ignored(());

    impl Ignored {
        pub fn new() -> Self {
            let mut state = DISPOSITIONS.lock().unwrap_or_else(PoisonError::into_inner);
            if state.holders == 0 {
                let ignore = SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::empty());
                for signal in SIGNALS {
                    // SAFETY: SIG_IGN installs no handler.
                    match unsafe { sigaction(signal, &ignore) } {
                        Ok(action) => state.previous.push((signal, action)),
                        Err(e)     => warn!("Failed to ignore {signal} while waiting for a command: {e}"),
                    }
                }
            }
            state.holders += 1;
            Self(())
        }
    }

    impl Drop for Ignored {
        fn drop(&mut self) {
            let mut state = DISPOSITIONS.lock().unwrap_or_else(PoisonError::into_inner);
            state.holders -= 1;
            if state.holders > 0 {
                return
            }
            while let Some((signal, action)) = state.previous.pop() {
                // SAFETY: restores a disposition which was previously installed.
                if let Err(e) = unsafe { sigaction(signal, &action) } {
                    warn!("Failed to restore the disposition of {signal}: {e}");
                }
            }
        }
    }

}

/// Print invocations on the standard output, without running anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunner;

impl CommandRunner for DryRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandStatus, PipelineError> {
        println!("{invocation}");
        Ok(CommandStatus::Success)
    }
}
