#[cfg(test)]
mod fixture;
pub use fixture::Fixture;

#[cfg(unix)]
pub mod stand_in;
#[cfg(unix)]
pub use stand_in::StandIns;

#[cfg(unix)]
mod admix_sim_runner;
#[cfg(unix)]
pub use admix_sim_runner::AdmixSimRunnerBuilder;

/// Read a file into its lines.
pub fn read_lines(path: impl AsRef<std::path::Path>) -> Vec<String> {
    let path = path.as_ref();
    std::fs::read_to_string(path)
        .unwrap_or_else(|_| panic!("Failed to open {}", path.display()))
        .lines()
        .map(str::to_string)
        .collect()
}
