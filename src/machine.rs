//! Host CPU identification, used as the default plot title.

use std::path::Path;

const CPUINFO: &str = "/proc/cpuinfo";

/// CPU model name of the running machine, if the platform exposes one.
pub fn cpu_model_name() -> Option<String> {
    cpu_model_name_from(Path::new(CPUINFO))
}

pub fn cpu_model_name_from(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => parse_model_name(&text),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "cpu model name unavailable");
            None
        }
    }
}

/// Value of the first `model name` entry in cpuinfo-formatted text.
pub fn parse_model_name(cpuinfo: &str) -> Option<String> {
    cpuinfo
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(key, _)| key.trim() == "model name")
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
