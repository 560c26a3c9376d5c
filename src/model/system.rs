use std::fs;
use std::thread;

const UNKNOWN: &str = "Unknown";

/// Host facts, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemInfo {
    pub os_name: String,
    pub os_version: String,
    pub architecture: String,
    pub cpu_cores: usize,
    pub total_memory_mb: u64,
    pub available_memory_mb: u64,
}

impl SystemInfo {
    /// Never fails: missing sources leave `Unknown` / `0` in place.
    pub fn detect() -> Self {
        let os_release = fs::read_to_string("/etc/os-release").unwrap_or_default();
        let (os_name, os_version) = parse_os_release(&os_release);

        let meminfo = fs::read_to_string("/proc/meminfo").unwrap_or_default();
        let (total_memory_mb, available_memory_mb) = parse_meminfo(&meminfo);

        let info = Self {
            os_name,
            os_version,
            architecture: std::env::consts::ARCH.to_string(),
            cpu_cores: thread::available_parallelism().map_or(1, |n| n.get()),
            total_memory_mb,
            available_memory_mb,
        };
        tracing::debug!(?info, "system detected");
        info
    }
}

/// `(PRETTY_NAME, VERSION_ID)`, falling back to `NAME` and then `Unknown`.
pub fn parse_os_release(text: &str) -> (String, String) {
    let value = |key: &str| {
        text.lines()
            .find_map(|line| line.strip_prefix(key)?.strip_prefix('='))
            .map(|v| v.trim().trim_matches('"').to_string())
            .filter(|v| !v.is_empty())
    };

    let name = value("PRETTY_NAME")
        .or_else(|| value("NAME"))
        .unwrap_or_else(|| UNKNOWN.to_string());
    let version = value("VERSION_ID").unwrap_or_else(|| UNKNOWN.to_string());
    (name, version)
}

/// `(total, available)` in MB. `MemAvailable` is preferred over `MemFree`.
pub fn parse_meminfo(text: &str) -> (u64, u64) {
    let kb = |key: &str| {
        text.lines()
            .find_map(|line| line.strip_prefix(key)?.strip_prefix(':'))
            .and_then(|rest| rest.split_whitespace().next())
            .and_then(|v| v.parse::<u64>().ok())
    };

    let total = kb("MemTotal").unwrap_or(0);
    let available = kb("MemAvailable").or_else(|| kb("MemFree")).unwrap_or(0);
    (total / 1024, available / 1024)
}
