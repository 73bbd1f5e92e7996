use std::path::PathBuf;
use std::time::Duration;

/// Tunables read once at startup from the environment, the way
/// `builtin_cd` reads `HOME`/`OLDPWD` directly rather than threading a
/// config file through the program. See SPEC_FULL.md §10.3.
#[derive(Debug, Clone)]
pub struct Config {
    pub max_printers: usize,
    pub max_jobs: usize,
    pub spool_dir: PathBuf,
    pub retention: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            max_printers: env_usize("SPOOLD_MAX_PRINTERS", 16),
            max_jobs: env_usize("SPOOLD_MAX_JOBS", 64),
            spool_dir: std::env::var("SPOOLD_SPOOL_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./spool")),
            retention: Duration::from_secs(env_usize("SPOOLD_RETENTION_SECS", 10) as u64),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_printers: 16,
            max_jobs: 64,
            spool_dir: PathBuf::from("./spool"),
            retention: Duration::from_secs(10),
        }
    }
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
