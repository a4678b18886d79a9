use std::env;

/// Argon2id cost parameters.
///
/// Defaults: 64 MiB of memory, one pass, four lanes, 32-byte output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HasherConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
    pub output_len: usize,
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self {
            memory_kib: 64 * 1024,
            iterations: 1,
            parallelism: 4,
            output_len: 32,
        }
    }
}

impl HasherConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            memory_kib: read_u32("ARGON2_MEMORY_KIB").unwrap_or(defaults.memory_kib),
            iterations: read_u32("ARGON2_ITERATIONS").unwrap_or(defaults.iterations),
            parallelism: read_u32("ARGON2_PARALLELISM").unwrap_or(defaults.parallelism),
            output_len: defaults.output_len,
        }
    }
}

fn read_u32(key: &str) -> Option<u32> {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .filter(|v| *v > 0)
}
