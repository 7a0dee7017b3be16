//! Pool retention settings.
//!
//! [`PoolConfig`] can be built in code, deserialized (with the `serde`
//! feature), or parsed from settings text:
//!
//! | Line                        | Action                     |
//! |-----------------------------|----------------------------|
//! | `name = value`              | set a setting              |
//! | Lines starting with `;`/`#` | comment, ignored           |
//!
//! | Setting                | Meaning                                          |
//! |------------------------|--------------------------------------------------|
//! | `max_idle`             | idle splicers kept by the pool                   |
//! | `max_text_capacity`    | largest text buffer (bytes) worth keeping        |
//! | `max_scratch_capacity` | largest scratch buffer (bytes) worth keeping     |
//! | `max_entries`          | largest dictionary + export count worth keeping  |

// ── Public API ────────────────────────────────────────────────────────────────

/// A non-fatal error encountered while loading settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("line {line}: unknown setting `{name}`")]
    UnknownSetting { line: usize, name: String },
    #[error("line {line}: invalid value `{value}` for `{name}`")]
    InvalidValue { line: usize, name: String, value: String },
    #[error("line {line}: expected `name = value`")]
    Malformed { line: usize },
}

/// Ceilings deciding whether a released splicer goes back to the pool.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct PoolConfig {
    pub max_idle: usize,
    pub max_text_capacity: usize,
    pub max_scratch_capacity: usize,
    pub max_entries: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        let parallelism = std::thread::available_parallelism().map_or(4, |p| p.get());
        Self {
            max_idle: parallelism * 4,
            max_text_capacity: 16 * 1024,
            max_scratch_capacity: 4 * 1024,
            max_entries: 128,
        }
    }
}

impl PoolConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_idle(mut self, n: usize) -> Self {
        self.max_idle = n;
        self
    }

    pub fn with_max_text_capacity(mut self, bytes: usize) -> Self {
        self.max_text_capacity = bytes;
        self
    }

    pub fn with_max_scratch_capacity(mut self, bytes: usize) -> Self {
        self.max_scratch_capacity = bytes;
        self
    }

    pub fn with_max_entries(mut self, n: usize) -> Self {
        self.max_entries = n;
        self
    }

    fn slot(&mut self, name: &str) -> Option<&mut usize> {
        match name {
            "max_idle" => Some(&mut self.max_idle),
            "max_text_capacity" => Some(&mut self.max_text_capacity),
            "max_scratch_capacity" => Some(&mut self.max_scratch_capacity),
            "max_entries" => Some(&mut self.max_entries),
            _ => None,
        }
    }

    /// Parse a settings string on top of the defaults.
    ///
    /// Returns the config and every error found; bad lines are skipped.
    pub fn load_str(s: &str) -> (Self, Vec<ConfigError>) {
        let mut config = PoolConfig::default();
        let mut errors = Vec::new();

        for (i, raw) in s.lines().enumerate() {
            let line = i + 1;
            let text = raw.trim();

            if text.is_empty() || text.starts_with(';') || text.starts_with('#') {
                continue;
            }

            let Some((name, value)) = split_setting(text) else {
                errors.push(ConfigError::Malformed { line });
                continue;
            };

            match (config.slot(name), parse_size(value)) {
                (Some(slot), Some(n)) => *slot = n,
                (Some(_), None) => errors.push(ConfigError::InvalidValue {
                    line,
                    name: name.to_owned(),
                    value: value.to_owned(),
                }),
                (None, _) => errors.push(ConfigError::UnknownSetting { line, name: name.to_owned() }),
            }
        }

        (config, errors)
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// `name = value` or `name=value`.
fn split_setting(s: &str) -> Option<(&str, &str)> {
    let (name, value) = s.split_once('=')?;
    let (name, value) = (name.trim(), value.trim());
    if name.is_empty() || value.is_empty() {
        None
    } else {
        Some((name, value))
    }
}

/// A byte count or plain number, with optional `k`/`m` (binary) suffix.
fn parse_size(s: &str) -> Option<usize> {
    let lower = s.to_ascii_lowercase();
    let (digits, mult) = if let Some(d) = lower.strip_suffix('k') {
        (d, 1024)
    } else if let Some(d) = lower.strip_suffix('m') {
        (d, 1024 * 1024)
    } else {
        (lower.as_str(), 1)
    };
    digits.trim().parse::<usize>().ok()?.checked_mul(mult)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
