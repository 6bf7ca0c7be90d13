//! Run configuration shared by the front-ends.

use crate::types::{DEFAULT_MAX_STEPS, DEFAULT_STRIP_LEN, FIRST_LABEL};
use serde::{Deserialize, Serialize};

/// How a machine is laid out and how long it may run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Strip length in bytes.
    pub strip_len: usize,
    /// Initial head bit offset. `None` places the head on the middle bit of the strip.
    pub start_bit: Option<i64>,
    /// Label of the initial state.
    pub initial_state: char,
    /// Step limit for batch runs.
    pub max_steps: u64,
}

impl MachineConfig {
    /// The head position the machine starts from.
    pub fn start_head(&self) -> i64 {
        self.start_bit
            .unwrap_or_else(|| middle_bit(self.strip_len))
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            strip_len: DEFAULT_STRIP_LEN,
            start_bit: None,
            initial_state: FIRST_LABEL,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

/// The first bit of the middle byte, leaving the most room in both directions.
///
/// Saturates at `i64::MAX` for lengths whose bits a signed head cannot address.
pub fn middle_bit(strip_len: usize) -> i64 {
    i64::try_from(strip_len / 2)
        .ok()
        .and_then(|byte| byte.checked_mul(8))
        .unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MachineConfig::default();
        assert_eq!(config.strip_len, 4096);
        assert_eq!(config.start_head(), 2048 * 8);
        assert_eq!(config.initial_state, 'A');
        assert_eq!(config.max_steps, 100_000_000);
    }

    #[test]
    fn test_explicit_start_bit() {
        let config = MachineConfig {
            strip_len: 2,
            start_bit: Some(3),
            ..MachineConfig::default()
        };
        assert_eq!(config.start_head(), 3);
    }

    #[test]
    fn test_middle_bit_saturates() {
        assert_eq!(middle_bit(3), 8);
        assert_eq!(middle_bit(usize::MAX), i64::MAX);
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: MachineConfig = serde_json::from_str(r#"{ "strip_len": 16 }"#).unwrap();
        assert_eq!(config.strip_len, 16);
        assert_eq!(config.start_head(), 64);
        assert_eq!(config.max_steps, DEFAULT_MAX_STEPS);
    }
}
