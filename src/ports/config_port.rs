//! Configuration access port trait.

use crate::domain::error::ExplorerError;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;

    fn get_string_or(&self, section: &str, key: &str, default: &str) -> String {
        self.get_string(section, key)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| default.to_string())
    }

    /// A non-empty value, or `ConfigMissing`.
    fn require_string(&self, section: &str, key: &str) -> Result<String, ExplorerError> {
        self.get_string(section, key)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ExplorerError::ConfigMissing {
                section: section.into(),
                key: key.into(),
            })
    }

    /// A positive integer, or `ConfigInvalid` when the value is zero or negative.
    fn get_positive(&self, section: &str, key: &str, default: u64) -> Result<u64, ExplorerError> {
        let value = self.get_int(section, key, default as i64);
        u64::try_from(value)
            .ok()
            .filter(|v| *v > 0)
            .ok_or_else(|| ExplorerError::ConfigInvalid {
                section: section.into(),
                key: key.into(),
                reason: format!("expected a positive integer, got {value}"),
            })
    }
}
