//! Configuration access port trait.

use crate::domain::error::FormulaError;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    /// Non-blank value, or `ConfigMissing`.
    fn require_string(&self, section: &str, key: &str) -> Result<String, FormulaError> {
        match self.get_string(section, key) {
            Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
            _ => Err(FormulaError::ConfigMissing {
                section: section.to_string(),
                key: key.to_string(),
            }),
        }
    }
}
