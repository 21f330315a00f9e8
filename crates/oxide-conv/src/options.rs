//! Run options shared by every command.

use regex::Regex;

use oxide_conv_core::structure::TableStructure;

use crate::error::Result;

/// Scratch database used when no name is given.
pub const DEFAULT_SCRATCH_DATABASE: &str = "conv_tmp";

/// Options for loading schemas.
#[derive(Debug, Clone)]
pub struct ConvOptions {
    /// Database created and dropped by the SQL-directory bootstrap.
    pub scratch_database: String,
    /// Tables whose name matches any of these are left out.
    pub ignore: Vec<Regex>,
}

impl Default for ConvOptions {
    fn default() -> Self {
        Self {
            scratch_database: DEFAULT_SCRATCH_DATABASE.to_string(),
            ignore: Vec::new(),
        }
    }
}

impl ConvOptions {
    /// Creates default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the scratch database name.
    #[must_use]
    pub fn scratch_database(mut self, name: impl Into<String>) -> Self {
        self.scratch_database = name.into();
        self
    }

    /// Leaves out tables matching `pattern`.
    #[must_use]
    pub fn ignore(mut self, pattern: Regex) -> Self {
        self.ignore.push(pattern);
        self
    }

    /// Compiles and adds ignore patterns.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ConvError::Pattern`] on the first pattern
    /// that does not compile.
    pub fn ignore_patterns<I, S>(mut self, patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pattern in patterns {
            self.ignore.push(Regex::new(pattern.as_ref())?);
        }
        Ok(self)
    }

    /// Filter hook for database builds: false for ignored tables.
    #[must_use]
    pub fn accepts(&self, table: &TableStructure) -> bool {
        !self.ignore.iter().any(|pattern| pattern.is_match(&table.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ConvOptions::new();
        assert_eq!(options.scratch_database, "conv_tmp");
        assert!(options.accepts(&TableStructure::new("anything")));
    }

    #[test]
    fn test_ignore_patterns() {
        let options = ConvOptions::new()
            .scratch_database("scratch")
            .ignore_patterns(["^tmp_", "_backup$"])
            .unwrap();
        assert_eq!(options.scratch_database, "scratch");
        assert!(!options.accepts(&TableStructure::new("tmp_import")));
        assert!(!options.accepts(&TableStructure::new("users_backup")));
        assert!(options.accepts(&TableStructure::new("users")));
    }

    #[test]
    fn test_bad_pattern() {
        assert!(ConvOptions::new().ignore_patterns(["("]).is_err());
    }
}
