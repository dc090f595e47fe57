//! Database configuration.

/// Default length of generated key identifiers.
pub const DEFAULT_ID_LENGTH: usize = 8;

/// Configuration for opening a database.
#[derive(Debug, Clone)]
pub struct Config {
    /// Whether `Database::open_with_config` starts an empty database when the
    /// folder has no manifest, instead of failing with `NotADatabase`.
    pub create_if_missing: bool,

    /// Length of generated key identifiers.
    pub id_length: usize,

    /// Whether to fsync every file written by a save (safer but slower).
    pub sync_on_save: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            id_length: DEFAULT_ID_LENGTH,
            sync_on_save: false,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to start empty when the manifest is missing.
    #[must_use]
    pub const fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Sets the identifier length. Lengths below 1 are raised to 1.
    #[must_use]
    pub const fn id_length(mut self, length: usize) -> Self {
        self.id_length = if length == 0 { 1 } else { length };
        self
    }

    /// Sets whether to fsync written files.
    #[must_use]
    pub const fn sync_on_save(mut self, value: bool) -> Self {
        self.sync_on_save = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert!(config.create_if_missing);
        assert_eq!(config.id_length, 8);
        assert!(!config.sync_on_save);
    }

    #[test]
    fn builder_pattern() {
        let config = Config::new()
            .create_if_missing(false)
            .sync_on_save(true)
            .id_length(12);

        assert!(!config.create_if_missing);
        assert!(config.sync_on_save);
        assert_eq!(config.id_length, 12);
    }

    #[test]
    fn zero_id_length_is_raised() {
        assert_eq!(Config::new().id_length(0).id_length, 1);
    }
}
