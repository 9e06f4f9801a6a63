use vitrine_core::constants::{
    DEFAULT_ENCODE_QUALITY, DEFAULT_MAX_FILE_SIZE_MB, DEFAULT_TARGET_WIDTHS,
};
use vitrine_core::Config;

/// Per-gallery settings derived from [`Config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerSettings {
    /// Variant widths, ascending. The first one is used for previews.
    pub target_widths: Vec<u32>,
    pub encode_quality: u8,
    pub max_file_size_bytes: usize,
}

impl Default for ManagerSettings {
    fn default() -> Self {
        Self {
            target_widths: DEFAULT_TARGET_WIDTHS.to_vec(),
            encode_quality: DEFAULT_ENCODE_QUALITY,
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_MB * 1024 * 1024,
        }
    }
}

impl ManagerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            target_widths: config.target_widths.clone(),
            encode_quality: config.encode_quality,
            max_file_size_bytes: config.max_file_size_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_copies_limits() {
        let config = Config {
            target_widths: vec![320, 640],
            encode_quality: 70,
            max_file_size_bytes: 1024,
            ..Config::default()
        };
        let settings = ManagerSettings::from_config(&config);
        assert_eq!(settings.target_widths, vec![320, 640]);
        assert_eq!(settings.encode_quality, 70);
        assert_eq!(settings.max_file_size_bytes, 1024);
    }

    #[test]
    fn test_defaults_match_config_defaults() {
        assert_eq!(
            ManagerSettings::default(),
            ManagerSettings::from_config(&Config::default())
        );
    }
}
