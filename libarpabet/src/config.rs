/// ARPABET-specific configuration that extends the base `Config` from core.
///
/// This configuration includes:
/// - All generic options from `librhyme_core::Config` (flattened via serde)
/// - Whether letter-to-sound rules back up the dictionary
/// - Where the runtime artifacts live
///
/// # Example
///
/// ```rust
/// use libarpabet::ArpabetConfig;
///
/// let config = ArpabetConfig::default();
/// assert!(config.letter_to_sound);
/// let base_config = config.into_base();
/// assert_eq!(base_config.max_cache_size, 1000);
/// ```
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ArpabetConfig {
    /// Base configuration fields (stress, window, costs, thresholds)
    #[serde(flatten)]
    pub base: librhyme_core::Config,

    /// Fall back to letter-to-sound rules for words missing from the dictionary
    pub letter_to_sound: bool,

    /// Directory holding lexicon.fst / lexicon.bincode / index.bincode / unseen.redb
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl Default for ArpabetConfig {
    fn default() -> Self {
        Self {
            base: librhyme_core::Config::default(),
            letter_to_sound: true,
            data_dir: None,
        }
    }
}

impl ArpabetConfig {
    /// Convert this config into the base config
    pub fn into_base(self) -> librhyme_core::Config {
        self.base
    }

    /// Get a reference to the base config
    pub fn base(&self) -> &librhyme_core::Config {
        &self.base
    }

    /// Get a mutable reference to the base config
    pub fn base_mut(&mut self) -> &mut librhyme_core::Config {
        &mut self.base
    }

    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> librhyme_core::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use librhyme_core::SyllableWindow;

    #[test]
    fn flattened_fields_share_one_table() {
        let cfg = ArpabetConfig::from_toml_str(
            "syllable_window = 2\nletter_to_sound = false\ndata_dir = \"data\"\n",
        )
        .unwrap();
        assert_eq!(cfg.base().syllable_window, SyllableWindow::Double);
        assert!(!cfg.letter_to_sound);
        assert_eq!(cfg.data_dir, Some(PathBuf::from("data")));
        assert_eq!(cfg.base().min_nearest_score, 0.5);
    }

    #[test]
    fn round_trips_through_toml() {
        let mut cfg = ArpabetConfig::default();
        cfg.base_mut().strip_affixes = true;
        let s = cfg.to_toml_string().unwrap();
        assert_eq!(ArpabetConfig::from_toml_str(&s).unwrap(), cfg);
    }
}
