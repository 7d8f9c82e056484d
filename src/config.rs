//! Engine configuration, loadable from TOML.
//!
//! Every field has a default, so an empty document is a valid configuration:
//!
//! ```toml
//! default_alphabet = "ab"
//! max_edits = 1
//! max_nesting_depth = 4
//! lexicon = ["idiot", "dumb"]
//! scan_window = 12
//! ```

use serde::{Deserialize, Serialize};

use crate::automaton::dfa::{SubsetConfig, DEFAULT_ALPHABET};
use crate::AutomataError;

/// Words the approximate matcher looks for when no lexicon is configured.
pub const DEFAULT_LEXICON: &[&str] = &["stupid", "idiot", "ugly", "dumb", "hate", "fuck", "n00b"];

pub const DEFAULT_MAX_EDITS: usize = 2;

pub const DEFAULT_MAX_NESTING_DEPTH: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Subset-construction alphabet for NFAs without byte-labeled edges.
    pub default_alphabet: String,
    /// Largest edit distance the approximate matcher accepts.
    pub max_edits: usize,
    /// Bracket depth above which the injection scanner warns.
    pub max_nesting_depth: usize,
    pub lexicon: Vec<String>,
    /// Longest substring, in bytes, tried by substring scanning. Unlimited when
    /// absent.
    pub scan_window: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_alphabet: DEFAULT_ALPHABET.to_string(),
            max_edits: DEFAULT_MAX_EDITS,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            lexicon: DEFAULT_LEXICON.iter().map(|w| w.to_string()).collect(),
            scan_window: None,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, AutomataError> {
        let config: EngineConfig =
            toml::from_str(source).map_err(|e| AutomataError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, AutomataError> {
        toml::to_string(self).map_err(|e| AutomataError::InvalidConfig(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), AutomataError> {
        if !self.default_alphabet.is_ascii() {
            return Err(AutomataError::InvalidConfig(
                "default_alphabet must be ASCII".to_string(),
            ));
        }
        if self.scan_window == Some(0) {
            return Err(AutomataError::InvalidConfig(
                "scan_window must be at least 1".to_string(),
            ));
        }
        if self.lexicon.iter().any(|w| w.is_empty()) {
            return Err(AutomataError::InvalidConfig(
                "lexicon entries must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl From<&EngineConfig> for SubsetConfig {
    fn from(config: &EngineConfig) -> Self {
        SubsetConfig::with_alphabet(&config.default_alphabet)
    }
}
