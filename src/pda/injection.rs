//! Injection-attempt scan over chat input.

use tracing::debug;

use super::formatting::validate_formatting;
use super::stack::{is_closer, is_opener};
use crate::config::{EngineConfig, DEFAULT_MAX_NESTING_DEPTH};

const SCRIPT_MARKERS: [&str; 4] = ["<script", "javascript:", "onload=", "onclick="];
const SQL_MARKERS: [&str; 3] = ["' OR '1'='1", "DROP TABLE", "UNION SELECT"];
const ENCODED_ANGLE_BRACKETS: [&str; 4] = ["%3C", "%3E", "&lt;", "&gt;"];

pub const SCRIPT_ALERT: &str = "ALERT: Potential script injection detected";
pub const SQL_ALERT: &str = "ALERT: Potential SQL injection pattern";
pub const ODD_ASTERISKS: &str = "Warning: Odd number of asterisks - possible broken formatting";
pub const MIXED_ENCODING: &str = "Warning: Mixed encoding detected";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InjectionReport {
    pub detected: bool,
    pub warnings: Vec<String>,
}

impl InjectionReport {
    fn warn(&mut self, warning: impl Into<String>) {
        let warning = warning.into();
        debug!(%warning, "injection scan");
        self.warnings.push(warning);
    }

    fn finish(mut self) -> Self {
        self.detected = !self.warnings.is_empty();
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InjectionScanner {
    max_nesting_depth: usize,
}

impl Default for InjectionScanner {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_NESTING_DEPTH)
    }
}

impl InjectionScanner {
    pub fn new(max_nesting_depth: usize) -> Self {
        Self { max_nesting_depth }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.max_nesting_depth)
    }

    pub fn max_nesting_depth(&self) -> usize {
        self.max_nesting_depth
    }

    /// Structural check first, then script and SQL markers (either one ends
    /// the scan), then the softer warnings.
    pub fn scan(&self, input: &str) -> InjectionReport {
        let mut report = InjectionReport::default();

        let formatting = validate_formatting(input);
        if !formatting.valid {
            report.warn(format!("Invalid formatting structure: {}", formatting.message));
        }

        if SCRIPT_MARKERS.iter().any(|m| input.contains(m)) {
            report.warn(SCRIPT_ALERT);
            return report.finish();
        }

        if SQL_MARKERS.iter().any(|m| input.contains(m)) {
            report.warn(SQL_ALERT);
            return report.finish();
        }

        let asterisks = input.bytes().filter(|&b| b == b'*').count();
        if asterisks % 2 == 1 {
            report.warn(ODD_ASTERISKS);
        }

        let depth = max_bracket_depth(input);
        if depth > self.max_nesting_depth {
            report.warn(format!("Warning: Excessive nesting depth ({} levels)", depth));
        }

        if ENCODED_ANGLE_BRACKETS.iter().any(|m| input.contains(m)) {
            report.warn(MIXED_ENCODING);
        }

        report.finish()
    }
}

/// Deepest bracket nesting, counting every opener up and every closer down
/// regardless of type.
fn max_bracket_depth(input: &str) -> usize {
    let mut level: isize = 0;
    let mut max = 0;
    for b in input.bytes() {
        if is_opener(b) {
            level += 1;
            max = max.max(level);
        } else if is_closer(b) {
            level -= 1;
        }
    }
    max as usize
}

pub fn detect_injection(input: &str) -> InjectionReport {
    InjectionScanner::default().scan(input)
}
