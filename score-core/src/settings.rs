use std::{fs, path::Path};

use derivative::Derivative;
use serde::{Deserialize, Serialize};

use crate::{error::ScoreResult, primitives::TimeSignature};

/// Defaults, used while import source gives no own values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Derivative)]
#[derivative(Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ImportSettings {
    #[derivative(Default(value = "TimeSignature::new(4, 4)"))]
    pub time_signature: TimeSignature,
    #[derivative(Default(value = "\"c\".to_string()"))]
    pub key_signature: String,
    /// measures laid out on one system (line)
    #[derivative(Default(value = "4"))]
    pub measures_per_line: usize,
    /// attach grace notes to the following note, or drop them
    #[derivative(Default(value = "true"))]
    pub keep_grace_notes: bool,
}
impl ImportSettings {
    pub fn from_json(json: &str) -> ScoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
    pub fn load(path: impl AsRef<Path>) -> ScoreResult<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }
    /// Line index for the measure, never dividing by zero.
    pub fn line_of(&self, measure: usize) -> usize {
        measure / self.measures_per_line.max(1)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use crate::primitives::TimeSignature;

    use super::ImportSettings;

    #[test]
    fn test_defaults() {
        let settings = ImportSettings::default();
        assert_eq!(settings.time_signature, TimeSignature::new(4, 4));
        assert_eq!(settings.key_signature, "c");
        assert_eq!(settings.line_of(9), 2);
        assert!(settings.keep_grace_notes);
        assert_eq!(ImportSettings::from_json("{}").unwrap(), settings);
    }

    #[test]
    fn test_load() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"timeSignature": {{"numerator": 6, "denominator": 8}}, "measuresPerLine": 0}}"#
        )
        .unwrap();
        let settings = ImportSettings::load(file.path()).unwrap();
        assert_eq!(settings.time_signature, TimeSignature::new(6, 8));
        assert_eq!(settings.key_signature, "c");
        assert_eq!(settings.line_of(5), 5);
        assert!(ImportSettings::from_json("[1, 2]").is_err());
    }
}
