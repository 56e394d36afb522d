//! Import parameters
//!
//! Raw parameters arrive as a camelCase map. They are resolved once per
//! import into [`ImportParams`], compiling the file-name filters.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ImportError;

/// Exclusion injected into every import: names starting with `_.`
pub const HIDDEN_SIDECAR_PATTERN: &str = r"^_\..*";

/// Declared data type of an import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Paired SEM image + header files
    Sem,
    /// Date-bucketed PDV measurement files
    Pdv,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Sem => "sem",
            DataType::Pdv => "pdv",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sem" => Ok(DataType::Sem),
            "pdv" => Ok(DataType::Pdv),
            other => Err(ImportError::UnknownDataType(other.to_string())),
        }
    }
}

/// Caller-supplied parameters before resolution
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawImportParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_include_regex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_exclude_regex: Option<String>,
    /// Strategy-opaque passthrough options
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Resolved, immutable parameters of one import invocation
#[derive(Debug, Clone)]
pub struct ImportParams {
    include: Option<Regex>,
    exclude: Regex,
    extra: BTreeMap<String, serde_json::Value>,
}

impl ImportParams {
    /// Compile the caller's filters, merging in the configured default
    /// exclusion and the hidden-sidecar pattern.
    ///
    /// Patterns are anchored at the start of the file name only.
    pub fn resolve(raw: RawImportParams, default_exclude: Option<&str>) -> Result<Self, ImportError> {
        let include = raw
            .file_include_regex
            .as_deref()
            .map(|p| Regex::new(&anchored(p)))
            .transpose()?;

        let alternatives: Vec<String> = raw
            .file_exclude_regex
            .as_deref()
            .into_iter()
            .chain(default_exclude)
            .chain(std::iter::once(HIDDEN_SIDECAR_PATTERN))
            .map(|p| format!("(?:{})", p))
            .collect();
        let exclude = Regex::new(&anchored(&alternatives.join("|")))?;

        Ok(Self {
            include,
            exclude,
            extra: raw.extra,
        })
    }

    /// Whether a file with this name passes the include/exclude filters
    pub fn accepts_name(&self, name: &str) -> bool {
        if let Some(include) = &self.include {
            if !include.is_match(name) {
                return false;
            }
        }
        !self.exclude.is_match(name)
    }

    /// Passthrough option by key
    pub fn extra(&self, key: &str) -> Option<&serde_json::Value> {
        self.extra.get(key)
    }

    /// Effective exclusion pattern
    pub fn exclude_pattern(&self) -> &str {
        self.exclude.as_str()
    }
}

fn anchored(pattern: &str) -> String {
    format!("^(?:{})", pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(include: Option<&str>, exclude: Option<&str>) -> ImportParams {
        ImportParams::resolve(
            RawImportParams {
                file_include_regex: include.map(str::to_string),
                file_exclude_regex: exclude.map(str::to_string),
                extra: BTreeMap::new(),
            },
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_data_type_parsing() {
        assert_eq!("sem".parse::<DataType>().unwrap(), DataType::Sem);
        assert_eq!("pdv".parse::<DataType>().unwrap(), DataType::Pdv);
        assert!(matches!(
            "xrd".parse::<DataType>(),
            Err(ImportError::UnknownDataType(t)) if t == "xrd"
        ));
    }

    #[test]
    fn test_hidden_sidecar_always_excluded() {
        let params = resolve(None, None);
        assert!(!params.accepts_name("_.sample.tif"));
        assert!(params.accepts_name("_meta.json"));
        assert!(params.accepts_name("sample.tif"));
    }

    #[test]
    fn test_caller_exclusion_is_merged_not_replaced() {
        let params = resolve(None, Some(r"_meta"));
        assert!(!params.accepts_name("_meta.json"));
        assert!(!params.accepts_name("_.hidden"));
        assert!(params.accepts_name("scan_meta.json"), "match is anchored at start");
    }

    #[test]
    fn test_include_filter() {
        let params = resolve(Some(r".*\.tif$"), None);
        assert!(params.accepts_name("a.tif"));
        assert!(!params.accepts_name("a-tif.hdr"));
    }

    #[test]
    fn test_default_exclude_from_config() {
        let params =
            ImportParams::resolve(RawImportParams::default(), Some(r".*\.tmp$")).unwrap();
        assert!(!params.accepts_name("scan.tmp"));
        assert!(params.accepts_name("scan.dat"));
    }

    #[test]
    fn test_invalid_pattern_is_validation_error() {
        let err = ImportParams::resolve(
            RawImportParams {
                file_exclude_regex: Some("(".to_string()),
                ..Default::default()
            },
            None,
        )
        .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_passthrough_options_kept() {
        let raw: RawImportParams = serde_json::from_value(serde_json::json!({
            "fileExcludeRegex": "x",
            "leafFoldersAsItems": true
        }))
        .unwrap();
        let params = ImportParams::resolve(raw, None).unwrap();
        assert_eq!(params.extra("leafFoldersAsItems"), Some(&serde_json::json!(true)));
        assert!(params.extra("fileExcludeRegex").is_none());
    }
}
