//! Column rules for the cleaning stages
//!
//! The built-in lists match the dealership sales export. An operator can
//! swap any of them with a JSON file; omitted fields keep their defaults.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Personal and operational fields not needed downstream
pub const DROP_COLUMNS: &[&str] = &[
    "Address2",
    "VehicleMake",
    "PhoneLeadBestId",
    "DataLastRefreshedDate",
    "SaleDate",
    "ZipCodeSuffix",
    "DriverZipCodeSuffix",
    "ReportedDate",
    "Created",
    "Modified",
];

pub const TITLE_CASE_COLUMNS: &[&str] = &[
    "City",
    "FirstName",
    "LastName",
    "Address1",
    "SaleExteriorColor",
    "SaleInteriorColor",
    "BodyType",
    "OwnerCompanyName",
    "DriverFirstName",
    "DriverLastName",
    "DriverCompanyName",
    "DriverAddress",
    "DriverCity",
];

pub const LOWERCASE_COLUMNS: &[&str] = &["EmailAddress"];

pub const PHONE_COLUMNS: &[&str] = &[
    "PhoneNumber",
    "DriverHomePhone",
    "DriverBusinessPhone",
    "BusinessPhone",
];

/// Phone lines that carry a " 0000" extension placeholder
pub const PHONE_COLUMNS_STRIP_ZEROS: &[&str] = &["DriverBusinessPhone", "BusinessPhone"];

pub const DIRECTIONAL_COLUMNS: &[&str] = &["Address1", "DriverAddress"];

/// Cell values read as null. Matched exactly, no trimming.
pub const MISSING_VALUE_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CleanRules {
    pub drop_columns: Vec<String>,
    pub title_case_columns: Vec<String>,
    pub lowercase_columns: Vec<String>,
    pub phone_columns: Vec<String>,
    pub phone_columns_strip_zeros: Vec<String>,
    pub directional_columns: Vec<String>,
    pub missing_value_markers: Vec<String>,
}

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for CleanRules {
    fn default() -> Self {
        CleanRules {
            drop_columns: owned(DROP_COLUMNS),
            title_case_columns: owned(TITLE_CASE_COLUMNS),
            lowercase_columns: owned(LOWERCASE_COLUMNS),
            phone_columns: owned(PHONE_COLUMNS),
            phone_columns_strip_zeros: owned(PHONE_COLUMNS_STRIP_ZEROS),
            directional_columns: owned(DIRECTIONAL_COLUMNS),
            missing_value_markers: owned(MISSING_VALUE_MARKERS),
        }
    }
}

impl CleanRules {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read rules file {:?}", path))?;
        serde_json::from_str(&text).with_context(|| format!("Invalid rules file {:?}", path))
    }

    /// Empty strings always count as missing, whatever the marker list says
    pub fn is_missing(&self, value: &str) -> bool {
        value.is_empty() || self.missing_value_markers.iter().any(|m| m == value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_partial_rules_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rules.json");
        fs::write(&path, r#"{ "drop_columns": ["Created"] }"#).unwrap();

        let rules = CleanRules::from_json_file(&path).unwrap();

        assert_eq!(rules.drop_columns, vec!["Created".to_string()]);
        assert_eq!(rules.phone_columns, CleanRules::default().phone_columns);
    }

    #[test]
    fn test_invalid_rules_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rules.json");
        fs::write(&path, "not json").unwrap();

        assert!(CleanRules::from_json_file(&path).is_err());
    }

    #[test]
    fn test_is_missing() {
        let rules = CleanRules::default();

        assert!(rules.is_missing(""));
        assert!(rules.is_missing("NULL"));
        assert!(rules.is_missing("NaN"));
        assert!(!rules.is_missing("Null Road"));
        assert!(!rules.is_missing(" "));
    }
}
