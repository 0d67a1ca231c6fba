// 💰 Price Estimator - Multipliers as Data
// Base price composed with brand, storage, condition and age factors

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::catalog::{AGE_OPTIONS, BRANDS, CONDITION_OPTIONS, STORAGE_OPTIONS};

/// Base price every estimate starts from
pub const BASE_PRICE: f64 = 500.0;

/// Factor applied when a key is not in its table
pub const NEUTRAL_MULTIPLIER: f64 = 1.0;

// ============================================================================
// DEVICE ATTRIBUTES
// ============================================================================

/// One form submission. Values are kept as entered so that unknown keys
/// can flow through to the neutral multiplier instead of being rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceAttributes {
    pub brand: String,
    pub model: String,
    pub storage: String,
    pub condition: String,
    pub age: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Brand,
    Model,
    Storage,
    Condition,
    Age,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Brand,
        Field::Model,
        Field::Storage,
        Field::Condition,
        Field::Age,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Field::Brand => "Brand",
            Field::Model => "Model",
            Field::Storage => "Storage",
            Field::Condition => "Condition",
            Field::Age => "Age",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl DeviceAttributes {
    pub fn new(
        brand: impl Into<String>,
        model: impl Into<String>,
        storage: impl Into<String>,
        condition: impl Into<String>,
        age: impl Into<String>,
    ) -> Self {
        DeviceAttributes {
            brand: brand.into(),
            model: model.into(),
            storage: storage.into(),
            condition: condition.into(),
            age: age.into(),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Brand => &self.brand,
            Field::Model => &self.model,
            Field::Storage => &self.storage,
            Field::Condition => &self.condition,
            Field::Age => &self.age,
        }
    }

    pub fn get_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Brand => &mut self.brand,
            Field::Model => &mut self.model,
            Field::Storage => &mut self.storage,
            Field::Condition => &mut self.condition,
            Field::Age => &mut self.age,
        }
    }

    /// Fields that are still empty, in form order
    pub fn missing_fields(&self) -> Vec<Field> {
        Field::ALL
            .iter()
            .copied()
            .filter(|field| self.get(*field).is_empty())
            .collect()
    }
}

// ============================================================================
// PRICE ESTIMATE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PriceEstimate(u64);

impl PriceEstimate {
    pub fn new(value: u64) -> Self {
        PriceEstimate(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// Currency prefix plus thousands separators, e.g. `$1,125`
    pub fn formatted(&self) -> String {
        format!("${}", group_thousands(self.0))
    }
}

impl fmt::Display for PriceEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted())
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum EstimateError {
    #[error("Please fill in all fields (missing: {})", join_fields(.0))]
    MissingFields(Vec<Field>),
}

fn join_fields(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|f| f.label())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Error)]
pub enum PricingTableError {
    #[error("failed to read pricing table {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse pricing table {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("multiplier for {table} '{key}' must be a finite non-negative number, got {value}")]
    InvalidMultiplier {
        table: &'static str,
        key: String,
        value: f64,
    },
}

// ============================================================================
// PRICING TABLE
// ============================================================================

/// Immutable multiplier tables, built once at startup.
///
/// Lookups that miss return [`NEUTRAL_MULTIPLIER`]. That is the pricing
/// policy for unrecognized brands, storage sizes, conditions and ages, not
/// an error path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PricingTable {
    #[serde(default = "default_base_price")]
    pub base_price: f64,
    pub brand: HashMap<String, f64>,
    pub storage: HashMap<String, f64>,
    pub condition: HashMap<String, f64>,
    pub age: HashMap<String, f64>,
}

fn default_base_price() -> f64 {
    BASE_PRICE
}

impl Default for PricingTable {
    fn default() -> Self {
        PricingTable {
            base_price: BASE_PRICE,
            brand: BRANDS
                .iter()
                .map(|b| (b.name.to_string(), b.multiplier))
                .collect(),
            storage: STORAGE_OPTIONS
                .iter()
                .map(|s| (s.name.to_string(), s.multiplier))
                .collect(),
            condition: CONDITION_OPTIONS
                .iter()
                .map(|c| (c.value.to_string(), c.multiplier))
                .collect(),
            age: AGE_OPTIONS
                .iter()
                .map(|a| (a.value.to_string(), a.multiplier))
                .collect(),
        }
    }
}

impl PricingTable {
    /// Load tables from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, PricingTableError> {
        let display = path.as_ref().display().to_string();
        let content = fs::read_to_string(path.as_ref()).map_err(|source| PricingTableError::Read {
            path: display.clone(),
            source,
        })?;

        let table: PricingTable =
            serde_json::from_str(&content).map_err(|source| PricingTableError::Parse {
                path: display,
                source,
            })?;

        table.validate()?;
        Ok(table)
    }

    fn validate(&self) -> Result<(), PricingTableError> {
        let tables: [(&'static str, &HashMap<String, f64>); 4] = [
            ("brand", &self.brand),
            ("storage", &self.storage),
            ("condition", &self.condition),
            ("age", &self.age),
        ];

        for (name, table) in tables {
            for (key, value) in table {
                if !value.is_finite() || *value < 0.0 {
                    return Err(PricingTableError::InvalidMultiplier {
                        table: name,
                        key: key.clone(),
                        value: *value,
                    });
                }
            }
        }

        if !self.base_price.is_finite() || self.base_price < 0.0 {
            return Err(PricingTableError::InvalidMultiplier {
                table: "base_price",
                key: String::new(),
                value: self.base_price,
            });
        }

        Ok(())
    }

    pub fn brand_multiplier(&self, brand: &str) -> f64 {
        lookup("brand", &self.brand, brand)
    }

    pub fn storage_multiplier(&self, storage: &str) -> f64 {
        lookup("storage", &self.storage, storage)
    }

    pub fn condition_multiplier(&self, condition: &str) -> f64 {
        lookup("condition", &self.condition, condition)
    }

    pub fn age_multiplier(&self, age: &str) -> f64 {
        lookup("age", &self.age, age)
    }

    /// Estimate a price for a complete attribute record.
    ///
    /// Refuses when any field is empty; otherwise always succeeds.
    pub fn estimate(&self, attrs: &DeviceAttributes) -> Result<PriceEstimate, EstimateError> {
        let missing = attrs.missing_fields();
        if !missing.is_empty() {
            return Err(EstimateError::MissingFields(missing));
        }

        let mut price = self.base_price;
        price *= self.brand_multiplier(&attrs.brand);
        price *= self.storage_multiplier(&attrs.storage);

        let condition = self.condition_multiplier(&attrs.condition);
        let age = self.age_multiplier(&attrs.age);

        let rounded = (price * condition * age).round();
        let estimate = PriceEstimate(if rounded > 0.0 { rounded as u64 } else { 0 });

        tracing::info!(
            brand = %attrs.brand,
            model = %attrs.model,
            storage = %attrs.storage,
            condition = %attrs.condition,
            age = %attrs.age,
            price = estimate.value(),
            "estimated device price"
        );

        Ok(estimate)
    }
}

fn lookup(table: &str, map: &HashMap<String, f64>, key: &str) -> f64 {
    match map.get(key) {
        Some(value) => *value,
        None => {
            tracing::debug!(table, key, "no multiplier for key, using neutral factor");
            NEUTRAL_MULTIPLIER
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn complete() -> DeviceAttributes {
        DeviceAttributes::new("Apple", "iPhone 15", "256GB", "excellent", "new")
    }

    #[test]
    fn test_apple_256_excellent_new() {
        let table = PricingTable::default();
        let price = table.estimate(&complete()).unwrap();
        assert_eq!(price.value(), 1125);
    }

    #[test]
    fn test_lg_64_poor_three_years() {
        let table = PricingTable::default();
        let attrs = DeviceAttributes::new("LG", "G8", "64GB", "poor", "3years");
        assert_eq!(table.estimate(&attrs).unwrap().value(), 56);
    }

    #[test]
    fn test_formula_holds_for_whole_catalog() {
        let table = PricingTable::default();

        for brand in BRANDS.iter() {
            for storage in STORAGE_OPTIONS.iter() {
                for condition in CONDITION_OPTIONS.iter() {
                    for age in AGE_OPTIONS.iter() {
                        let attrs = DeviceAttributes::new(
                            brand.name,
                            "any",
                            storage.name,
                            condition.value,
                            age.value,
                        );
                        let expected = (500.0
                            * brand.multiplier
                            * storage.multiplier
                            * condition.multiplier
                            * age.multiplier)
                            .round() as u64;
                        assert_eq!(table.estimate(&attrs).unwrap().value(), expected);
                    }
                }
            }
        }
    }

    #[test]
    fn test_each_missing_field_is_refused() {
        let table = PricingTable::default();

        for field in Field::ALL {
            let mut attrs = complete();
            attrs.get_mut(field).clear();

            match table.estimate(&attrs) {
                Err(EstimateError::MissingFields(missing)) => assert_eq!(missing, vec![field]),
                Ok(price) => panic!("expected refusal for empty {}, got {}", field, price),
            }
        }
    }

    #[test]
    fn test_all_missing_fields_reported_in_order() {
        let table = PricingTable::default();
        let err = table.estimate(&DeviceAttributes::default()).unwrap_err();
        let EstimateError::MissingFields(missing) = err;
        assert_eq!(missing, Field::ALL.to_vec());
    }

    #[test]
    fn test_unknown_brand_and_storage_are_neutral() {
        let table = PricingTable::default();
        assert_eq!(table.brand_multiplier("Nokia"), NEUTRAL_MULTIPLIER);
        assert_eq!(table.storage_multiplier("2TB"), NEUTRAL_MULTIPLIER);

        let attrs = DeviceAttributes::new("Nokia", "3310", "2TB", "excellent", "new");
        assert_eq!(table.estimate(&attrs).unwrap().value(), 500);
    }

    #[test]
    fn test_unknown_condition_and_age_are_neutral() {
        let table = PricingTable::default();
        let attrs = DeviceAttributes::new("Apple", "X", "64GB", "mint", "ancient");
        assert_eq!(table.estimate(&attrs).unwrap().value(), 750);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let table = PricingTable::default();
        assert_eq!(table.brand_multiplier("apple"), NEUTRAL_MULTIPLIER);
        assert_eq!(table.brand_multiplier("Apple"), 1.5);
    }

    #[test]
    fn test_formatted_price() {
        assert_eq!(PriceEstimate::new(0).formatted(), "$0");
        assert_eq!(PriceEstimate::new(56).formatted(), "$56");
        assert_eq!(PriceEstimate::new(999).formatted(), "$999");
        assert_eq!(PriceEstimate::new(1125).formatted(), "$1,125");
        assert_eq!(PriceEstimate::new(1234567).formatted(), "$1,234,567");
    }

    #[test]
    fn test_from_file_defaults_base_price() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"brand": {{"Apple": 2.0}}, "storage": {{}}, "condition": {{}}, "age": {{}}}}"#
        )
        .unwrap();

        let table = PricingTable::from_file(file.path()).unwrap();
        assert_eq!(table.base_price, BASE_PRICE);

        let attrs = DeviceAttributes::new("Apple", "X", "64GB", "excellent", "new");
        assert_eq!(table.estimate(&attrs).unwrap().value(), 1000);
    }

    #[test]
    fn test_from_file_rejects_negative_multiplier() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"brand": {{"Apple": -1.0}}, "storage": {{}}, "condition": {{}}, "age": {{}}}}"#
        )
        .unwrap();

        let err = PricingTable::from_file(file.path()).unwrap_err();
        assert!(matches!(err, PricingTableError::InvalidMultiplier { table: "brand", .. }));
    }

    #[test]
    fn test_from_file_missing_path() {
        let err = PricingTable::from_file("/nonexistent/pricing.json").unwrap_err();
        assert!(matches!(err, PricingTableError::Read { .. }));
    }
}
