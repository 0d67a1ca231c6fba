// 📱 Option Catalog - closed choice sets offered by the estimator form

/// A brand or storage choice with its price factor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NamedOption {
    pub name: &'static str,
    pub multiplier: f64,
}

/// A condition or age choice: stored value, display label, price factor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabeledOption {
    pub value: &'static str,
    pub label: &'static str,
    pub multiplier: f64,
}

pub const BRANDS: [NamedOption; 8] = [
    NamedOption { name: "Apple", multiplier: 1.5 },
    NamedOption { name: "Samsung", multiplier: 1.2 },
    NamedOption { name: "Google", multiplier: 1.1 },
    NamedOption { name: "OnePlus", multiplier: 1.0 },
    NamedOption { name: "Xiaomi", multiplier: 0.8 },
    NamedOption { name: "Huawei", multiplier: 0.9 },
    NamedOption { name: "Sony", multiplier: 1.0 },
    NamedOption { name: "LG", multiplier: 0.7 },
];

pub const STORAGE_OPTIONS: [NamedOption; 5] = [
    NamedOption { name: "64GB", multiplier: 1.0 },
    NamedOption { name: "128GB", multiplier: 1.2 },
    NamedOption { name: "256GB", multiplier: 1.5 },
    NamedOption { name: "512GB", multiplier: 1.8 },
    NamedOption { name: "1TB", multiplier: 2.2 },
];

pub const CONDITION_OPTIONS: [LabeledOption; 4] = [
    LabeledOption { value: "excellent", label: "Excellent", multiplier: 1.0 },
    LabeledOption { value: "good", label: "Good", multiplier: 0.8 },
    LabeledOption { value: "fair", label: "Fair", multiplier: 0.6 },
    LabeledOption { value: "poor", label: "Poor", multiplier: 0.4 },
];

pub const AGE_OPTIONS: [LabeledOption; 5] = [
    LabeledOption { value: "new", label: "Brand New", multiplier: 1.0 },
    LabeledOption { value: "6months", label: "0-6 months", multiplier: 0.9 },
    LabeledOption { value: "1year", label: "6-12 months", multiplier: 0.75 },
    LabeledOption { value: "2years", label: "1-2 years", multiplier: 0.6 },
    LabeledOption { value: "3years", label: "2+ years", multiplier: 0.4 },
];

/// Display label for a condition or age value, falling back to the raw value
pub fn label_for(options: &[LabeledOption], value: &str) -> String {
    options
        .iter()
        .find(|o| o.value == value)
        .map(|o| o.label.to_string())
        .unwrap_or_else(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_sizes() {
        assert_eq!(BRANDS.len(), 8);
        assert_eq!(STORAGE_OPTIONS.len(), 5);
        assert_eq!(CONDITION_OPTIONS.len(), 4);
        assert_eq!(AGE_OPTIONS.len(), 5);
    }

    #[test]
    fn test_multipliers_within_bounds() {
        for option in CONDITION_OPTIONS.iter().chain(AGE_OPTIONS.iter()) {
            assert!((0.4..=1.0).contains(&option.multiplier), "{}", option.value);
        }
    }

    #[test]
    fn test_label_for() {
        assert_eq!(label_for(&AGE_OPTIONS, "3years"), "2+ years");
        assert_eq!(label_for(&CONDITION_OPTIONS, "good"), "Good");
        assert_eq!(label_for(&CONDITION_OPTIONS, "mint"), "mint");
    }
}
