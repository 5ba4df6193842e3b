use std::collections::BTreeMap;

use crate::scoring::ScorerRegistry;

pub const DEFAULT_THRESHOLD: f64 = 0.75;
pub const DEFAULT_AMBIGUITY_GAP: f64 = 0.05;
pub const DEFAULT_MAX_CANDIDATES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Exact canonical tuples only.
    Exact,
    /// Exact first, then scored fuzzy fallback.
    #[default]
    Smart,
}

impl MatchMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "exact" => Some(Self::Exact),
            "smart" | "fuzzy" => Some(Self::Smart),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MatchPolicy {
    pub mode: MatchMode,
    /// Top two fuzzy scores closer than this are reported as ambiguous.
    pub ambiguity_gap: f64,
    pub max_candidates: usize,
    /// Threshold for actions with no registered entry.
    pub default_threshold: f64,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            mode: MatchMode::Smart,
            ambiguity_gap: DEFAULT_AMBIGUITY_GAP,
            max_candidates: DEFAULT_MAX_CANDIDATES,
            default_threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl MatchPolicy {
    pub fn from_env() -> Self {
        let mode = std::env::var("CASEDESK_MATCH_MODE")
            .ok()
            .and_then(|v| MatchMode::parse(&v))
            .unwrap_or_default();
        Self {
            mode,
            ambiguity_gap: env_f64("CASEDESK_AMBIGUITY_GAP", DEFAULT_AMBIGUITY_GAP, 0.0, 1.0),
            max_candidates: env_usize("CASEDESK_MAX_CANDIDATES", DEFAULT_MAX_CANDIDATES, 1, 50),
            default_threshold: env_f64("CASEDESK_DEFAULT_THRESHOLD", DEFAULT_THRESHOLD, 0.0, 1.0),
        }
    }
}

/// Argument name -> alias category used to canonicalize that argument.
#[derive(Debug, Clone)]
pub struct FieldCategories(BTreeMap<String, String>);

impl Default for FieldCategories {
    fn default() -> Self {
        let mut map = BTreeMap::new();
        for field in ["witness_name", "suspect_name", "party_name"] {
            map.insert(field.to_string(), "people".to_string());
        }
        for field in ["location", "facility_or_room", "area"] {
            map.insert(field.to_string(), "locations".to_string());
        }
        Self(map)
    }
}

impl FieldCategories {
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    pub fn with(mut self, field: impl Into<String>, category: impl Into<String>) -> Self {
        self.0.insert(field.into(), category.into());
        self
    }

    pub fn category(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeskConfig {
    pub policy: MatchPolicy,
    pub field_categories: FieldCategories,
    pub scorers: ScorerRegistry,
}

fn env_usize(name: &str, default: usize, min: usize, max: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(default)
        .clamp(min, max)
}

fn env_f64(name: &str, default: f64, min: f64, max: f64) -> f64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(default)
        .clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_mode_parses_known_names() {
        assert_eq!(MatchMode::parse("EXACT"), Some(MatchMode::Exact));
        assert_eq!(MatchMode::parse(" smart "), Some(MatchMode::Smart));
        assert_eq!(MatchMode::parse("loose"), None);
    }

    #[test]
    fn default_field_categories_cover_people_and_places() {
        let fields = FieldCategories::default();
        assert_eq!(fields.category("suspect_name"), Some("people"));
        assert_eq!(fields.category("facility_or_room"), Some("locations"));
        assert_eq!(fields.category("vehicle_number"), None);

        let custom = FieldCategories::empty().with("sample_id", "samples");
        assert_eq!(custom.category("sample_id"), Some("samples"));
        assert_eq!(custom.category("suspect_name"), None);
    }

    #[test]
    fn unset_env_yields_stock_policy() {
        let policy = MatchPolicy::from_env();
        if std::env::var_os("CASEDESK_AMBIGUITY_GAP").is_none() {
            assert!((policy.ambiguity_gap - DEFAULT_AMBIGUITY_GAP).abs() < f64::EPSILON);
        }
        assert!(policy.max_candidates >= 1);
        assert!((0.0..=1.0).contains(&policy.default_threshold));
    }
}
