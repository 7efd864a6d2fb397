use crate::roles::Role;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementType {
    Income,
    Balance,
    CashFlow,
}

impl StatementType {
    pub const ALL: [StatementType; 3] = [
        StatementType::Income,
        StatementType::Balance,
        StatementType::CashFlow,
    ];

    /// Short prefix used in line identifiers (e.g. `IS__Revenues__Consolidated`).
    pub fn prefix(&self) -> &'static str {
        match self {
            StatementType::Income => "IS",
            StatementType::Balance => "BS",
            StatementType::CashFlow => "CF",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatementType::Income => "Income Statement",
            StatementType::Balance => "Balance Sheet",
            StatementType::CashFlow => "Cash Flow Statement",
        }
    }
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One reported numeric fact, exactly as supplied by the external fact source.
///
/// Multiple observations may share `(concept, period_end)` when a value is
/// segmented (e.g. split by business unit) or restated in a later filing.
/// Values arrive as reported text and may carry thousands separators; anything
/// that does not parse to a finite number is unusable but never fatal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawObservation {
    pub concept: String,
    pub period_end: NaiveDate,
    #[serde(default)]
    pub period_start: Option<NaiveDate>,
    #[serde(default)]
    pub value: Option<String>,
    pub unit: String,
    /// Dimension axis -> member, empty for consolidated (dimensionless) facts.
    #[serde(default)]
    pub dimensions: BTreeMap<String, String>,
    pub filing_form: String,
    pub filed_date: NaiveDate,
    pub accession: String,
}

impl RawObservation {
    pub fn is_dimensionless(&self) -> bool {
        self.dimensions.is_empty()
    }
}

/// Provenance of a consolidated value, kept for audit and debugging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactContext {
    pub filing_form: String,
    pub filed_date: NaiveDate,
    pub accession: String,
    #[serde(default)]
    pub dimensions: BTreeMap<String, String>,
}

/// The single authoritative value chosen for a `(concept, period_end, unit)`.
///
/// `dimensions_used` signals that the value came from a dimensioned
/// observation because no dimensionless alternative existed; downstream
/// consumers treat such values as lower confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedFact {
    pub value: f64,
    pub unit: String,
    pub context: FactContext,
    pub dimensions_used: bool,
}

/// A presentational statement row.
///
/// `roles` starts empty and is filled exactly once by the classifier;
/// `roles = []` downstream means "unclassified", never "no data".
/// `subitems` is a placeholder for future parent/child grouping and is always
/// empty in the current design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub tag: String,
    pub label: String,
    #[serde(default)]
    pub unit: Option<String>,
    pub periods: BTreeMap<NaiveDate, f64>,
    #[serde(default)]
    pub roles: BTreeSet<Role>,
    pub classification_confidence: f64,
    #[serde(default)]
    pub dimensions_used: bool,
    #[serde(default)]
    pub subitems: Vec<LineItem>,
}

impl LineItem {
    pub fn new(tag: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            label: label.into(),
            unit: None,
            periods: BTreeMap::new(),
            roles: BTreeSet::new(),
            classification_confidence: 0.0,
            dimensions_used: false,
            subitems: Vec::new(),
        }
    }

    /// Value for the most recent reported period, if any.
    pub fn latest_value(&self) -> Option<f64> {
        self.periods.values().next_back().copied()
    }

    pub fn has_value(&self) -> bool {
        !self.periods.is_empty()
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// The final artifact of this engine: ordered, role-tagged line items for one
/// statement type.
///
/// `canonical_order` is the curated registry sequence for the statement type;
/// `line_items` follows it for tags present in the registry, then remaining
/// tags sorted lexically. Every tag appears at most once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statement {
    pub statement_type: StatementType,
    pub canonical_order: Vec<String>,
    pub line_items: Vec<LineItem>,
}

impl Statement {
    pub fn get(&self, tag: &str) -> Option<&LineItem> {
        self.line_items.iter().find(|item| item.tag == tag)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::Role;

    fn observation(concept: &str) -> RawObservation {
        RawObservation {
            concept: concept.to_string(),
            period_end: NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
            period_start: None,
            value: Some("100".to_string()),
            unit: "USD".to_string(),
            dimensions: BTreeMap::new(),
            filing_form: "10-K".to_string(),
            filed_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            accession: "0000001-24-000001".to_string(),
        }
    }

    #[test]
    fn test_observation_serialization_roundtrip() {
        let obs = observation("Revenues");
        let json = serde_json::to_string(&obs).unwrap();
        let back: RawObservation = serde_json::from_str(&json).unwrap();
        assert_eq!(back.concept, "Revenues");
        assert!(back.is_dimensionless());
    }

    #[test]
    fn test_line_item_latest_value() {
        let mut item = LineItem::new("Revenues", "Revenues");
        assert_eq!(item.latest_value(), None);
        item.periods
            .insert(NaiveDate::from_ymd_opt(2022, 12, 31).unwrap(), 10.0);
        item.periods
            .insert(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(), 20.0);
        assert_eq!(item.latest_value(), Some(20.0));
    }

    #[test]
    fn test_roles_serialize_as_wire_ids() {
        let mut item = LineItem::new("Revenues", "Revenues");
        item.roles.insert(Role::IsRevenueTotal);
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("IS_REVENUE_TOTAL"));
    }

    #[test]
    fn test_statement_type_prefixes() {
        assert_eq!(StatementType::Income.prefix(), "IS");
        assert_eq!(StatementType::Balance.prefix(), "BS");
        assert_eq!(StatementType::CashFlow.prefix(), "CF");
    }
}
