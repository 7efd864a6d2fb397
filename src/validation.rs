//! Validation harness: checks that every variable downstream modeling needs
//! is present, directly or via a declared computation or proxy path.
//!
//! Each variable evaluation is stateless and independent. Failures are
//! reported, never thrown; the caller always receives a full report.

use crate::roles::Role;
use crate::schema::LineItem;
use serde::{Deserialize, Serialize};

/// Alternate candidates attached to a FAIL result for diagnostics.
const MAX_FAIL_CANDIDATES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationStatus {
    PassDirect,
    PassComputed,
    PassProxy,
    Fail,
}

/// One variable required by downstream modeling, with its resolution paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableSpec {
    pub variable: String,
    pub expected_roles: Vec<Role>,
    /// Roles whose values sum to the variable when no direct match exists.
    #[serde(default)]
    pub computed_from: Option<Vec<Role>>,
    /// Roles that may stand in for the variable (e.g. a combined
    /// "AP and accrued" line standing in for accounts payable alone).
    #[serde(default)]
    pub proxy_roles: Vec<Role>,
}

impl VariableSpec {
    pub fn new(variable: impl Into<String>, expected_roles: Vec<Role>) -> Self {
        Self {
            variable: variable.into(),
            expected_roles,
            computed_from: None,
            proxy_roles: Vec::new(),
        }
    }

    pub fn with_computed_from(mut self, roles: Vec<Role>) -> Self {
        self.computed_from = Some(roles);
        self
    }

    pub fn with_proxy_roles(mut self, roles: Vec<Role>) -> Self {
        self.proxy_roles = roles;
        self
    }
}

/// Outcome of one variable evaluation. Created once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub variable: String,
    pub expected_roles: Vec<Role>,
    pub status: ValidationStatus,
    #[serde(default)]
    pub line_item: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub candidates: Vec<String>,
}

impl ValidationResult {
    pub fn passed(&self) -> bool {
        self.status != ValidationStatus::Fail
    }
}

/// Aggregated results plus summary counts; the JSON form is the expected
/// persisted report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub results: Vec<ValidationResult>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

impl ValidationReport {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Evaluate one variable against all classified line items.
pub fn validate(spec: &VariableSpec, line_items: &[LineItem]) -> ValidationResult {
    let mut result = ValidationResult {
        variable: spec.variable.clone(),
        expected_roles: spec.expected_roles.clone(),
        status: ValidationStatus::Fail,
        line_item: None,
        value: None,
        reason: None,
        candidates: Vec::new(),
    };

    // Direct: a line item carrying an expected role with a value.
    let direct: Vec<&LineItem> = line_items
        .iter()
        .filter(|item| {
            item.has_value() && spec.expected_roles.iter().any(|role| item.has_role(*role))
        })
        .collect();
    if let Some(chosen) = direct.first() {
        result.status = ValidationStatus::PassDirect;
        result.line_item = Some(chosen.tag.clone());
        result.value = chosen.latest_value();
        if direct.len() > 1 {
            result.reason = Some(format!(
                "{} line items carry an expected role; chose '{}' (first in presentation order)",
                direct.len(),
                chosen.tag
            ));
        }
        return result;
    }

    // Computed: sum of declared supporting roles, all of which must resolve.
    if let Some(parts) = &spec.computed_from {
        let resolved: Vec<(&Role, &LineItem)> = parts
            .iter()
            .filter_map(|role| {
                line_items
                    .iter()
                    .find(|item| item.has_role(*role) && item.has_value())
                    .map(|item| (role, item))
            })
            .collect();
        if !parts.is_empty() && resolved.len() == parts.len() {
            let sum: f64 = resolved
                .iter()
                .filter_map(|(_, item)| item.latest_value())
                .sum();
            let sources: Vec<String> = resolved
                .iter()
                .map(|(role, item)| format!("{} ({})", role, item.tag))
                .collect();
            result.status = ValidationStatus::PassComputed;
            result.value = Some(sum);
            result.reason = Some(format!("computed as sum of {}", sources.join(" + ")));
            return result;
        }
    }

    // Proxy: a configured stand-in role with a value.
    for role in &spec.proxy_roles {
        if let Some(item) = line_items
            .iter()
            .find(|item| item.has_role(*role) && item.has_value())
        {
            result.status = ValidationStatus::PassProxy;
            result.line_item = Some(item.tag.clone());
            result.value = item.latest_value();
            result.reason = Some(format!("proxy role {} stands in via '{}'", role, item.tag));
            return result;
        }
    }

    // Nothing resolved. Attach unclassified-but-valued rows as the most
    // likely misclassification suspects.
    let expected: Vec<String> = spec
        .expected_roles
        .iter()
        .map(|role| role.to_string())
        .collect();
    result.reason = Some(format!(
        "no line item carries any of [{}] with a reported value",
        expected.join(", ")
    ));
    result.candidates = line_items
        .iter()
        .filter(|item| item.roles.is_empty() && item.has_value())
        .take(MAX_FAIL_CANDIDATES)
        .map(|item| item.tag.clone())
        .collect();
    result
}

/// Evaluate every spec and aggregate a summary. No retries, no state carried
/// between variables.
pub fn validate_all(specs: &[VariableSpec], line_items: &[LineItem]) -> ValidationReport {
    let results: Vec<ValidationResult> = specs
        .iter()
        .map(|spec| validate(spec, line_items))
        .collect();
    let passed = results.iter().filter(|r| r.passed()).count();
    ValidationReport {
        total: results.len(),
        passed,
        failed: results.len() - passed,
        results,
    }
}

/// The variables downstream valuation modeling requires, with their declared
/// computation and proxy paths.
pub fn model_requirements() -> Vec<VariableSpec> {
    vec![
        VariableSpec::new("Revenue", vec![Role::IsRevenueTotal]),
        VariableSpec::new("Cost of Goods Sold", vec![Role::IsCogs]),
        VariableSpec::new("Operating Expenses", vec![Role::IsOpexTotal]).with_computed_from(vec![
            Role::IsSellingGeneralAdmin,
            Role::IsResearchDevelopment,
        ]),
        VariableSpec::new("Operating Income", vec![Role::IsOperatingIncome]),
        VariableSpec::new("Net Income", vec![Role::IsNetIncome]),
        VariableSpec::new(
            "Depreciation & Amortization",
            vec![Role::CfDepreciationAmortization],
        ),
        VariableSpec::new("Capital Expenditure", vec![Role::CfCapex]),
        VariableSpec::new("Operating Cash Flow", vec![Role::CfOperatingTotal]),
        VariableSpec::new("Cash & Equivalents", vec![Role::BsCash]),
        VariableSpec::new("Accounts Receivable", vec![Role::BsAccountsReceivable]),
        VariableSpec::new("Inventory", vec![Role::BsInventory]),
        VariableSpec::new("Accounts Payable", vec![Role::BsAccountsPayable])
            .with_proxy_roles(vec![Role::BsApAndAccrued]),
        VariableSpec::new("Total Debt", vec![Role::BsLongTermDebt]),
        VariableSpec::new("Total Equity", vec![Role::BsTotalEquity]),
        VariableSpec::new("Dividends Paid", vec![Role::CfDividendsPaid]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn item(tag: &str, role: Option<Role>, value: Option<f64>) -> LineItem {
        let mut item = LineItem::new(tag, tag);
        item.unit = Some("USD".to_string());
        if let Some(role) = role {
            item.roles.insert(role);
        }
        if let Some(value) = value {
            item.periods
                .insert(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(), value);
        }
        item
    }

    #[test]
    fn test_direct_pass() {
        let items = vec![item("Revenues", Some(Role::IsRevenueTotal), Some(1000.0))];
        let spec = VariableSpec::new("Revenue", vec![Role::IsRevenueTotal]);
        let result = validate(&spec, &items);
        assert_eq!(result.status, ValidationStatus::PassDirect);
        assert_eq!(result.line_item.as_deref(), Some("Revenues"));
        assert_eq!(result.value, Some(1000.0));
    }

    #[test]
    fn test_direct_pass_ambiguity_keeps_first_and_records_reason() {
        let items = vec![
            item("Revenues", Some(Role::IsRevenueTotal), Some(1000.0)),
            item("SalesRevenueNet", Some(Role::IsRevenueTotal), Some(990.0)),
        ];
        let spec = VariableSpec::new("Revenue", vec![Role::IsRevenueTotal]);
        let result = validate(&spec, &items);
        assert_eq!(result.status, ValidationStatus::PassDirect);
        assert_eq!(result.line_item.as_deref(), Some("Revenues"));
        assert!(result.reason.unwrap().contains("2 line items"));
    }

    #[test]
    fn test_computed_pass_sums_supporting_roles() {
        let items = vec![
            item("SellingGeneralAndAdministrativeExpense", Some(Role::IsSellingGeneralAdmin), Some(300.0)),
            item("ResearchAndDevelopmentExpense", Some(Role::IsResearchDevelopment), Some(200.0)),
        ];
        let spec = VariableSpec::new("Operating Expenses", vec![Role::IsOpexTotal])
            .with_computed_from(vec![Role::IsSellingGeneralAdmin, Role::IsResearchDevelopment]);
        let result = validate(&spec, &items);
        assert_eq!(result.status, ValidationStatus::PassComputed);
        assert_eq!(result.value, Some(500.0));
        assert!(result.reason.unwrap().contains("sum of"));
    }

    #[test]
    fn test_computed_requires_every_supporting_role() {
        let items = vec![item(
            "SellingGeneralAndAdministrativeExpense",
            Some(Role::IsSellingGeneralAdmin),
            Some(300.0),
        )];
        let spec = VariableSpec::new("Operating Expenses", vec![Role::IsOpexTotal])
            .with_computed_from(vec![Role::IsSellingGeneralAdmin, Role::IsResearchDevelopment]);
        let result = validate(&spec, &items);
        assert_eq!(result.status, ValidationStatus::Fail);
    }

    #[test]
    fn test_proxy_pass_for_combined_accounts_payable_line() {
        let items = vec![item(
            "AccountsPayableAndAccruedLiabilitiesCurrent",
            Some(Role::BsApAndAccrued),
            Some(3_200_000_000.0),
        )];
        let spec = VariableSpec::new("Accounts Payable", vec![Role::BsAccountsPayable])
            .with_proxy_roles(vec![Role::BsApAndAccrued]);
        let result = validate(&spec, &items);
        assert_eq!(result.status, ValidationStatus::PassProxy);
        assert_eq!(
            result.line_item.as_deref(),
            Some("AccountsPayableAndAccruedLiabilitiesCurrent")
        );
        assert_eq!(result.value, Some(3_200_000_000.0));
    }

    #[test]
    fn test_direct_match_beats_proxy() {
        let items = vec![
            item("AccountsPayableCurrent", Some(Role::BsAccountsPayable), Some(900.0)),
            item(
                "AccountsPayableAndAccruedLiabilitiesCurrent",
                Some(Role::BsApAndAccrued),
                Some(3200.0),
            ),
        ];
        let spec = VariableSpec::new("Accounts Payable", vec![Role::BsAccountsPayable])
            .with_proxy_roles(vec![Role::BsApAndAccrued]);
        let result = validate(&spec, &items);
        assert_eq!(result.status, ValidationStatus::PassDirect);
        assert_eq!(result.value, Some(900.0));
    }

    #[test]
    fn test_fail_attaches_reason_and_candidates() {
        let items = vec![
            item("MysteryConcept", None, Some(42.0)),
            item("AnotherConcept", None, Some(7.0)),
            item("ClassifiedElsewhere", Some(Role::BsCash), Some(1.0)),
        ];
        let spec = VariableSpec::new("Inventory", vec![Role::BsInventory]);
        let result = validate(&spec, &items);
        assert_eq!(result.status, ValidationStatus::Fail);
        assert!(result.reason.unwrap().contains("BS_INVENTORY"));
        assert_eq!(result.candidates, vec!["MysteryConcept", "AnotherConcept"]);
    }

    #[test]
    fn test_role_without_value_does_not_pass() {
        let items = vec![item("InventoryNet", Some(Role::BsInventory), None)];
        let spec = VariableSpec::new("Inventory", vec![Role::BsInventory]);
        assert_eq!(validate(&spec, &items).status, ValidationStatus::Fail);
    }

    #[test]
    fn test_validate_all_summary_counts() {
        let items = vec![item("Revenues", Some(Role::IsRevenueTotal), Some(1000.0))];
        let specs = vec![
            VariableSpec::new("Revenue", vec![Role::IsRevenueTotal]),
            VariableSpec::new("Inventory", vec![Role::BsInventory]),
        ];
        let report = validate_all(&specs, &items);
        assert_eq!(report.total, 2);
        assert_eq!(report.passed, 1);
        assert_eq!(report.failed, 1);
    }

    #[test]
    fn test_report_serializes_with_wire_statuses() {
        let items = vec![item("Revenues", Some(Role::IsRevenueTotal), Some(1000.0))];
        let specs = vec![VariableSpec::new("Revenue", vec![Role::IsRevenueTotal])];
        let json = validate_all(&specs, &items).to_json().unwrap();
        assert!(json.contains("PASS_DIRECT"));
        assert!(json.contains("IS_REVENUE_TOTAL"));
    }

    #[test]
    fn test_model_requirements_roles_match_their_buckets() {
        for spec in model_requirements() {
            let statements: std::collections::BTreeSet<_> = spec
                .expected_roles
                .iter()
                .map(|role| role.statement())
                .collect();
            assert_eq!(statements.len(), 1, "{} mixes statements", spec.variable);
        }
    }
}
