//! Role classification: a deterministic concept lookup table, plus the
//! validating adapter that merges untrusted classifier responses back into
//! line items.
//!
//! The external classification service is a collaborator we never trust:
//! its response decodes into provisional structs here and passes through a
//! strict allow-list before anything touches a [`LineItem`]. Unknown line
//! ids and role strings outside the vocabulary are dropped with a warning,
//! never propagated.

use crate::roles::Role;
use crate::schema::{LineItem, StatementType};
use log::{debug, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Confidence recorded for line items classified by the exact rule table.
pub const RULE_CONFIDENCE: f64 = 1.0;

/// Confidence recorded for line items classified by the language-model
/// fallback.
pub const FALLBACK_CONFIDENCE: f64 = 0.75;

/// Exact concept-to-role mapping for common standardized concepts.
///
/// Only unmapped concepts fall through to the language-model fallback.
/// `NetIncomeLoss` maps differently per statement: a result line on the
/// income statement, the starting point of operating activities on the cash
/// flow statement.
pub fn rule_roles(statement: StatementType, tag: &str) -> Option<&'static [Role]> {
    let roles: &'static [Role] = match statement {
        StatementType::Income => match tag {
            "Revenues"
            | "RevenueFromContractWithCustomerExcludingAssessedTax"
            | "SalesRevenueNet" => &[Role::IsRevenueTotal],
            "CostOfRevenue" | "CostOfGoodsAndServicesSold" => &[Role::IsCogs],
            "GrossProfit" => &[Role::IsGrossProfit],
            "ResearchAndDevelopmentExpense" => &[Role::IsResearchDevelopment],
            "SellingGeneralAndAdministrativeExpense" => &[Role::IsSellingGeneralAdmin],
            "OperatingExpenses" => &[Role::IsOpexTotal],
            "OperatingIncomeLoss" => &[Role::IsOperatingIncome],
            "InterestExpense" => &[Role::IsInterestExpense],
            "IncomeLossFromContinuingOperationsBeforeIncomeTaxesExtraordinaryItemsNoncontrollingInterest" => {
                &[Role::IsPretaxIncome]
            }
            "IncomeTaxExpenseBenefit" => &[Role::IsTaxExpense],
            "NetIncomeLoss" => &[Role::IsNetIncome],
            "EarningsPerShareDiluted" => &[Role::IsEpsDiluted],
            _ => return None,
        },
        StatementType::Balance => match tag {
            "CashAndCashEquivalentsAtCarryingValue" => &[Role::BsCash],
            "ShortTermInvestments" => &[Role::BsShortTermInvestments],
            "AccountsReceivableNetCurrent" => &[Role::BsAccountsReceivable],
            "InventoryNet" => &[Role::BsInventory],
            "AssetsCurrent" => &[Role::BsCurrentAssets],
            "PropertyPlantAndEquipmentNet" => &[Role::BsPpeNet],
            "Assets" => &[Role::BsTotalAssets],
            "AccountsPayableCurrent" => &[Role::BsAccountsPayable],
            "AccountsPayableAndAccruedLiabilitiesCurrent" => &[Role::BsApAndAccrued],
            "LiabilitiesCurrent" => &[Role::BsCurrentLiabilities],
            "LongTermDebtNoncurrent" => &[Role::BsLongTermDebt],
            "Liabilities" => &[Role::BsTotalLiabilities],
            "StockholdersEquity" => &[Role::BsTotalEquity],
            _ => return None,
        },
        StatementType::CashFlow => match tag {
            "NetIncomeLoss" => &[Role::CfNetIncome],
            "DepreciationDepletionAndAmortization"
            | "DepreciationAmortizationAndAccretionNet" => &[Role::CfDepreciationAmortization],
            "ShareBasedCompensation" => &[Role::CfStockComp],
            "NetCashProvidedByUsedInOperatingActivities" => &[Role::CfOperatingTotal],
            "PaymentsToAcquirePropertyPlantAndEquipment" => &[Role::CfCapex],
            "NetCashProvidedByUsedInInvestingActivities" => &[Role::CfInvestingTotal],
            "PaymentsOfDividends" | "PaymentsOfDividendsCommonStock" => &[Role::CfDividendsPaid],
            "PaymentsForRepurchaseOfCommonStock" => &[Role::CfShareRepurchase],
            "ProceedsFromIssuanceOfLongTermDebt" => &[Role::CfDebtIssued],
            "RepaymentsOfLongTermDebt" => &[Role::CfDebtRepaid],
            "NetCashProvidedByUsedInFinancingActivities" => &[Role::CfFinancingTotal],
            _ => return None,
        },
    };
    Some(roles)
}

/// Tag every line item the rule table covers. Returns how many items were
/// classified. Items that already carry roles are left alone.
pub fn apply_rule_table(statement: StatementType, line_items: &mut [LineItem]) -> usize {
    let mut classified = 0;
    for item in line_items.iter_mut() {
        if !item.roles.is_empty() {
            continue;
        }
        if let Some(roles) = rule_roles(statement, &item.tag) {
            item.roles.extend(roles.iter().copied());
            item.classification_confidence = RULE_CONFIDENCE;
            classified += 1;
        }
    }
    debug!(
        "rule table classified {}/{} {} line items",
        classified,
        line_items.len(),
        statement.prefix()
    );
    classified
}

/// Stable identifier a line item is known by in classifier payloads and
/// responses, e.g. `IS__Revenues__Consolidated`.
pub fn line_id(statement: StatementType, item: &LineItem) -> String {
    format!(
        "{}__{}__{}",
        statement.prefix(),
        item.tag,
        if item.dimensions_used { "Dimensioned" } else { "Consolidated" }
    )
}

/// Compact projection of one line item sent to the classification service.
/// Monetary period detail is stripped to control payload size; a single
/// scalar hint remains for plausibility checks.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LinePayload {
    #[schemars(description = "Stable identifier for this line; echo it back unchanged")]
    pub line_id: String,

    #[schemars(description = "Presentation label as shown in the filing")]
    pub label: String,

    #[schemars(description = "Label of the parent grouping row, when one exists")]
    pub parent_label: Option<String>,

    #[schemars(description = "Standardized accounting concept identifier")]
    pub concept_id: String,

    #[schemars(
        description = "True for section headers that carry no value and must not be classified"
    )]
    pub is_abstract: bool,

    #[schemars(description = "Most recent reported value, for plausibility checks only")]
    pub value_hint: Option<f64>,

    #[schemars(description = "True when the value was derived from a segmented observation")]
    pub dimensions: bool,
}

/// Section headers carry no unit and no value, or advertise themselves in
/// the concept name; classifying them would be meaningless.
pub fn is_abstract(item: &LineItem) -> bool {
    (item.unit.is_none() && item.periods.is_empty()) || item.tag.contains("Abstract")
}

/// Project line items into the schema-stable payload for the classifier.
pub fn build_payload(statement: StatementType, line_items: &[LineItem]) -> Vec<LinePayload> {
    line_items
        .iter()
        .map(|item| LinePayload {
            line_id: line_id(statement, item),
            label: item.label.clone(),
            parent_label: None,
            concept_id: item.tag.clone(),
            is_abstract: is_abstract(item),
            value_hint: item.latest_value(),
            dimensions: item.dimensions_used,
        })
        .collect()
}

/// One line's role assignment as returned by the classification service.
/// Untrusted until it passes [`apply_role_assignments`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TaggedLine {
    #[schemars(description = "line_id copied from the request payload")]
    pub line_id: String,

    #[schemars(description = "Zero or more role identifiers from the allowed vocabulary")]
    #[serde(default)]
    pub calc_tags: Vec<String>,
}

/// The classification service's full response shape.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClassificationResponse {
    #[serde(default)]
    pub tags: Vec<TaggedLine>,
}

/// Merge a classifier response into line items, enforcing the closed
/// vocabulary.
///
/// Unknown line ids are dropped with a warning; role strings that fail
/// validation for this statement type are dropped with a warning; a line id
/// absent from the response simply keeps its empty role set. Returns how
/// many line items received at least one role.
pub fn apply_role_assignments(
    statement: StatementType,
    line_items: &mut [LineItem],
    response: &ClassificationResponse,
    confidence: f64,
) -> usize {
    let index_by_id: BTreeMap<String, usize> = line_items
        .iter()
        .enumerate()
        .map(|(idx, item)| (line_id(statement, item), idx))
        .collect();

    let mut tagged_items = 0;
    for tagged in &response.tags {
        let Some(&idx) = index_by_id.get(&tagged.line_id) else {
            warn!(
                "classifier referenced unknown line id '{}', dropping entry",
                tagged.line_id
            );
            continue;
        };

        let item = &mut line_items[idx];
        let mut applied = false;
        for raw_tag in &tagged.calc_tags {
            match Role::parse_for_statement(statement, raw_tag) {
                Some(role) => {
                    item.roles.insert(role);
                    applied = true;
                }
                None => warn!(
                    "classifier returned invalid role '{}' for '{}', dropping",
                    raw_tag, tagged.line_id
                ),
            }
        }
        if applied {
            item.classification_confidence = confidence;
            tagged_items += 1;
        }
    }
    tagged_items
}
