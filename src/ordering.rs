//! Canonical presentation order for each statement type.
//!
//! The three tables are manually curated to reflect standard statement
//! presentation: assets before liabilities before equity on the balance
//! sheet, operating before investing before financing on the cash flow
//! statement. Pure lookup, nothing here mutates at runtime. Tags absent from
//! the registry are handled by the assembler, which appends them sorted
//! lexically after the registry block.

use crate::schema::StatementType;

const INCOME_ORDER: &[&str] = &[
    "Revenues",
    "RevenueFromContractWithCustomerExcludingAssessedTax",
    "SalesRevenueNet",
    "CostOfRevenue",
    "CostOfGoodsAndServicesSold",
    "GrossProfit",
    "ResearchAndDevelopmentExpense",
    "SellingGeneralAndAdministrativeExpense",
    "OperatingExpenses",
    "OperatingIncomeLoss",
    "InterestExpense",
    "InterestIncomeOther",
    "OtherNonoperatingIncomeExpense",
    "IncomeLossFromContinuingOperationsBeforeIncomeTaxesExtraordinaryItemsNoncontrollingInterest",
    "IncomeTaxExpenseBenefit",
    "NetIncomeLoss",
    "EarningsPerShareBasic",
    "EarningsPerShareDiluted",
    "WeightedAverageNumberOfSharesOutstandingBasic",
    "WeightedAverageNumberOfDilutedSharesOutstanding",
];

const BALANCE_ORDER: &[&str] = &[
    "CashAndCashEquivalentsAtCarryingValue",
    "ShortTermInvestments",
    "AccountsReceivableNetCurrent",
    "InventoryNet",
    "PrepaidExpenseAndOtherAssetsCurrent",
    "AssetsCurrent",
    "PropertyPlantAndEquipmentNet",
    "OperatingLeaseRightOfUseAsset",
    "Goodwill",
    "IntangibleAssetsNetExcludingGoodwill",
    "LongTermInvestments",
    "OtherAssetsNoncurrent",
    "Assets",
    "AccountsPayableCurrent",
    "AccountsPayableAndAccruedLiabilitiesCurrent",
    "AccruedLiabilitiesCurrent",
    "ContractWithCustomerLiabilityCurrent",
    "LongTermDebtCurrent",
    "LiabilitiesCurrent",
    "LongTermDebtNoncurrent",
    "OperatingLeaseLiabilityNoncurrent",
    "OtherLiabilitiesNoncurrent",
    "Liabilities",
    "CommonStockValue",
    "AdditionalPaidInCapital",
    "RetainedEarningsAccumulatedDeficit",
    "AccumulatedOtherComprehensiveIncomeLossNetOfTax",
    "StockholdersEquity",
    "LiabilitiesAndStockholdersEquity",
];

const CASH_FLOW_ORDER: &[&str] = &[
    "NetIncomeLoss",
    "DepreciationDepletionAndAmortization",
    "DepreciationAmortizationAndAccretionNet",
    "ShareBasedCompensation",
    "DeferredIncomeTaxExpenseBenefit",
    "IncreaseDecreaseInAccountsReceivable",
    "IncreaseDecreaseInInventories",
    "IncreaseDecreaseInAccountsPayable",
    "NetCashProvidedByUsedInOperatingActivities",
    "PaymentsToAcquirePropertyPlantAndEquipment",
    "PaymentsToAcquireBusinessesNetOfCashAcquired",
    "PaymentsToAcquireInvestments",
    "ProceedsFromSaleMaturityAndCollectionsOfInvestments",
    "NetCashProvidedByUsedInInvestingActivities",
    "ProceedsFromIssuanceOfLongTermDebt",
    "RepaymentsOfLongTermDebt",
    "ProceedsFromIssuanceOfCommonStock",
    "PaymentsForRepurchaseOfCommonStock",
    "PaymentsOfDividends",
    "PaymentsOfDividendsCommonStock",
    "NetCashProvidedByUsedInFinancingActivities",
    "EffectOfExchangeRateOnCashCashEquivalentsRestrictedCashAndRestrictedCashEquivalents",
    "CashCashEquivalentsRestrictedCashAndRestrictedCashEquivalentsPeriodIncreaseDecreaseIncludingExchangeRateEffect",
];

/// The curated presentation sequence for a statement type.
pub fn canonical_order(statement: StatementType) -> &'static [&'static str] {
    match statement {
        StatementType::Income => INCOME_ORDER,
        StatementType::Balance => BALANCE_ORDER,
        StatementType::CashFlow => CASH_FLOW_ORDER,
    }
}

/// Position of a tag within its statement's registry, if present.
pub fn order_index(statement: StatementType, tag: &str) -> Option<usize> {
    canonical_order(statement).iter().position(|t| *t == tag)
}

/// Which statement a registry concept belongs to.
///
/// `NetIncomeLoss` appears on both the income and cash flow statements; the
/// income statement wins here since that is where the concept is primary.
/// Concepts outside all three registries return `None` and the caller decides
/// their placement.
pub fn statement_for_concept(tag: &str) -> Option<StatementType> {
    for statement in StatementType::ALL {
        if order_index(statement, tag).is_some() {
            return Some(statement);
        }
    }
    None
}
