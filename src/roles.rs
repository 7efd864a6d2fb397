//! The closed vocabulary of calculation roles.
//!
//! A role tells downstream valuation logic what a line item *means* (e.g.
//! "this row is total revenue"). Every role belongs to exactly one statement
//! type, and this enumeration is the single source of truth bounding
//! everything the classifier may emit: no code path introduces a role string
//! outside it.

use crate::schema::StatementType;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    // Income statement
    IsRevenueTotal,
    IsCogs,
    IsGrossProfit,
    IsResearchDevelopment,
    IsSellingGeneralAdmin,
    IsOpexTotal,
    IsOperatingIncome,
    IsInterestExpense,
    IsPretaxIncome,
    IsTaxExpense,
    IsNetIncome,
    IsEpsDiluted,

    // Balance sheet
    BsCash,
    BsShortTermInvestments,
    BsAccountsReceivable,
    BsInventory,
    BsCurrentAssets,
    BsPpeNet,
    BsTotalAssets,
    BsAccountsPayable,
    BsApAndAccrued,
    BsCurrentLiabilities,
    BsLongTermDebt,
    BsTotalLiabilities,
    BsTotalEquity,

    // Cash flow statement
    CfNetIncome,
    CfDepreciationAmortization,
    CfStockComp,
    CfOperatingTotal,
    CfCapex,
    CfInvestingTotal,
    CfDividendsPaid,
    CfShareRepurchase,
    CfDebtIssued,
    CfDebtRepaid,
    CfFinancingTotal,
}

impl Role {
    pub const ALL: [Role; 36] = [
        Role::IsRevenueTotal,
        Role::IsCogs,
        Role::IsGrossProfit,
        Role::IsResearchDevelopment,
        Role::IsSellingGeneralAdmin,
        Role::IsOpexTotal,
        Role::IsOperatingIncome,
        Role::IsInterestExpense,
        Role::IsPretaxIncome,
        Role::IsTaxExpense,
        Role::IsNetIncome,
        Role::IsEpsDiluted,
        Role::BsCash,
        Role::BsShortTermInvestments,
        Role::BsAccountsReceivable,
        Role::BsInventory,
        Role::BsCurrentAssets,
        Role::BsPpeNet,
        Role::BsTotalAssets,
        Role::BsAccountsPayable,
        Role::BsApAndAccrued,
        Role::BsCurrentLiabilities,
        Role::BsLongTermDebt,
        Role::BsTotalLiabilities,
        Role::BsTotalEquity,
        Role::CfNetIncome,
        Role::CfDepreciationAmortization,
        Role::CfStockComp,
        Role::CfOperatingTotal,
        Role::CfCapex,
        Role::CfInvestingTotal,
        Role::CfDividendsPaid,
        Role::CfShareRepurchase,
        Role::CfDebtIssued,
        Role::CfDebtRepaid,
        Role::CfFinancingTotal,
    ];

    /// The statement bucket this role belongs to.
    pub fn statement(&self) -> StatementType {
        match self {
            Role::IsRevenueTotal
            | Role::IsCogs
            | Role::IsGrossProfit
            | Role::IsResearchDevelopment
            | Role::IsSellingGeneralAdmin
            | Role::IsOpexTotal
            | Role::IsOperatingIncome
            | Role::IsInterestExpense
            | Role::IsPretaxIncome
            | Role::IsTaxExpense
            | Role::IsNetIncome
            | Role::IsEpsDiluted => StatementType::Income,

            Role::BsCash
            | Role::BsShortTermInvestments
            | Role::BsAccountsReceivable
            | Role::BsInventory
            | Role::BsCurrentAssets
            | Role::BsPpeNet
            | Role::BsTotalAssets
            | Role::BsAccountsPayable
            | Role::BsApAndAccrued
            | Role::BsCurrentLiabilities
            | Role::BsLongTermDebt
            | Role::BsTotalLiabilities
            | Role::BsTotalEquity => StatementType::Balance,

            Role::CfNetIncome
            | Role::CfDepreciationAmortization
            | Role::CfStockComp
            | Role::CfOperatingTotal
            | Role::CfCapex
            | Role::CfInvestingTotal
            | Role::CfDividendsPaid
            | Role::CfShareRepurchase
            | Role::CfDebtIssued
            | Role::CfDebtRepaid
            | Role::CfFinancingTotal => StatementType::CashFlow,
        }
    }

    /// Wire identifier, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::IsRevenueTotal => "IS_REVENUE_TOTAL",
            Role::IsCogs => "IS_COGS",
            Role::IsGrossProfit => "IS_GROSS_PROFIT",
            Role::IsResearchDevelopment => "IS_RESEARCH_DEVELOPMENT",
            Role::IsSellingGeneralAdmin => "IS_SELLING_GENERAL_ADMIN",
            Role::IsOpexTotal => "IS_OPEX_TOTAL",
            Role::IsOperatingIncome => "IS_OPERATING_INCOME",
            Role::IsInterestExpense => "IS_INTEREST_EXPENSE",
            Role::IsPretaxIncome => "IS_PRETAX_INCOME",
            Role::IsTaxExpense => "IS_TAX_EXPENSE",
            Role::IsNetIncome => "IS_NET_INCOME",
            Role::IsEpsDiluted => "IS_EPS_DILUTED",
            Role::BsCash => "BS_CASH",
            Role::BsShortTermInvestments => "BS_SHORT_TERM_INVESTMENTS",
            Role::BsAccountsReceivable => "BS_ACCOUNTS_RECEIVABLE",
            Role::BsInventory => "BS_INVENTORY",
            Role::BsCurrentAssets => "BS_CURRENT_ASSETS",
            Role::BsPpeNet => "BS_PPE_NET",
            Role::BsTotalAssets => "BS_TOTAL_ASSETS",
            Role::BsAccountsPayable => "BS_ACCOUNTS_PAYABLE",
            Role::BsApAndAccrued => "BS_AP_AND_ACCRUED",
            Role::BsCurrentLiabilities => "BS_CURRENT_LIABILITIES",
            Role::BsLongTermDebt => "BS_LONG_TERM_DEBT",
            Role::BsTotalLiabilities => "BS_TOTAL_LIABILITIES",
            Role::BsTotalEquity => "BS_TOTAL_EQUITY",
            Role::CfNetIncome => "CF_NET_INCOME",
            Role::CfDepreciationAmortization => "CF_DEPRECIATION_AMORTIZATION",
            Role::CfStockComp => "CF_STOCK_COMP",
            Role::CfOperatingTotal => "CF_OPERATING_TOTAL",
            Role::CfCapex => "CF_CAPEX",
            Role::CfInvestingTotal => "CF_INVESTING_TOTAL",
            Role::CfDividendsPaid => "CF_DIVIDENDS_PAID",
            Role::CfShareRepurchase => "CF_SHARE_REPURCHASE",
            Role::CfDebtIssued => "CF_DEBT_ISSUED",
            Role::CfDebtRepaid => "CF_DEBT_REPAID",
            Role::CfFinancingTotal => "CF_FINANCING_TOTAL",
        }
    }

    /// Short human-readable definition, used verbatim in the classifier prompt.
    pub fn definition(&self) -> &'static str {
        match self {
            Role::IsRevenueTotal => "Total revenue / net sales for the period",
            Role::IsCogs => "Cost of goods sold / cost of revenue",
            Role::IsGrossProfit => "Gross profit (revenue less cost of goods sold)",
            Role::IsResearchDevelopment => "Research and development expense",
            Role::IsSellingGeneralAdmin => "Selling, general and administrative expense",
            Role::IsOpexTotal => "Total operating expenses",
            Role::IsOperatingIncome => "Operating income / income from operations",
            Role::IsInterestExpense => "Interest expense",
            Role::IsPretaxIncome => "Income before income taxes",
            Role::IsTaxExpense => "Income tax expense or benefit",
            Role::IsNetIncome => "Net income attributable to the company",
            Role::IsEpsDiluted => "Diluted earnings per share",
            Role::BsCash => "Cash and cash equivalents",
            Role::BsShortTermInvestments => "Short-term / marketable investments",
            Role::BsAccountsReceivable => "Accounts receivable, net, current",
            Role::BsInventory => "Inventories, net",
            Role::BsCurrentAssets => "Total current assets",
            Role::BsPpeNet => "Property, plant and equipment, net",
            Role::BsTotalAssets => "Total assets",
            Role::BsAccountsPayable => "Accounts payable, current",
            Role::BsApAndAccrued => {
                "Combined accounts payable and accrued liabilities (when not reported separately)"
            }
            Role::BsCurrentLiabilities => "Total current liabilities",
            Role::BsLongTermDebt => "Long-term debt, noncurrent",
            Role::BsTotalLiabilities => "Total liabilities",
            Role::BsTotalEquity => "Total stockholders' equity",
            Role::CfNetIncome => "Net income as the starting point of operating activities",
            Role::CfDepreciationAmortization => "Depreciation and amortization add-back",
            Role::CfStockComp => "Share-based compensation add-back",
            Role::CfOperatingTotal => "Net cash provided by (used in) operating activities",
            Role::CfCapex => "Payments to acquire property, plant and equipment (capex)",
            Role::CfInvestingTotal => "Net cash provided by (used in) investing activities",
            Role::CfDividendsPaid => "Dividends paid to shareholders",
            Role::CfShareRepurchase => "Payments for repurchase of common stock",
            Role::CfDebtIssued => "Proceeds from issuance of debt",
            Role::CfDebtRepaid => "Repayments of debt",
            Role::CfFinancingTotal => "Net cash provided by (used in) financing activities",
        }
    }

    /// Resolve a wire identifier to a role, regardless of statement type.
    pub fn parse(s: &str) -> Option<Role> {
        Role::ALL.iter().copied().find(|role| role.as_str() == s)
    }

    /// Resolve a wire identifier only if it belongs to the given statement.
    pub fn parse_for_statement(statement: StatementType, s: &str) -> Option<Role> {
        Role::parse(s).filter(|role| role.statement() == statement)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// All roles allowed for a statement type.
pub fn roles_for_statement(statement: StatementType) -> Vec<Role> {
    Role::ALL
        .iter()
        .copied()
        .filter(|role| role.statement() == statement)
        .collect()
}

/// Whether `s` names a role that is valid for the given statement type.
pub fn is_valid_role(statement: StatementType, s: &str) -> bool {
    Role::parse_for_statement(statement, s).is_some()
}
