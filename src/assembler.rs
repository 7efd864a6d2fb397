//! Statement assembly: turning consolidated facts into ordered line items.

use crate::ordering::canonical_order;
use crate::schema::{ConsolidatedFact, LineItem, Statement, StatementType};
use chrono::NaiveDate;
use log::debug;
use std::collections::BTreeMap;

/// Consolidated facts keyed by concept tag, then by period end.
///
/// Inserting the same period twice overwrites with the same value, so
/// accumulating facts period by period is idempotent.
pub type FactTable = BTreeMap<String, BTreeMap<NaiveDate, ConsolidatedFact>>;

/// Build a statement from consolidated facts.
///
/// All periods for the same concept merge into one line item. Tags present
/// in the canonical order registry are emitted first in registry order;
/// remaining tags follow, sorted lexically. The output is deterministic for
/// a fixed input set. Roles are initialized empty and filled later by the
/// classifier, never here.
pub fn assemble(
    statement_type: StatementType,
    facts: &FactTable,
    labels: &BTreeMap<String, String>,
) -> Statement {
    let registry = canonical_order(statement_type);

    let mut line_items = Vec::with_capacity(facts.len());
    for tag in registry {
        if let Some(periods) = facts.get(*tag) {
            line_items.push(build_line_item(tag, periods, labels));
        }
    }
    for (tag, periods) in facts {
        if registry.contains(&tag.as_str()) {
            continue;
        }
        line_items.push(build_line_item(tag, periods, labels));
    }

    debug!(
        "assembled {} with {} line items ({} registry-ordered)",
        statement_type.label(),
        line_items.len(),
        line_items
            .iter()
            .filter(|item| registry.contains(&item.tag.as_str()))
            .count()
    );

    Statement {
        statement_type,
        canonical_order: registry.iter().map(|t| t.to_string()).collect(),
        line_items,
    }
}

fn build_line_item(
    tag: &str,
    periods: &BTreeMap<NaiveDate, ConsolidatedFact>,
    labels: &BTreeMap<String, String>,
) -> LineItem {
    let label = labels
        .get(tag)
        .cloned()
        .unwrap_or_else(|| humanize_tag(tag));

    let mut item = LineItem::new(tag, label);
    for (period_end, fact) in periods {
        item.periods.insert(*period_end, fact.value);
        item.dimensions_used |= fact.dimensions_used;
    }
    // Unit of the most recent period stands for the whole row.
    item.unit = periods.values().next_back().map(|fact| fact.unit.clone());
    item
}

/// Fallback label for tags the filing supplied no label for:
/// `AccountsPayableCurrent` becomes `Accounts Payable Current`.
pub fn humanize_tag(tag: &str) -> String {
    let mut label = String::with_capacity(tag.len() + 8);
    let mut prev_lower = false;
    for c in tag.chars() {
        if c.is_uppercase() && prev_lower {
            label.push(' ');
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        label.push(c);
    }
    label
}
