//! # Statement Normalizer
//!
//! A library for consolidating raw, multi-dimensional financial-statement
//! facts into canonical, ordered, role-classified statement line items
//! usable by downstream valuation logic.
//!
//! ## Core Concepts
//!
//! - **Raw observation**: one reported numeric fact per accounting concept,
//!   period and optional segment dimension; duplicates and segment splits
//!   are the norm, not the exception
//! - **Consolidated fact**: the single authoritative value chosen per
//!   concept and period, ideally free of segment dimensions
//! - **Statement assembly**: line items merged across periods and emitted
//!   in the curated canonical presentation order
//! - **Calculation roles**: a closed vocabulary telling downstream logic
//!   what each line item means; filled by an exact rule table with a
//!   Gemini-backed fallback (feature `gemini`) whose output is validated
//!   against the vocabulary before it is trusted
//! - **Validation harness**: checks that every variable modeling needs is
//!   resolvable directly, by computation, or through a proxy role
//!
//! ## Example
//!
//! ```rust,ignore
//! use statement_normalizer::*;
//!
//! let input = StatementInput {
//!     statement_type: StatementType::Income,
//!     observations: observations_by_concept,
//!     labels: Default::default(),
//! };
//!
//! let normalizer = FactNormalizer::with_default_policy();
//! let mut statement = normalizer.normalize(&input)?;
//! apply_rule_table(statement.statement_type, &mut statement.line_items);
//! let report = validate_all(&model_requirements(), &statement.line_items);
//! ```

pub mod assembler;
pub mod classify;
pub mod error;
pub mod ordering;
pub mod roles;
pub mod schema;
pub mod selector;
pub mod validation;

#[cfg(feature = "gemini")]
pub mod llm;

pub use assembler::{assemble, humanize_tag, FactTable};
pub use classify::{
    apply_role_assignments, apply_rule_table, build_payload, is_abstract, line_id, rule_roles,
    ClassificationResponse, LinePayload, TaggedLine, FALLBACK_CONFIDENCE, RULE_CONFIDENCE,
};
pub use error::{NormalizerError, Result};
pub use ordering::{canonical_order, order_index, statement_for_concept};
pub use roles::{is_valid_role, roles_for_statement, Role};
pub use schema::*;
pub use selector::{parse_numeric, FactSelector, SelectionPolicy};
pub use validation::*;

use chrono::NaiveDate;
use log::{debug, info};
use std::collections::BTreeMap;

/// Everything needed to build one statement: raw observations grouped by
/// concept, plus presentation labels where the filing supplied them.
#[derive(Debug, Clone)]
pub struct StatementInput {
    pub statement_type: StatementType,
    pub observations: BTreeMap<String, Vec<RawObservation>>,
    pub labels: BTreeMap<String, String>,
}

/// The consolidation half of the pipeline: raw observations in, an ordered
/// (still unclassified) statement out.
pub struct FactNormalizer {
    selector: FactSelector,
}

impl FactNormalizer {
    pub fn new(policy: SelectionPolicy) -> Self {
        Self {
            selector: FactSelector::new(policy),
        }
    }

    pub fn with_default_policy() -> Self {
        Self::new(SelectionPolicy::default())
    }

    /// Consolidate and assemble one statement.
    ///
    /// Concepts and periods with no usable value are recorded as absent,
    /// never as errors; only structurally invalid input fails.
    pub fn normalize(&self, input: &StatementInput) -> Result<Statement> {
        validate_input_integrity(input)?;

        info!(
            "consolidating {} concepts for the {}",
            input.observations.len(),
            input.statement_type.label()
        );

        let mut facts = FactTable::new();
        for (concept, observations) in &input.observations {
            let mut by_period: BTreeMap<NaiveDate, Vec<RawObservation>> = BTreeMap::new();
            for obs in observations {
                by_period.entry(obs.period_end).or_default().push(obs.clone());
            }

            for (period_end, group) in by_period {
                match self.selector.select(concept, &group) {
                    Some(fact) => {
                        facts
                            .entry(concept.clone())
                            .or_default()
                            .insert(period_end, fact);
                    }
                    None => debug!(
                        "no consolidated value for '{}' at {}",
                        concept, period_end
                    ),
                }
            }
        }

        Ok(assemble(input.statement_type, &facts, &input.labels))
    }
}

fn validate_input_integrity(input: &StatementInput) -> Result<()> {
    for (concept, observations) in &input.observations {
        if concept.trim().is_empty() {
            return Err(NormalizerError::InvalidObservation {
                concept: concept.clone(),
                details: "concept tag is empty".to_string(),
            });
        }
        for obs in observations {
            if obs.unit.trim().is_empty() {
                return Err(NormalizerError::InvalidObservation {
                    concept: concept.clone(),
                    details: "observation has an empty unit".to_string(),
                });
            }
            if let Some(start) = obs.period_start {
                if start > obs.period_end {
                    return Err(NormalizerError::InvalidObservation {
                        concept: concept.clone(),
                        details: format!(
                            "period_start {} falls after period_end {}",
                            start, obs.period_end
                        ),
                    });
                }
            }
        }
    }
    Ok(())
}

/// Convenience grouping of a company's full fact set by statement type,
/// driven by canonical-order registry membership.
///
/// Concepts outside every registry are skipped with a debug log; callers
/// that know the filing's actual presentation should group upstream instead.
pub fn group_by_statement(
    all_observations: &BTreeMap<String, Vec<RawObservation>>,
) -> BTreeMap<StatementType, BTreeMap<String, Vec<RawObservation>>> {
    let mut grouped: BTreeMap<StatementType, BTreeMap<String, Vec<RawObservation>>> =
        BTreeMap::new();
    for (concept, observations) in all_observations {
        match statement_for_concept(concept) {
            Some(statement_type) => {
                grouped
                    .entry(statement_type)
                    .or_default()
                    .insert(concept.clone(), observations.clone());
            }
            None => debug!("concept '{}' not in any registry, skipping", concept),
        }
    }
    grouped
}
