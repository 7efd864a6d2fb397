//! Fact selection: collapsing duplicate and segmented observations for one
//! `(concept, period)` into the single authoritative value.
//!
//! Dimensionless (consolidated) observations always beat dimensioned ones,
//! regardless of magnitude. Within the dimensionless pool, annual-report
//! filings beat interim ones and recency breaks ties. Dimensioned values are
//! a last resort: segment-style members are filtered out first, and the
//! largest remaining magnitude wins.

use crate::schema::{ConsolidatedFact, FactContext, RawObservation};
use chrono::NaiveDate;
use log::debug;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Score assigned to any dimensionless pick when competing across units.
/// Dimensionless evidence wins over dimensioned evidence of any magnitude.
const DIMENSIONLESS_SCORE: f64 = 1000.0;

/// Policy for dropping dimension members that look like segment splits
/// rather than consolidated sub-entities.
///
/// The keyword list is inherently company-specific; override it per company
/// rather than assuming the default is complete.
#[derive(Debug, Clone)]
pub struct SelectionPolicy {
    pub exclusion_keywords: Vec<String>,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            exclusion_keywords: ["segment", "geograph", "region", "subsidiar", "product", "credit"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl SelectionPolicy {
    pub fn with_keywords(keywords: Vec<String>) -> Self {
        Self {
            exclusion_keywords: keywords,
        }
    }

    fn excludes_member(&self, member: &str) -> bool {
        let member = member.to_lowercase();
        self.exclusion_keywords
            .iter()
            .any(|keyword| member.contains(keyword.as_str()))
    }

    fn excludes_observation(&self, obs: &RawObservation) -> bool {
        obs.dimensions
            .values()
            .any(|member| self.excludes_member(member))
    }
}

pub struct FactSelector {
    policy: SelectionPolicy,
}

struct Candidate<'a> {
    observation: &'a RawObservation,
    value: f64,
    dimensions_used: bool,
    score: f64,
}

impl FactSelector {
    pub fn new(policy: SelectionPolicy) -> Self {
        Self { policy }
    }

    pub fn with_default_policy() -> Self {
        Self::new(SelectionPolicy::default())
    }

    pub fn policy(&self) -> &SelectionPolicy {
        &self.policy
    }

    /// Pick the single authoritative value from all observations reported for
    /// one `(concept, period)`.
    ///
    /// Returns `None` when no group yields a valid numeric candidate; the
    /// caller treats the concept as absent for the period, not as an error.
    pub fn select(&self, concept: &str, observations: &[RawObservation]) -> Option<ConsolidatedFact> {
        let mut groups: BTreeMap<(NaiveDate, &str), Vec<&RawObservation>> = BTreeMap::new();
        for obs in observations {
            groups
                .entry((obs.period_end, obs.unit.as_str()))
                .or_default()
                .push(obs);
        }

        let mut best: Option<Candidate> = None;
        for group in groups.values() {
            let Some(candidate) = self.select_within_group(group) else {
                continue;
            };
            let replace = match &best {
                Some(current) => outranks(&candidate, current),
                None => true,
            };
            if replace {
                best = Some(candidate);
            }
        }

        let Some(chosen) = best else {
            debug!("no usable observation for concept '{}'", concept);
            return None;
        };

        let obs = chosen.observation;
        debug!(
            "selected {} for '{}' from {} filed {} (dimensions_used: {})",
            chosen.value, concept, obs.filing_form, obs.filed_date, chosen.dimensions_used
        );

        Some(ConsolidatedFact {
            value: chosen.value,
            unit: obs.unit.clone(),
            context: FactContext {
                filing_form: obs.filing_form.clone(),
                filed_date: obs.filed_date,
                accession: obs.accession.clone(),
                dimensions: obs.dimensions.clone(),
            },
            dimensions_used: chosen.dimensions_used,
        })
    }

    fn select_within_group<'a>(&self, group: &[&'a RawObservation]) -> Option<Candidate<'a>> {
        let parseable: Vec<(&RawObservation, f64)> = group
            .iter()
            .filter_map(|obs| {
                let value = obs.value.as_deref().and_then(parse_numeric)?;
                Some((*obs, value))
            })
            .collect();

        let dimensionless: Vec<(&RawObservation, f64)> = parseable
            .iter()
            .copied()
            .filter(|(obs, _)| obs.is_dimensionless())
            .collect();

        if !dimensionless.is_empty() {
            let (obs, value) = dimensionless
                .into_iter()
                .max_by(|a, b| filing_precedence(a.0, b.0))?;
            return Some(Candidate {
                observation: obs,
                value,
                dimensions_used: false,
                score: DIMENSIONLESS_SCORE,
            });
        }

        let dimensioned: Vec<(&RawObservation, f64)> = parseable
            .iter()
            .copied()
            .filter(|(obs, _)| !obs.is_dimensionless())
            .collect();
        if dimensioned.is_empty() {
            return None;
        }

        let retained: Vec<(&RawObservation, f64)> = dimensioned
            .iter()
            .copied()
            .filter(|(obs, _)| !self.policy.excludes_observation(obs))
            .collect();

        // All candidates matched the exclusion list: better a segmented value
        // than none at all.
        let pool = if retained.is_empty() { dimensioned } else { retained };

        let (obs, value) = pool.into_iter().max_by(|a, b| {
            a.1.abs()
                .partial_cmp(&b.1.abs())
                .unwrap_or(Ordering::Equal)
        })?;
        Some(Candidate {
            observation: obs,
            value,
            dimensions_used: true,
            score: value.abs(),
        })
    }
}

/// Cross-group ranking: a dimensionless pick outranks any dimensioned one,
/// whatever the magnitudes involved; score only competes within a tier.
fn outranks(a: &Candidate, b: &Candidate) -> bool {
    match (a.dimensions_used, b.dimensions_used) {
        (false, true) => true,
        (true, false) => false,
        _ => a.score > b.score,
    }
}

/// Multi-key precedence for competing dimensionless observations.
///
/// Annual-report forms outrank everything else, then later filing dates,
/// then accession numbers so that equal keys still order deterministically.
fn filing_precedence(a: &RawObservation, b: &RawObservation) -> Ordering {
    let a_key = (is_annual_report_form(&a.filing_form), a.filed_date, &a.accession);
    let b_key = (is_annual_report_form(&b.filing_form), b.filed_date, &b.accession);
    a_key.cmp(&b_key)
}

/// Annual report family: 10-K and amendments, plus foreign-issuer equivalents.
fn is_annual_report_form(form: &str) -> bool {
    form.starts_with("10-K") || form.starts_with("20-F") || form.starts_with("40-F")
}

/// Parse a reported value into a finite number.
///
/// Handles thousands separators and accountant-style parentheses for
/// negatives. Anything else is unusable, never fatal.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let (body, negate) = match trimmed.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        Some(inner) => (inner, true),
        None => (trimmed, false),
    };
    let cleaned: String = body.chars().filter(|c| *c != ',').collect();
    let value: f64 = cleaned.trim().parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(if negate { -value } else { value })
}
