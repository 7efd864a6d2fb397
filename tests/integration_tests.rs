use chrono::NaiveDate;
use statement_normalizer::*;
use std::collections::BTreeMap;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn observation(concept: &str, fiscal_year: i32, value: &str) -> RawObservation {
    RawObservation {
        concept: concept.to_string(),
        period_end: date(fiscal_year, 12, 31),
        period_start: Some(date(fiscal_year, 1, 1)),
        value: Some(value.to_string()),
        unit: "USD".to_string(),
        dimensions: BTreeMap::new(),
        filing_form: "10-K".to_string(),
        filed_date: date(fiscal_year + 1, 2, 15),
        accession: format!("0000320193-{}-000106", fiscal_year + 1),
    }
}

fn segmented(concept: &str, fiscal_year: i32, value: &str, member: &str) -> RawObservation {
    let mut obs = observation(concept, fiscal_year, value);
    obs.dimensions.insert(
        "StatementBusinessSegmentsAxis".to_string(),
        member.to_string(),
    );
    obs
}

/// A small two-year fact set covering all three statements, with the
/// segment noise and combined-concept quirks real filings have.
fn company_facts() -> BTreeMap<String, Vec<RawObservation>> {
    let mut facts: BTreeMap<String, Vec<RawObservation>> = BTreeMap::new();
    let mut add = |obs: RawObservation| facts.entry(obs.concept.clone()).or_default().push(obs);

    for year in [2022, 2023] {
        let scale = if year == 2022 { 0.9 } else { 1.0 };
        let amount = |v: f64| format!("{}", v * scale);

        // Income statement, with a segment split on revenue.
        add(observation("Revenues", year, &amount(41_000_000_000.0)));
        add(segmented("Revenues", year, &amount(9_000_000_000.0), "EuropeSegment"));
        add(observation("CostOfRevenue", year, &amount(24_000_000_000.0)));
        add(observation("GrossProfit", year, &amount(17_000_000_000.0)));
        add(observation(
            "SellingGeneralAndAdministrativeExpense",
            year,
            &amount(5_000_000_000.0),
        ));
        add(observation(
            "ResearchAndDevelopmentExpense",
            year,
            &amount(3_000_000_000.0),
        ));
        add(observation("OperatingIncomeLoss", year, &amount(9_000_000_000.0)));
        add(observation("NetIncomeLoss", year, &amount(7_000_000_000.0)));

        // Balance sheet: no standalone AccountsPayableCurrent, only the
        // combined AP-and-accrued line.
        add(observation(
            "CashAndCashEquivalentsAtCarryingValue",
            year,
            &amount(12_000_000_000.0),
        ));
        add(observation("AccountsReceivableNetCurrent", year, &amount(6_000_000_000.0)));
        add(observation("InventoryNet", year, &amount(2_000_000_000.0)));
        add(observation("Assets", year, &amount(90_000_000_000.0)));
        add(observation(
            "AccountsPayableAndAccruedLiabilitiesCurrent",
            year,
            &amount(3_200_000_000.0),
        ));
        add(observation("LongTermDebtNoncurrent", year, &amount(20_000_000_000.0)));
        add(observation("StockholdersEquity", year, &amount(45_000_000_000.0)));

        // Cash flow statement.
        add(observation(
            "DepreciationDepletionAndAmortization",
            year,
            &amount(2_500_000_000.0),
        ));
        add(observation(
            "NetCashProvidedByUsedInOperatingActivities",
            year,
            &amount(10_000_000_000.0),
        ));
        add(observation(
            "PaymentsToAcquirePropertyPlantAndEquipment",
            year,
            &amount(4_000_000_000.0),
        ));
        add(observation("PaymentsOfDividends", year, &amount(1_500_000_000.0)));
    }

    facts
}

fn normalize_and_classify_all() -> Vec<Statement> {
    let normalizer = FactNormalizer::with_default_policy();
    let grouped = group_by_statement(&company_facts());

    let mut statements = Vec::new();
    for (statement_type, observations) in grouped {
        let input = StatementInput {
            statement_type,
            observations,
            labels: BTreeMap::new(),
        };
        let mut statement = normalizer.normalize(&input).unwrap();
        apply_rule_table(statement.statement_type, &mut statement.line_items);
        statements.push(statement);
    }
    statements
}

#[test]
fn test_full_pipeline_produces_three_ordered_statements() {
    let statements = normalize_and_classify_all();
    assert_eq!(statements.len(), 3);

    for statement in &statements {
        // Registry tags come first, in registry order.
        let mut last_index = None;
        for item in &statement.line_items {
            let index = order_index(statement.statement_type, &item.tag);
            match (last_index, index) {
                (Some(None), Some(_)) => {
                    panic!("registry tag '{}' emitted after unknown tags", item.tag)
                }
                (Some(Some(prev)), Some(curr)) => assert!(prev < curr),
                _ => {}
            }
            last_index = Some(index);
        }
    }
}

#[test]
fn test_segmented_revenue_never_displaces_consolidated_value() {
    let statements = normalize_and_classify_all();
    let income = statements
        .iter()
        .find(|s| s.statement_type == StatementType::Income)
        .unwrap();

    let revenues = income.get("Revenues").unwrap();
    assert_eq!(revenues.periods[&date(2023, 12, 31)], 41_000_000_000.0);
    assert!(!revenues.dimensions_used);
    assert!(revenues.has_role(Role::IsRevenueTotal));
    assert_eq!(revenues.classification_confidence, RULE_CONFIDENCE);
}

#[test]
fn test_validation_report_with_proxy_and_computed_paths() {
    let statements = normalize_and_classify_all();
    let all_items: Vec<LineItem> = statements
        .iter()
        .flat_map(|s| s.line_items.iter().cloned())
        .collect();

    let report = validate_all(&model_requirements(), &all_items);
    assert_eq!(report.total, report.passed + report.failed);

    let by_name: BTreeMap<&str, &ValidationResult> = report
        .results
        .iter()
        .map(|r| (r.variable.as_str(), r))
        .collect();

    assert_eq!(by_name["Revenue"].status, ValidationStatus::PassDirect);

    // No standalone AP line, so the combined line must satisfy the proxy path.
    let ap = by_name["Accounts Payable"];
    assert_eq!(ap.status, ValidationStatus::PassProxy);
    assert_eq!(
        ap.line_item.as_deref(),
        Some("AccountsPayableAndAccruedLiabilitiesCurrent")
    );
    assert_eq!(ap.value, Some(3_200_000_000.0));

    // No OperatingExpenses line either: SG&A + R&D must add up instead.
    let opex = by_name["Operating Expenses"];
    assert_eq!(opex.status, ValidationStatus::PassComputed);
    assert_eq!(opex.value, Some(8_000_000_000.0));
}

#[test]
fn test_validation_report_serializes_to_json() -> anyhow::Result<()> {
    let statements = normalize_and_classify_all();
    let all_items: Vec<LineItem> = statements
        .iter()
        .flat_map(|s| s.line_items.iter().cloned())
        .collect();

    let report = validate_all(&model_requirements(), &all_items);
    let json = report.to_json()?;
    let parsed: serde_json::Value = serde_json::from_str(&json)?;
    assert_eq!(parsed["total"].as_u64().unwrap() as usize, report.total);
    assert!(json.contains("PASS_PROXY"));
    Ok(())
}

#[test]
fn test_malformed_classifier_entries_never_corrupt_statements() {
    let statements = normalize_and_classify_all();
    let mut income = statements
        .into_iter()
        .find(|s| s.statement_type == StatementType::Income)
        .unwrap();

    // Simulate a sloppy classifier response: an unknown line id, an invented
    // role, and a valid assignment, all in one payload.
    let response = ClassificationResponse {
        tags: vec![
            TaggedLine {
                line_id: "IS__DoesNotExist__Consolidated".to_string(),
                calc_tags: vec!["IS_REVENUE_TOTAL".to_string()],
            },
            TaggedLine {
                line_id: line_id(StatementType::Income, income.get("GrossProfit").unwrap()),
                calc_tags: vec!["made_up_tag".to_string()],
            },
            TaggedLine {
                line_id: line_id(StatementType::Income, income.get("GrossProfit").unwrap()),
                calc_tags: vec!["IS_GROSS_PROFIT".to_string()],
            },
        ],
    };

    apply_role_assignments(
        StatementType::Income,
        &mut income.line_items,
        &response,
        FALLBACK_CONFIDENCE,
    );

    let gross_profit = income.get("GrossProfit").unwrap();
    assert!(gross_profit.has_role(Role::IsGrossProfit));

    // Whatever happened, no role outside the income bucket may survive.
    for item in &income.line_items {
        for role in &item.roles {
            assert_eq!(role.statement(), StatementType::Income);
        }
    }
}

#[test]
fn test_statement_serializes_for_downstream_consumers() {
    let statements = normalize_and_classify_all();
    let income = statements
        .iter()
        .find(|s| s.statement_type == StatementType::Income)
        .unwrap();

    let json = income.to_json().unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["statement_type"], "income");
    assert!(parsed["line_items"].as_array().unwrap().len() >= 7);
    // Unclassified rows serialize with an empty role list, not a missing one.
    assert!(parsed["line_items"]
        .as_array()
        .unwrap()
        .iter()
        .all(|item| item["roles"].is_array()));
}
