use blood_compatibility::{
    analysis::*, output::*, registry::*, selection::*, types::*, BloodTypeError,
};

#[test]
fn test_validated_query_flow() -> anyhow::Result<()> {
    // External input is validated before the engine sees it
    let selected: BloodType = "B-".parse()?;
    let engine = CompatibilityEngine::new();

    let raw = engine.compatible_with(selected, InteractionMode::Receive);
    assert_eq!(raw.labels(), vec!["O-", "B-"]);

    let highlighted = highlighted_ids(selected, InteractionMode::Receive);
    assert_eq!(highlighted, vec![BloodType::ONegative]);

    let report = QueryReport::new(selected, InteractionMode::Receive);
    let text = ReportGenerator::new(ReportFormat::Text).render_query(&report)?;
    assert!(text.contains("O- -> B-"));

    Ok(())
}

#[test]
fn test_unrecognized_input_never_reaches_engine() {
    let mut selection = Selection::default();

    for candidate in ["", "X+", "ABC", "positive", "A/B"] {
        let result = selection.select_str(candidate);
        assert!(matches!(result, Err(BloodTypeError::InvalidIdentifier(_))));
        assert_eq!(selection.selected(), None);
        assert!(selection.highlighted().is_empty());
    }

    assert!(BloodTypeRegistry::find_by_id("A+-").is_err());
}

#[test]
fn test_engine_usable_after_rejected_input() {
    let mut selection = Selection::new(InteractionMode::Give);
    selection.select(BloodType::OPositive);
    assert!(selection.select_str("garbled audio").is_err());

    selection.select_str("A negative").ok();
    assert_eq!(selection.selected(), Some(BloodType::ANegative));
    assert_eq!(
        selection.highlighted(),
        vec![BloodType::APositive, BloodType::ABNegative, BloodType::ABPositive]
    );
}

#[test]
fn test_chart_rows_agree_with_lookups() {
    let engine = CompatibilityEngine::new();
    let chart = engine.chart();

    for row in &chart.rows {
        let from_row: Vec<BloodType> = BloodType::all()
            .filter(|recipient| row.compatible[recipient.index()])
            .collect();
        assert_eq!(from_row, engine.recipients_for(row.donor));
    }
}
