//! Generate-then-decode round trips
//!
//! A workbook produced for a template must decode back through the same
//! ordinal mapping, and untouched defaults must validate cleanly.

use pretty_assertions::assert_eq;
use std::sync::Arc;
use xltemplate_core::config::{DecoderConfig, GeneratorConfig, ServiceConfig};
use xltemplate_core::types::{ColumnDefinition, DataType, SubmissionStatus, TemplateDefinition};
use xltemplate_core::{SchemaManagement, SubmissionStore};
use xltemplate_service::generator::TemplateGenerator;
use xltemplate_service::loader::{DecodedCell, WorkbookDecoder};
use xltemplate_service::store::{InMemorySchemaStore, InMemorySubmissionStore};
use xltemplate_service::submission::SubmissionAssembler;
use xltemplate_service::validator::validate_cell;

type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Every required column carries a default, so the pre-filled row is complete.
fn onboarding_template() -> TemplateDefinition {
    let mut template = TemplateDefinition::new("Onboarding")
        .with_column(
            ColumnDefinition::new("Name", DataType::Text)
                .required()
                .with_max_length(40)
                .with_default("Jane Doe"),
        )
        .with_column(
            ColumnDefinition::new("Age", DataType::Number)
                .required()
                .with_range(18.0, 70.0)
                .with_default("30"),
        )
        .with_column(
            ColumnDefinition::new("Salary", DataType::Currency)
                .with_min(0.0)
                .with_default("1,250.50"),
        )
        .with_column(ColumnDefinition::new("Start", DataType::Date).with_default("2024-01-15"))
        .with_column(ColumnDefinition::new("Remote", DataType::Boolean).with_default("Yes"))
        .with_column(
            ColumnDefinition::new("Team", DataType::Text)
                .with_pattern("^[A-Z]{2,4}$")
                .with_default("OPS"),
        )
        .with_column(ColumnDefinition::new("Notes", DataType::Text));
    template.assign_column_ids();
    template
}

fn cell(row: u32, column_id: i64, value: &str) -> DecodedCell {
    DecodedCell {
        row,
        column_id,
        value: value.to_string(),
    }
}

#[test]
fn test_defaults_round_trip() -> TestResult {
    let template = onboarding_template();
    let bytes = TemplateGenerator::new().generate(&template)?;
    let sheet = WorkbookDecoder::new().decode(&bytes, &template)?;

    assert_eq!(sheet.sheet_name, "Template");
    assert_eq!(
        sheet.headers,
        vec!["Name", "Age", "Salary", "Start", "Remote", "Team", "Notes"]
    );
    assert_eq!(
        sheet.cells,
        vec![
            cell(2, 1, "Jane Doe"),
            cell(2, 2, "30"),
            cell(2, 3, "1250.5"),
            cell(2, 4, "2024-01-15"),
            cell(2, 5, "Yes"),
            cell(2, 6, "OPS"),
            cell(2, 7, ""),
        ]
    );

    for decoded in &sheet.cells {
        let column = template.column(decoded.column_id).ok_or("unknown column")?;
        assert!(
            validate_cell(&decoded.value, column).is_valid(),
            "{} rejected its own default {:?}",
            column.name,
            decoded.value
        );
    }
    Ok(())
}

#[test]
fn test_normalised_defaults_pass_format_rules_after_round_trip() -> TestResult {
    let mut template = TemplateDefinition::new("Ledger")
        .with_column(
            ColumnDefinition::new("Amount", DataType::Currency)
                .required()
                .with_max_length(6)
                .with_default("1,250.50"),
        )
        .with_column(
            ColumnDefinition::new("Booked", DataType::Date)
                .with_pattern(r"^\d{4}-\d{2}-\d{2}$")
                .with_default("2024-01-15 08:30:00"),
        )
        .with_column(
            ColumnDefinition::new("Units", DataType::Number)
                .with_pattern(r"^\d+$")
                .with_default("007"),
        );
    template.assign_column_ids();

    let bytes = TemplateGenerator::new().generate(&template)?;
    let sheet = WorkbookDecoder::new().decode(&bytes, &template)?;
    assert_eq!(
        sheet.cells,
        vec![
            cell(2, 1, "1250.5"),
            cell(2, 2, "2024-01-15"),
            cell(2, 3, "7"),
        ]
    );
    for decoded in &sheet.cells {
        let column = template.column(decoded.column_id).ok_or("unknown column")?;
        assert!(validate_cell(&decoded.value, column).is_valid());
    }

    let padded = TemplateDefinition::new("Codes").with_column(
        ColumnDefinition::new("Code", DataType::Number)
            .with_pattern(r"^\d{3}$")
            .with_default("007"),
    );
    assert!(TemplateGenerator::new().generate(&padded).is_err());
    Ok(())
}

#[test]
fn test_template_without_defaults_has_no_data_rows() -> TestResult {
    let mut template = TemplateDefinition::new("Blank")
        .with_column(ColumnDefinition::new("Name", DataType::Text).required())
        .with_column(ColumnDefinition::new("Age", DataType::Number).with_range(0.0, 120.0));
    template.assign_column_ids();

    let bytes = TemplateGenerator::new().generate(&template)?;
    let sheet = WorkbookDecoder::new().decode(&bytes, &template)?;

    assert_eq!(sheet.headers, vec!["Name", "Age"]);
    assert_eq!(sheet.row_count, 0);
    assert!(sheet.cells.is_empty());
    Ok(())
}

#[test]
fn test_ordinal_stability() -> TestResult {
    let template = onboarding_template();
    let mut shuffled = template.clone();
    shuffled.columns.reverse();

    let generator = TemplateGenerator::new();
    assert_eq!(generator.plan(&template)?, generator.plan(&template)?);
    assert_eq!(generator.plan(&template)?, generator.plan(&shuffled)?);

    let decoder = WorkbookDecoder::new();
    let first = decoder.decode(&generator.generate(&template)?, &template)?;
    let second = decoder.decode(&generator.generate(&shuffled)?, &shuffled)?;
    assert_eq!(first, second);

    let expected: Vec<String> = template
        .ordered_columns()
        .iter()
        .map(|c| c.name.clone())
        .collect();
    assert_eq!(first.headers, expected);
    Ok(())
}

#[test]
fn test_custom_sheet_name_round_trip() -> TestResult {
    let template = onboarding_template();
    let generator = TemplateGenerator::with_config(GeneratorConfig {
        sheet_name: "Intake".to_string(),
        data_row_limit: 200,
        freeze_header: true,
        ..GeneratorConfig::default()
    });
    let bytes = generator.generate(&template)?;

    let decoder = WorkbookDecoder::with_config(DecoderConfig {
        sheet_name: Some("Intake".to_string()),
        max_rows: None,
    });
    let sheet = decoder.decode(&bytes, &template)?;
    assert_eq!(sheet.sheet_name, "Intake");
    assert_eq!(sheet.row_count, 1);
    Ok(())
}

#[test]
fn test_disabled_prefill_round_trip() -> TestResult {
    let template = onboarding_template();
    let bytes = TemplateGenerator::new()
        .with_defaults(false)
        .with_validation(false)
        .generate(&template)?;
    let sheet = WorkbookDecoder::new().decode(&bytes, &template)?;
    assert_eq!(sheet.row_count, 0);
    assert_eq!(sheet.headers.len(), 7);
    Ok(())
}

#[test]
fn test_file_round_trip() -> TestResult {
    let temp_dir = tempfile::tempdir()?;
    let path = temp_dir.path().join("onboarding.xlsx");
    let template = onboarding_template();

    TemplateGenerator::new().generate_file(&template, &path)?;
    let sheet = WorkbookDecoder::new().decode_file(&path, &template)?;
    assert_eq!(sheet.cells[0], cell(2, 1, "Jane Doe"));
    Ok(())
}

#[tokio::test]
async fn test_generated_workbook_submits_clean() -> TestResult {
    let schemas = Arc::new(InMemorySchemaStore::new());
    let submissions = Arc::new(InMemorySubmissionStore::new());
    let template = schemas.create_template(onboarding_template()).await?;

    let bytes = TemplateGenerator::new().generate(&template)?;
    let assembler = SubmissionAssembler::new(schemas.clone(), submissions.clone())
        .with_config(&ServiceConfig::default());
    let result = assembler.submit(template.id, &bytes, "alice").await;

    assert!(result.is_valid, "unexpected errors: {:?}", result.errors);
    assert!(result.errors.is_empty());
    let uid = result.unique_identifier.ok_or("missing identifier")?;
    let record = submissions.get(&uid).await?.ok_or("record not stored")?;
    assert_eq!(record.status, SubmissionStatus::Validated);
    assert_eq!(record.cell_values.len(), 7);
    Ok(())
}
