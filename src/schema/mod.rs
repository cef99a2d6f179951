//! Column definitions and schema compatibility checks for LCA record sets.

use std::sync::{Arc, LazyLock};

use arrow::datatypes::{DataType, Field, Schema, SchemaRef};

pub const CASE_STATUS: &str = "CASE_STATUS";
pub const FULL_TIME_POSITION: &str = "FULL_TIME_POSITION";
pub const EMPLOYER_NAME: &str = "EMPLOYER_NAME";
pub const JOB_TITLE: &str = "JOB_TITLE";
pub const SOC_CODE: &str = "SOC_CODE";
pub const SOC_TITLE: &str = "SOC_TITLE";
pub const WAGE_RATE_OF_PAY_FROM: &str = "WAGE_RATE_OF_PAY_FROM";
pub const WAGE_UNIT_OF_PAY: &str = "WAGE_UNIT_OF_PAY";
pub const PREVAILING_WAGE: &str = "PREVAILING_WAGE";
pub const PW_UNIT_OF_PAY: &str = "PW_UNIT_OF_PAY";
pub const WORKSITE_STATE: &str = "WORKSITE_STATE";
pub const ANNUAL_WAGE: &str = "ANNUAL_WAGE";
pub const ANNUAL_PREVAILING_WAGE: &str = "ANNUAL_PREVAILING_WAGE";
pub const WAGE_RATIO: &str = "WAGE_RATIO";

/// Columns the pipeline cannot run without
pub const RAW_REQUIRED_COLUMNS: [&str; 9] = [
    CASE_STATUS,
    FULL_TIME_POSITION,
    EMPLOYER_NAME,
    SOC_CODE,
    WAGE_RATE_OF_PAY_FROM,
    WAGE_UNIT_OF_PAY,
    PREVAILING_WAGE,
    PW_UNIT_OF_PAY,
    WORKSITE_STATE,
];

/// Raw columns that are carried when present and left null otherwise
pub const RAW_OPTIONAL_COLUMNS: [&str; 2] = [JOB_TITLE, SOC_TITLE];

/// Raw wage columns; kept numeric when every cell in the extract is numeric
pub const WAGE_COLUMNS: [&str; 2] = [WAGE_RATE_OF_PAY_FROM, PREVAILING_WAGE];

/// Published columns of a processed record set, in storage order
pub const PUBLISHED_COLUMNS: [&str; 12] = [
    EMPLOYER_NAME,
    JOB_TITLE,
    SOC_CODE,
    SOC_TITLE,
    WAGE_RATE_OF_PAY_FROM,
    PREVAILING_WAGE,
    WAGE_UNIT_OF_PAY,
    PW_UNIT_OF_PAY,
    ANNUAL_WAGE,
    ANNUAL_PREVAILING_WAGE,
    WAGE_RATIO,
    WORKSITE_STATE,
];

/// Published columns that must be non-null and non-empty on every record
pub const REQUIRED_NON_EMPTY: [&str; 3] = [EMPLOYER_NAME, SOC_CODE, WORKSITE_STATE];

static PROCESSED_SCHEMA: LazyLock<SchemaRef> = LazyLock::new(|| {
    let fields = PUBLISHED_COLUMNS
        .iter()
        .map(|name| Field::new(*name, published_type(name), true))
        .collect::<Vec<_>>();
    Arc::new(Schema::new(fields))
});

/// Arrow type of a published column
#[must_use]
pub fn published_type(column: &str) -> DataType {
    match column {
        WAGE_RATE_OF_PAY_FROM | PREVAILING_WAGE | ANNUAL_WAGE | ANNUAL_PREVAILING_WAGE
        | WAGE_RATIO => DataType::Float64,
        _ => DataType::Utf8,
    }
}

/// Arrow schema of the processed store
///
/// Every field is nullable at the Arrow level: non-nullness of the required
/// columns is a validation rule, so a bad record set fails validation instead
/// of failing to build.
#[must_use]
pub fn processed_schema() -> SchemaRef {
    PROCESSED_SCHEMA.clone()
}

/// Result of comparing a record set's schema to the columns a stage expects
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaCompatibilityReport {
    /// Whether the schema satisfies every expectation
    pub compatible: bool,
    /// List of incompatibility issues, if any
    pub issues: Vec<SchemaIssue>,
}

/// A schema compatibility issue
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaIssue {
    /// Column is absent
    MissingColumn(String),
    /// Column is present with the wrong Arrow type
    TypeMismatch {
        column: String,
        expected: DataType,
        actual: DataType,
    },
}

impl std::fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingColumn(column) => write!(f, "missing column '{column}'"),
            Self::TypeMismatch {
                column,
                expected,
                actual,
            } => write!(f, "column '{column}' is {actual:?}, expected {expected:?}"),
        }
    }
}

/// Check that every named column exists in `schema`
#[must_use]
pub fn check_required_columns(schema: &Schema, columns: &[&str]) -> SchemaCompatibilityReport {
    let issues = columns
        .iter()
        .filter(|name| schema.index_of(name).is_err())
        .map(|name| SchemaIssue::MissingColumn((*name).to_string()))
        .collect::<Vec<_>>();

    SchemaCompatibilityReport {
        compatible: issues.is_empty(),
        issues,
    }
}

/// Check that `schema` carries every published column with its published type
#[must_use]
pub fn check_processed_schema(schema: &Schema) -> SchemaCompatibilityReport {
    let mut issues = Vec::new();
    for name in PUBLISHED_COLUMNS {
        match schema.field_with_name(name) {
            Err(_) => issues.push(SchemaIssue::MissingColumn(name.to_string())),
            Ok(field) => {
                let expected = published_type(name);
                if !types_compatible(field.data_type(), &expected) {
                    issues.push(SchemaIssue::TypeMismatch {
                        column: name.to_string(),
                        expected,
                        actual: field.data_type().clone(),
                    });
                }
            }
        }
    }

    SchemaCompatibilityReport {
        compatible: issues.is_empty(),
        issues,
    }
}

/// String columns written by other tools may come back as `LargeUtf8`
fn types_compatible(actual: &DataType, expected: &DataType) -> bool {
    actual == expected
        || matches!(
            (actual, expected),
            (DataType::LargeUtf8 | DataType::Utf8View, DataType::Utf8)
        )
}
