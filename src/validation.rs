// ✅ Validation - malformed rows and conflicting duplicates
// Everything is collected over the whole run and reported once at the end

use crate::error::ValidationFailed;
use crate::model::{FlatRow, Level};
use serde::Serialize;
use tracing::warn;

// ============================================================================
// ROW ISSUES
// ============================================================================

/// A required column that is empty on a supported row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowIssue {
    /// 1-based data row number (header excluded)
    pub row: usize,
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for RowIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "row {}: {}: {}", self.row, self.field, self.message)
    }
}

/// A repeated id whose descriptive data differs from the row that introduced it.
/// The first row's data is what ends up in the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub row: usize,
    pub first_row: usize,
    pub level: Level,
    pub id: String,
    pub kept_name: String,
    pub ignored_name: String,
    pub kept_parent: String,
    pub ignored_parent: String,
}

impl std::fmt::Display for Conflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "row {}: {} {} already defined by row {} as {:?} under {}, ignoring {:?} under {}",
            self.row,
            self.level.name(),
            self.id,
            self.first_row,
            self.kept_name,
            self.kept_parent,
            self.ignored_name,
            self.ignored_parent,
        )
    }
}

/// Check the columns the builder relies on. Region columns are not checked
/// here because unsupported regions are filtered before validation.
pub fn validate_row(row_number: usize, row: &FlatRow) -> Vec<RowIssue> {
    let required: [(&'static str, &str); 7] = [
        ("Sub_County_OUID", row.sub_county_id.as_str()),
        ("Sub_County", row.sub_county.as_str()),
        ("Ward_OUID", row.ward_id.as_str()),
        ("Ward", row.ward.as_str()),
        ("Facility_OUID", row.facility_id.as_str()),
        ("Facility", row.facility.as_str()),
        ("MFL_Code", row.mfl_code.as_str()),
    ];

    required
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|&(field, _)| RowIssue {
            row: row_number,
            field,
            message: "Required field is empty".to_string(),
        })
        .collect()
}

// ============================================================================
// REPORT
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<RowIssue>,
    pub conflicts: Vec<Conflict>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty() && self.conflicts.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} row issue(s), {} conflicting duplicate(s)",
            self.issues.len(),
            self.conflicts.len()
        )
    }

    pub fn log(&self) {
        for issue in &self.issues {
            warn!(row = issue.row, field = issue.field, "{}", issue.message);
        }
        for conflict in &self.conflicts {
            warn!(
                row = conflict.row,
                level = conflict.level.name(),
                id = %conflict.id,
                "{conflict}"
            );
        }
    }

    /// In strict mode any finding fails the run; otherwise findings are only logged.
    pub fn into_result(self, strict: bool) -> Result<ValidationReport, ValidationFailed> {
        if strict && !self.is_clean() {
            return Err(ValidationFailed {
                issues: self.issues.len(),
                conflicts: self.conflicts.len(),
            });
        }
        Ok(self)
    }
}
