// 🚚 Pipeline - load → build → validate → write
// One function per export kind; the binary just picks one

use crate::config::Config;
use crate::error::PipelineError;
use crate::hierarchy::{BuildReport, HierarchyBuilder};
use crate::legacy::build_facilities;
use crate::loader::{load_id_pool, load_legacy_facilities, load_rows};
use crate::output::{write_json, Document};
use tracing::info;

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub units: usize,
    pub sha256: String,
    /// Present for hierarchy runs
    pub report: Option<BuildReport>,
}

/// Build the full five-level hierarchy document.
///
/// Validation findings are logged either way; in strict mode they fail the
/// run after every row has been examined and nothing is written.
pub fn run_hierarchy(config: &Config) -> Result<RunSummary, PipelineError> {
    let rows = load_rows(&config.input)?;

    let hierarchy =
        HierarchyBuilder::new(&config.country, &config.regions, &config.common).build(rows);
    let report = hierarchy.report;
    info!("{}", report.summary());

    report.validation.log();
    let validation = report.validation.clone().into_result(config.strict)?;
    if !validation.is_clean() {
        info!("continuing with {}", validation.summary());
    }

    let document = Document {
        system: config.system.clone(),
        organisation_units: hierarchy.units,
    };
    let sha256 = write_json(&config.output, &document)?;

    Ok(RunSummary {
        units: document.organisation_units.len(),
        sha256,
        report: Some(report),
    })
}

/// Write the older flat facility list.
pub fn run_legacy(config: &Config) -> Result<RunSummary, PipelineError> {
    let legacy = &config.legacy;
    let facilities = load_legacy_facilities(&legacy.input)?;
    let ids = load_id_pool(&legacy.ids)?;

    let units = build_facilities(
        &facilities,
        &ids,
        &legacy.layout,
        &legacy.common,
        &legacy.user,
    );
    let sha256 = write_json(&legacy.output, &units)?;

    Ok(RunSummary {
        units: units.len(),
        sha256,
        report: None,
    })
}
