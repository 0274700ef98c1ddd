// 📂 Loader - CSV rows and pre-fetched id pools
// A missing input file is fatal before anything is processed

use crate::error::LoadError;
use crate::model::FlatRow;
use serde::{de::DeserializeOwned, Deserialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// Fail early with a clear message when the input is not a regular file.
pub fn ensure_file(path: &Path) -> Result<(), LoadError> {
    if !path.is_file() {
        return Err(LoadError::MissingInput(path.to_path_buf()));
    }
    Ok(())
}

fn load_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, LoadError> {
    ensure_file(path)?;
    let csv_err = |source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(csv_err)?;

    let mut records = Vec::new();
    for result in rdr.deserialize() {
        records.push(result.map_err(csv_err)?);
    }
    Ok(records)
}

/// Load the facility hierarchy export.
pub fn load_rows(path: &Path) -> Result<Vec<FlatRow>, LoadError> {
    let rows: Vec<FlatRow> = load_csv(path)?;
    info!(path = %path.display(), rows = rows.len(), "loaded hierarchy rows");
    Ok(rows)
}

// ============================================================================
// LEGACY INPUTS
// ============================================================================

/// One row of the older flat facility list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FacilityRecord {
    pub county: String,
    pub mfl_code: String,
    pub name: String,
}

pub fn load_legacy_facilities(path: &Path) -> Result<Vec<FacilityRecord>, LoadError> {
    let facilities: Vec<FacilityRecord> = load_csv(path)?;
    info!(path = %path.display(), facilities = facilities.len(), "loaded facility list");
    Ok(facilities)
}

/// Body of a DHIS2 `/api/system/id.json` response.
#[derive(Debug, Deserialize)]
struct IdPool {
    codes: Vec<String>,
}

/// Read ids previously generated by the DHIS2 instance.
pub fn load_id_pool(path: &Path) -> Result<Vec<String>, LoadError> {
    ensure_file(path)?;
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let pool: IdPool =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| LoadError::IdPool {
            path: path.to_path_buf(),
            source,
        })?;
    info!(path = %path.display(), ids = pool.codes.len(), "loaded id pool");
    Ok(pool.codes)
}
