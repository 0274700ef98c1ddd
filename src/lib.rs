// Org Unit Hierarchy Generator - Core Library
// Turns flat facility rows into DHIS2 organisation unit metadata

pub mod config;
pub mod defaults;
pub mod error;
pub mod hierarchy;
pub mod legacy;
pub mod loader;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod validation;

// Re-export commonly used types
pub use config::{Config, LegacyConfig};
pub use error::{ConfigError, LoadError, OutputError, PipelineError, ValidationFailed};
pub use hierarchy::{build, BuildReport, Hierarchy, HierarchyBuilder};
pub use legacy::{LegacyLayout, LegacyOrgUnit, UserRef};
pub use loader::{load_id_pool, load_legacy_facilities, load_rows, FacilityRecord};
pub use model::{CommonMeta, FlatRow, Level, OrgUnit, ParentRef, SystemMeta, UnitDef};
pub use output::{to_json_string, write_json, Document};
pub use pipeline::{run_hierarchy, run_legacy, RunSummary};
pub use validation::{Conflict, RowIssue, ValidationReport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
