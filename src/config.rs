// ⚙️ Configuration - static defaults, optional TOML file, environment overrides
// Later layers win: defaults < orgunits.toml < ORGUNITS_* variables

use crate::defaults;
use crate::error::ConfigError;
use crate::legacy::{LegacyLayout, UserRef};
use crate::model::{CommonMeta, SystemMeta, UnitDef};
use chrono::NaiveDateTime;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "orgunits.toml";
pub const ENV_PREFIX: &str = "ORGUNITS_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyConfig {
    pub input: PathBuf,
    pub ids: PathBuf,
    pub output: PathBuf,
    #[serde(flatten)]
    pub layout: LegacyLayout,
    pub common: CommonMeta,
    pub user: UserRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Fail the run when any row issue or conflicting duplicate is found
    pub strict: bool,
    pub system: SystemMeta,
    pub common: CommonMeta,
    pub country: UnitDef,
    pub regions: Vec<UnitDef>,
    pub legacy: LegacyConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            input: PathBuf::from("DATIM Facility Hierarchy and OUIDs Kenya.csv"),
            output: PathBuf::from("org_units_metadata.json"),
            strict: false,
            system: defaults::system_meta(),
            common: defaults::common_meta(),
            country: defaults::country(),
            regions: defaults::supported_regions(),
            legacy: LegacyConfig {
                input: PathBuf::from("facilities.csv"),
                ids: PathBuf::from("id.json"),
                output: PathBuf::from("generated_facility_metadata.json"),
                layout: LegacyLayout {
                    root_id: defaults::LEGACY_ROOT_ID.to_string(),
                    parents: BTreeMap::from([(
                        "Kajiado".to_string(),
                        defaults::LEGACY_KAJIADO_PARENT.to_string(),
                    )]),
                    fallback_parent: defaults::LEGACY_FALLBACK_PARENT.to_string(),
                },
                common: defaults::legacy_common_meta(),
                user: UserRef {
                    display_name: "Admin".to_string(),
                    name: "Admin".to_string(),
                    id: "bF8LjqfTQjJ".to_string(),
                    username: "admin".to_string(),
                },
            },
        }
    }
}

impl Config {
    /// Load from a TOML file (skipped when absent) and the environment.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment(path))
    }

    pub fn figment(path: impl AsRef<Path>) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_common("common", &self.common)?;
        check_common("legacy.common", &self.legacy.common)?;
        check_timestamp("system.date".to_string(), &self.system.date)?;

        let mut seen = HashSet::new();
        for region in &self.regions {
            if region.id == self.country.id {
                return Err(ConfigError::RegionIsCountry(region.id.clone()));
            }
            if !seen.insert(region.id.as_str()) {
                return Err(ConfigError::DuplicateRegion(region.id.clone()));
            }
        }
        Ok(())
    }
}

fn check_timestamp(field: String, value: &str) -> Result<(), ConfigError> {
    NaiveDateTime::parse_from_str(value, defaults::TIMESTAMP_FORMAT)
        .map(|_| ())
        .map_err(|source| ConfigError::Timestamp {
            field,
            value: value.to_string(),
            source,
        })
}

fn check_common(prefix: &str, common: &CommonMeta) -> Result<(), ConfigError> {
    check_timestamp(format!("{prefix}.created"), &common.created)?;
    check_timestamp(format!("{prefix}.last_updated"), &common.last_updated)?;
    check_timestamp(format!("{prefix}.opening_date"), &common.opening_date)
}
