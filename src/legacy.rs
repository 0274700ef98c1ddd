// 🗂️ Legacy Export - flat facility list under fixed county parents
// Every facility becomes a level-2 unit with an id drawn from a pre-fetched pool

use crate::hierarchy::join_path;
use crate::loader::FacilityRecord;
use crate::model::{CommonMeta, Level, OrgUnit, ParentRef};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// DHIS2 caps `shortName` at this many characters
pub const SHORT_NAME_LIMIT: usize = 24;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub display_name: String,
    pub name: String,
    pub id: String,
    pub username: String,
}

/// Org unit plus the audit fields the older import format carried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyOrgUnit {
    #[serde(flatten)]
    pub unit: OrgUnit,
    pub created_by: UserRef,
    pub last_updated_by: UserRef,
    pub attribute_values: Vec<serde_json::Value>,
    pub translations: Vec<serde_json::Value>,
}

/// Where facilities hang: one root, a parent per county name, a fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyLayout {
    pub root_id: String,
    /// County name → parent unit id
    pub parents: BTreeMap<String, String>,
    pub fallback_parent: String,
}

impl LegacyLayout {
    pub fn parent_for(&self, county: &str) -> &str {
        self.parents
            .get(county)
            .map(String::as_str)
            .unwrap_or(&self.fallback_parent)
    }
}

/// First `limit` characters, never splitting a character.
pub fn truncate_chars(s: &str, limit: usize) -> &str {
    match s.char_indices().nth(limit) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

pub fn facility_unit(
    facility: &FacilityRecord,
    id: &str,
    layout: &LegacyLayout,
    common: &CommonMeta,
    user: &UserRef,
) -> LegacyOrgUnit {
    let parent_id = layout.parent_for(&facility.county);
    LegacyOrgUnit {
        unit: OrgUnit {
            id: id.to_string(),
            level: Level::Region.as_u8(),
            name: facility.name.clone(),
            short_name: truncate_chars(&facility.name, SHORT_NAME_LIMIT).to_string(),
            description: facility.name.clone(),
            code: Some(facility.mfl_code.clone()),
            parent: Some(ParentRef {
                id: parent_id.to_string(),
            }),
            path: join_path(&[layout.root_id.as_str(), parent_id, id]),
            common: common.clone(),
        },
        created_by: user.clone(),
        last_updated_by: user.clone(),
        attribute_values: Vec::new(),
        translations: Vec::new(),
    }
}

/// Pair facilities with ids in order. Facilities beyond the end of the pool
/// are dropped.
pub fn build_facilities(
    facilities: &[FacilityRecord],
    ids: &[String],
    layout: &LegacyLayout,
    common: &CommonMeta,
    user: &UserRef,
) -> Vec<LegacyOrgUnit> {
    if ids.len() < facilities.len() {
        warn!(
            facilities = facilities.len(),
            ids = ids.len(),
            "id pool too small, dropping {} facilities",
            facilities.len() - ids.len()
        );
    }

    facilities
        .iter()
        .zip(ids)
        .map(|(facility, id)| facility_unit(facility, id, layout, common, user))
        .collect()
}
