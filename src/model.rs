// 🧱 Data Model - flat input rows and org unit records
// Input mirrors the hierarchy spreadsheet export, output mirrors the DHIS2 metadata schema

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// INPUT
// ============================================================================

/// One row of the facility hierarchy export.
///
/// Every column defaults to the empty string so a short or malformed row
/// still loads; validation decides what to do with it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlatRow {
    #[serde(rename = "County")]
    pub county: String,

    #[serde(rename = "County_Code")]
    pub county_code: String,

    #[serde(rename = "County_OUID")]
    pub county_id: String,

    #[serde(rename = "Sub_County")]
    pub sub_county: String,

    #[serde(rename = "Sub_County_OUID")]
    pub sub_county_id: String,

    #[serde(rename = "Ward")]
    pub ward: String,

    #[serde(rename = "Ward_OUID")]
    pub ward_id: String,

    #[serde(rename = "Facility")]
    pub facility: String,

    #[serde(rename = "Facility_OUID")]
    pub facility_id: String,

    /// Kenya Master Facility List code
    #[serde(rename = "MFL_Code")]
    pub mfl_code: String,
}

/// A pre-defined unit: the country root or one of the supported regions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitDef {
    pub id: String,
    pub name: String,
    pub short_name: String,
    /// Falls back to `name` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub code: String,
}

impl UnitDef {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        short_name: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        UnitDef {
            id: id.into(),
            name: name.into(),
            short_name: short_name.into(),
            description: None,
            code: code.into(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or(&self.name)
    }
}

// ============================================================================
// OUTPUT
// ============================================================================

/// Timestamps shared by every emitted unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonMeta {
    pub created: String,
    pub last_updated: String,
    pub opening_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRef {
    pub id: String,
}

/// Hierarchy depth of an org unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Country = 1,
    Region = 2,
    SubRegion = 3,
    Ward = 4,
    Facility = 5,
}

impl Level {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Level::Country => "country",
            Level::Region => "region",
            Level::SubRegion => "sub-region",
            Level::Ward => "ward",
            Level::Facility => "facility",
        }
    }
}

impl Serialize for Level {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// One organisation unit as written to the metadata import file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgUnit {
    pub id: String,
    pub level: u8,
    pub name: String,
    pub short_name: String,
    pub description: String,
    pub code: Option<String>,
    pub parent: Option<ParentRef>,
    pub path: String,
    #[serde(flatten)]
    pub common: CommonMeta,
}

impl OrgUnit {
    pub fn parent_id(&self) -> Option<&str> {
        self.parent.as_ref().map(|p| p.id.as_str())
    }
}

/// Identifies the DHIS2 instance the metadata was exported for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemMeta {
    pub id: Uuid,
    pub rev: String,
    pub version: String,
    pub date: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_def_description_falls_back_to_name() {
        let def = UnitDef::new("iO2edHMzzoa", "Kajiado County", "Kajiado County", "ke2");
        assert_eq!(def.description(), "Kajiado County");

        let def = def.with_description("The county of Kajiado");
        assert_eq!(def.description(), "The county of Kajiado");
    }

    #[test]
    fn test_org_unit_serializes_camel_case_and_nulls() {
        let unit = OrgUnit {
            id: "S1".to_string(),
            level: Level::SubRegion.as_u8(),
            name: "Sub".to_string(),
            short_name: "Sub".to_string(),
            description: "Sub".to_string(),
            code: None,
            parent: Some(ParentRef { id: "R1".to_string() }),
            path: "/C/R1/S1".to_string(),
            common: CommonMeta {
                created: "2021-09-13T12:02:16.925".to_string(),
                last_updated: "2021-09-13T18:51:24.461".to_string(),
                opening_date: "2021-04-23T00:00:00.000".to_string(),
            },
        };

        let value = serde_json::to_value(&unit).unwrap();
        assert_eq!(value["shortName"], "Sub");
        assert_eq!(value["code"], serde_json::Value::Null);
        assert_eq!(value["parent"]["id"], "R1");
        assert_eq!(value["openingDate"], "2021-04-23T00:00:00.000");
        assert_eq!(value["level"], 3);
    }

    #[test]
    fn test_flat_row_missing_columns_default_to_empty() {
        let data = "County,County_OUID,Facility\nKajiado,iO2edHMzzoa,Ngong Clinic\n";
        let mut rdr = csv::Reader::from_reader(data.as_bytes());
        let row: FlatRow = rdr.deserialize().next().unwrap().unwrap();

        assert_eq!(row.county, "Kajiado");
        assert_eq!(row.facility, "Ngong Clinic");
        assert_eq!(row.ward_id, "");
        assert_eq!(row.mfl_code, "");
    }
}
