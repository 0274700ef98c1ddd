// 📌 Static identifiers for the Fahari ya Jamii DHIS2 instance
// These seed the configuration defaults; any of them can be overridden at load time

use crate::model::{CommonMeta, SystemMeta, UnitDef};
use uuid::Uuid;

pub const COUNTRY_ID: &str = "HfVjCurKxh2";

/// DHIS2 timestamp layout used by every date field in the import file
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

pub fn common_meta() -> CommonMeta {
    CommonMeta {
        created: "2021-09-13T12:02:16.925".to_string(),
        last_updated: "2021-09-13T18:51:24.461".to_string(),
        opening_date: "2021-04-23T00:00:00.000".to_string(),
    }
}

pub fn country() -> UnitDef {
    UnitDef::new(COUNTRY_ID, "Kenya", "Kenya", "KEN").with_description("The country Kenya")
}

/// Counties (PSNUs) the hierarchy is generated for, in output order.
pub fn supported_regions() -> Vec<UnitDef> {
    vec![
        UnitDef::new(
            "iO2edHMzzoa",
            "Kajiado County",
            "Kajiado County",
            "ke2riftvalleykajiado",
        ),
        UnitDef::new(
            "DW4iKNGrY42",
            "Nairobi County",
            "Nairobi County",
            "ke2nairobinairobicounty",
        ),
    ]
}

pub fn system_meta() -> SystemMeta {
    SystemMeta {
        id: Uuid::from_u128(0xcb1409e9_4d51_4689_bbfd_1b7a3eb17d4a),
        rev: "a95cf40".to_string(),
        version: "2.36.3".to_string(),
        date: "2021-09-17T07:57:56.876".to_string(),
    }
}

// ============================================================================
// LEGACY FLAT FACILITY EXPORT
// ============================================================================

pub const LEGACY_ROOT_ID: &str = "YoEaChfYlbo";
pub const LEGACY_KAJIADO_PARENT: &str = "DsIxJvZplZz";
pub const LEGACY_FALLBACK_PARENT: &str = "ERlzhW0dJw9";

pub fn legacy_common_meta() -> CommonMeta {
    CommonMeta {
        created: "2021-09-13T18:54:59.224".to_string(),
        last_updated: "2021-09-13T18:54:59.249".to_string(),
        opening_date: "2021-04-23T00:00:00.000".to_string(),
    }
}
