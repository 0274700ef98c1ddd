// 🌳 Hierarchy Builder - flat facility rows → 5-level org unit tree
// country → region → sub-region → ward → facility, each intermediate unit emitted once

use crate::model::{CommonMeta, FlatRow, Level, OrgUnit, ParentRef, UnitDef};
use crate::validation::{validate_row, Conflict, ValidationReport};
use std::collections::{HashMap, HashSet};
use tracing::debug;

// ============================================================================
// NODE FACTORIES
// ============================================================================

/// `/a/b/c` from the ancestor ids, root first.
pub fn join_path(ids: &[&str]) -> String {
    let mut path = String::new();
    for id in ids {
        path.push('/');
        path.push_str(id);
    }
    path
}

fn parent(id: &str) -> Option<ParentRef> {
    Some(ParentRef { id: id.to_string() })
}

pub fn country_unit(def: &UnitDef, common: &CommonMeta) -> OrgUnit {
    OrgUnit {
        id: def.id.clone(),
        level: Level::Country.as_u8(),
        name: def.name.clone(),
        short_name: def.short_name.clone(),
        description: def.description().to_string(),
        code: Some(def.code.clone()),
        parent: None,
        path: join_path(&[def.id.as_str()]),
        common: common.clone(),
    }
}

pub fn region_unit(def: &UnitDef, country_id: &str, common: &CommonMeta) -> OrgUnit {
    OrgUnit {
        id: def.id.clone(),
        level: Level::Region.as_u8(),
        name: def.name.clone(),
        short_name: def.short_name.clone(),
        description: def.description().to_string(),
        code: Some(def.code.clone()),
        parent: parent(country_id),
        path: join_path(&[country_id, def.id.as_str()]),
        common: common.clone(),
    }
}

/// `parent_path` is the path of the node the child is actually placed under.
fn child_path(parent_path: &str, id: &str) -> String {
    format!("{parent_path}/{id}")
}

pub fn sub_region_unit(row: &FlatRow, parent_path: &str, common: &CommonMeta) -> OrgUnit {
    OrgUnit {
        id: row.sub_county_id.clone(),
        level: Level::SubRegion.as_u8(),
        name: row.sub_county.clone(),
        short_name: row.sub_county.clone(),
        description: row.sub_county.clone(),
        code: None,
        parent: parent(&row.county_id),
        path: child_path(parent_path, &row.sub_county_id),
        common: common.clone(),
    }
}

pub fn ward_unit(row: &FlatRow, parent_path: &str, common: &CommonMeta) -> OrgUnit {
    OrgUnit {
        id: row.ward_id.clone(),
        level: Level::Ward.as_u8(),
        name: row.ward.clone(),
        short_name: row.ward.clone(),
        description: row.ward.clone(),
        code: None,
        parent: parent(&row.sub_county_id),
        path: child_path(parent_path, &row.ward_id),
        common: common.clone(),
    }
}

pub fn facility_unit(row: &FlatRow, parent_path: &str, common: &CommonMeta) -> OrgUnit {
    OrgUnit {
        id: row.facility_id.clone(),
        level: Level::Facility.as_u8(),
        name: row.facility.clone(),
        short_name: row.facility.clone(),
        description: row.facility.clone(),
        code: Some(row.mfl_code.clone()),
        parent: parent(&row.ward_id),
        path: child_path(parent_path, &row.facility_id),
        common: common.clone(),
    }
}

// ============================================================================
// BUILD RESULT
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub rows_read: usize,
    /// Rows whose region is not one of the supported regions
    pub rows_skipped: usize,
    pub sub_regions: usize,
    pub wards: usize,
    pub facilities: usize,
    pub validation: ValidationReport,
}

impl BuildReport {
    pub fn summary(&self) -> String {
        format!(
            "{} rows read ({} skipped): {} sub-regions, {} wards, {} facilities",
            self.rows_read, self.rows_skipped, self.sub_regions, self.wards, self.facilities
        )
    }
}

/// The finished tree, flattened in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hierarchy {
    pub units: Vec<OrgUnit>,
    pub report: BuildReport,
}

// ============================================================================
// BUILDER
// ============================================================================

/// Where an id was first seen: its row and its index in the output.
#[derive(Debug, Clone, Copy)]
struct FirstSeen {
    row: usize,
    index: usize,
}

type SeenIds = HashMap<String, FirstSeen>;

/// Per-call state: the output so far plus one seen-map per deduplicated level.
struct BuildState {
    units: Vec<OrgUnit>,
    /// Supported regions, never extended by rows
    regions: SeenIds,
    sub_regions: SeenIds,
    wards: SeenIds,
    facilities: SeenIds,
    report: BuildReport,
}

impl BuildState {
    fn seen(&mut self, level: Level) -> &mut SeenIds {
        match level {
            Level::SubRegion => &mut self.sub_regions,
            Level::Ward => &mut self.wards,
            Level::Facility => &mut self.facilities,
            Level::Country | Level::Region => {
                unreachable!("{} units are not deduplicated", level.name())
            }
        }
    }

    /// Path of the already emitted unit `parent_id` one level above `level`.
    /// First-write-wins fixes where that parent sits, so children follow it.
    fn parent_path(&self, level: Level, parent_id: &str) -> String {
        let parents = match level {
            Level::SubRegion => &self.regions,
            Level::Ward => &self.sub_regions,
            Level::Facility => &self.wards,
            Level::Country | Level::Region => {
                unreachable!("{} units have fixed parents", level.name())
            }
        };
        // the parent was handled earlier in the same row
        parents
            .get(parent_id)
            .map(|first| self.units[first.index].path.clone())
            .unwrap_or_default()
    }

    /// Emit the node built by `make` unless `id` was already emitted at this
    /// level. A repeat with different name or parent is recorded as a conflict
    /// and otherwise ignored.
    fn emit_once(
        &mut self,
        row_number: usize,
        level: Level,
        id: &str,
        name: &str,
        parent_id: &str,
        make: impl FnOnce(&str) -> OrgUnit,
    ) {
        let first = self.seen(level).get(id).copied();
        if let Some(first) = first {
            let kept = &self.units[first.index];
            let kept_parent = kept.parent_id().unwrap_or_default();
            if kept.name != name || kept_parent != parent_id {
                let conflict = Conflict {
                    row: row_number,
                    first_row: first.row,
                    level,
                    id: id.to_string(),
                    kept_name: kept.name.clone(),
                    ignored_name: name.to_string(),
                    kept_parent: kept_parent.to_string(),
                    ignored_parent: parent_id.to_string(),
                };
                self.report.validation.conflicts.push(conflict);
            }
            return;
        }

        let parent_path = self.parent_path(level, parent_id);
        let index = self.units.len();
        self.seen(level).insert(
            id.to_string(),
            FirstSeen {
                row: row_number,
                index,
            },
        );
        self.units.push(make(&parent_path));
        match level {
            Level::SubRegion => self.report.sub_regions += 1,
            Level::Ward => self.report.wards += 1,
            Level::Facility => self.report.facilities += 1,
            Level::Country | Level::Region => {
                unreachable!("{} units are not counted", level.name())
            }
        }
    }
}

/// Builds the org unit list for one country and its supported regions.
pub struct HierarchyBuilder<'a> {
    country: &'a UnitDef,
    regions: &'a [UnitDef],
    common: &'a CommonMeta,
}

impl<'a> HierarchyBuilder<'a> {
    pub fn new(country: &'a UnitDef, regions: &'a [UnitDef], common: &'a CommonMeta) -> Self {
        HierarchyBuilder {
            country,
            regions,
            common,
        }
    }

    /// Single pass over `rows` in source order.
    ///
    /// Output order: the country, the regions as supplied, then sub-region,
    /// ward and facility nodes interleaved in first-seen order. Rows outside
    /// the supported regions are skipped. The first row to mention an id
    /// decides that node's fields.
    pub fn build<I>(&self, rows: I) -> Hierarchy
    where
        I: IntoIterator<Item = FlatRow>,
    {
        let country_id = self.country.id.as_str();
        let supported: HashSet<&str> = self.regions.iter().map(|r| r.id.as_str()).collect();

        let mut state = BuildState {
            units: Vec::with_capacity(1 + self.regions.len()),
            regions: SeenIds::new(),
            sub_regions: SeenIds::new(),
            wards: SeenIds::new(),
            facilities: SeenIds::new(),
            report: BuildReport::default(),
        };

        state.units.push(country_unit(self.country, self.common));
        for region in self.regions {
            let first = FirstSeen {
                row: 0,
                index: state.units.len(),
            };
            state.regions.insert(region.id.clone(), first);
            state.units.push(region_unit(region, country_id, self.common));
        }

        for (index, row) in rows.into_iter().enumerate() {
            let row_number = index + 1;
            state.report.rows_read += 1;

            if !supported.contains(row.county_id.as_str()) {
                debug!(
                    row = row_number,
                    county_id = %row.county_id,
                    "skipping row outside supported regions"
                );
                state.report.rows_skipped += 1;
                continue;
            }

            let issues = validate_row(row_number, &row);
            state.report.validation.issues.extend(issues);

            state.emit_once(
                row_number,
                Level::SubRegion,
                row.sub_county_id.as_str(),
                &row.sub_county,
                row.county_id.as_str(),
                |path| sub_region_unit(&row, path, self.common),
            );
            state.emit_once(
                row_number,
                Level::Ward,
                row.ward_id.as_str(),
                &row.ward,
                row.sub_county_id.as_str(),
                |path| ward_unit(&row, path, self.common),
            );
            state.emit_once(
                row_number,
                Level::Facility,
                row.facility_id.as_str(),
                &row.facility,
                row.ward_id.as_str(),
                |path| facility_unit(&row, path, self.common),
            );
        }

        Hierarchy {
            units: state.units,
            report: state.report,
        }
    }
}

/// Build with the default country and timestamps.
pub fn build<I>(rows: I, regions: &[UnitDef]) -> Vec<OrgUnit>
where
    I: IntoIterator<Item = FlatRow>,
{
    let country = crate::defaults::country();
    let common = crate::defaults::common_meta();
    HierarchyBuilder::new(&country, regions, &common)
        .build(rows)
        .units
}

#[cfg(test)]
mod tests {
    use super::*;

    fn common() -> CommonMeta {
        crate::defaults::common_meta()
    }

    fn country() -> UnitDef {
        UnitDef::new("C", "Kenya", "Kenya", "KEN")
    }

    fn region(id: &str) -> UnitDef {
        UnitDef::new(id, format!("{id} County"), format!("{id} County"), id.to_lowercase())
    }

    fn row(region: &str, sub: &str, ward: &str, fac: &str, code: &str) -> FlatRow {
        FlatRow {
            county: format!("{region} County"),
            county_code: region.to_lowercase(),
            county_id: region.to_string(),
            sub_county: format!("{sub} name"),
            sub_county_id: sub.to_string(),
            ward: format!("{ward} name"),
            ward_id: ward.to_string(),
            facility: format!("{fac} name"),
            facility_id: fac.to_string(),
            mfl_code: code.to_string(),
        }
    }

    fn build_with(rows: Vec<FlatRow>, regions: &[UnitDef]) -> Hierarchy {
        let country = country();
        let common = common();
        HierarchyBuilder::new(&country, regions, &common).build(rows)
    }

    fn ids(units: &[OrgUnit]) -> Vec<&str> {
        units.iter().map(|u| u.id.as_str()).collect()
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path(&["C"]), "/C");
        assert_eq!(join_path(&["C", "R1", "S1"]), "/C/R1/S1");
        assert_eq!(join_path(&[]), "");
    }

    #[test]
    fn test_two_rows_sharing_sub_region() {
        let rows = vec![
            row("R1", "S1", "W1", "F1", "C1"),
            row("R1", "S1", "W2", "F2", "C2"),
        ];
        let hierarchy = build_with(rows, &[region("R1")]);
        let units = &hierarchy.units;

        assert_eq!(ids(units), vec!["C", "R1", "S1", "W1", "F1", "W2", "F2"]);
        assert_eq!(units[2].parent_id(), Some("R1"));
        assert_eq!(units[3].parent_id(), Some("S1"));
        assert_eq!(units[4].parent_id(), Some("W1"));
        assert_eq!(units[4].code.as_deref(), Some("C1"));
        assert_eq!(units[5].parent_id(), Some("S1"));
        assert_eq!(units[6].parent_id(), Some("W2"));
        assert_eq!(units[6].code.as_deref(), Some("C2"));
        assert_eq!(units[6].path, "/C/R1/S1/W2/F2");
    }

    #[test]
    fn test_zero_rows_yields_country_and_regions() {
        let regions = [region("R1"), region("R2"), region("R3")];
        let hierarchy = build_with(Vec::new(), &regions);

        assert_eq!(ids(&hierarchy.units), vec!["C", "R1", "R2", "R3"]);
        assert_eq!(hierarchy.report.rows_read, 0);
        assert!(hierarchy.report.validation.is_clean());
    }

    #[test]
    fn test_country_and_region_fields() {
        let regions = [region("R2"), region("R1")];
        let hierarchy = build_with(Vec::new(), &regions);
        let country = &hierarchy.units[0];

        assert_eq!(country.level, 1);
        assert_eq!(country.parent, None);
        assert_eq!(country.path, "/C");
        assert_eq!(country.code.as_deref(), Some("KEN"));

        // supplied order, not sorted
        assert_eq!(hierarchy.units[1].id, "R2");
        assert_eq!(hierarchy.units[1].level, 2);
        assert_eq!(hierarchy.units[1].path, "/C/R2");
        assert_eq!(hierarchy.units[1].parent_id(), Some("C"));
        assert_eq!(hierarchy.units[1].code.as_deref(), Some("r2"));
    }

    #[test]
    fn test_intermediate_levels_have_no_code() {
        let hierarchy = build_with(vec![row("R1", "S1", "W1", "F1", "C1")], &[region("R1")]);

        assert_eq!(hierarchy.units[2].code, None);
        assert_eq!(hierarchy.units[3].code, None);
        assert_eq!(hierarchy.units[2].name, "S1 name");
        assert_eq!(hierarchy.units[3].short_name, "W1 name");
        assert_eq!(hierarchy.units[4].description, "F1 name");
    }

    #[test]
    fn test_first_seen_ward_name_wins() {
        let first = row("R1", "S1", "W1", "F1", "C1");
        let mut second = row("R1", "S1", "W1", "F2", "C2");
        second.ward = "Renamed ward".to_string();

        let hierarchy = build_with(vec![first, second], &[region("R1")]);
        let wards: Vec<&OrgUnit> = hierarchy.units.iter().filter(|u| u.level == 4).collect();

        assert_eq!(wards.len(), 1);
        assert_eq!(wards[0].name, "W1 name");

        let conflicts = &hierarchy.report.validation.conflicts;
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].row, 2);
        assert_eq!(conflicts[0].first_row, 1);
        assert_eq!(conflicts[0].level, Level::Ward);
        assert_eq!(conflicts[0].ignored_name, "Renamed ward");
    }

    #[test]
    fn test_identical_repeats_are_not_conflicts() {
        let rows = vec![
            row("R1", "S1", "W1", "F1", "C1"),
            row("R1", "S1", "W1", "F1", "C1"),
        ];
        let hierarchy = build_with(rows, &[region("R1")]);

        assert_eq!(hierarchy.units.len(), 5);
        assert!(hierarchy.report.validation.conflicts.is_empty());
    }

    #[test]
    fn test_reparented_ward_is_a_conflict() {
        let rows = vec![
            row("R1", "S1", "W1", "F1", "C1"),
            row("R1", "S2", "W1", "F2", "C2"),
        ];
        let hierarchy = build_with(rows, &[region("R1")]);

        assert_eq!(ids(&hierarchy.units), vec!["C", "R1", "S1", "W1", "F1", "S2", "F2"]);
        let conflict = &hierarchy.report.validation.conflicts[0];
        assert_eq!(conflict.kept_parent, "S1");
        assert_eq!(conflict.ignored_parent, "S2");
    }

    #[test]
    fn test_paths_follow_kept_parent_on_conflict() {
        let rows = vec![
            row("R1", "S1", "W1", "F1", "C1"),
            // S1 claimed by another region: S1 stays under R1, W2 goes under that S1
            row("R2", "S1", "W2", "F2", "C2"),
            // W1 claimed by another sub-region: F3 goes under the kept W1
            row("R1", "S3", "W1", "F3", "C3"),
        ];
        let hierarchy = build_with(rows, &[region("R1"), region("R2")]);
        let by_id: HashMap<&str, &OrgUnit> =
            hierarchy.units.iter().map(|u| (u.id.as_str(), u)).collect();

        assert_eq!(by_id["S1"].path, "/C/R1/S1");
        assert_eq!(by_id["W2"].path, "/C/R1/S1/W2");
        assert_eq!(by_id["F2"].path, "/C/R1/S1/W2/F2");
        assert_eq!(by_id["F3"].path, "/C/R1/S1/W1/F3");

        for unit in &hierarchy.units[1..] {
            let parent = by_id[unit.parent_id().unwrap()];
            assert_eq!(unit.level, parent.level + 1);
            assert_eq!(unit.path, format!("{}/{}", parent.path, unit.id));
        }
        assert_eq!(hierarchy.report.validation.conflicts.len(), 2);
    }

    #[test]
    fn test_unsupported_region_rows_are_skipped() {
        let rows = vec![
            row("R9", "S9", "W9", "F9", "C9"),
            row("R1", "S1", "W1", "F1", "C1"),
        ];
        let hierarchy = build_with(rows, &[region("R1")]);

        assert_eq!(ids(&hierarchy.units), vec!["C", "R1", "S1", "W1", "F1"]);
        assert_eq!(hierarchy.report.rows_read, 2);
        assert_eq!(hierarchy.report.rows_skipped, 1);
    }

    #[test]
    fn test_skipped_rows_are_not_validated() {
        let mut unsupported = FlatRow::default();
        unsupported.county_id = "elsewhere".to_string();

        let hierarchy = build_with(vec![unsupported], &[region("R1")]);
        assert!(hierarchy.report.validation.issues.is_empty());
    }

    #[test]
    fn test_empty_ids_propagate_into_output() {
        let mut broken = row("R1", "S1", "W1", "F1", "C1");
        broken.ward_id = String::new();

        let hierarchy = build_with(vec![broken], &[region("R1")]);

        assert_eq!(hierarchy.units[3].id, "");
        assert_eq!(hierarchy.units[4].path, "/C/R1/S1//F1");
        assert_eq!(hierarchy.report.validation.issues.len(), 1);
        assert_eq!(hierarchy.report.validation.issues[0].field, "Ward_OUID");
    }

    #[test]
    fn test_tree_invariants_hold_for_larger_input() {
        let regions = [region("R1"), region("R2")];
        let mut rows = Vec::new();
        for r in ["R1", "R2", "R3"] {
            for s in 0..3 {
                for w in 0..3 {
                    for f in 0..2 {
                        // facilities repeat across wards to exercise dedup
                        rows.push(row(
                            r,
                            &format!("{r}S{s}"),
                            &format!("{r}S{s}W{w}"),
                            &format!("{r}F{}", (s * 3 + w + f) % 7),
                            "X",
                        ));
                    }
                }
            }
        }

        let hierarchy = build_with(rows, &regions);
        let by_id: HashMap<&str, &OrgUnit> =
            hierarchy.units.iter().map(|u| (u.id.as_str(), u)).collect();

        // no duplicate ids
        assert_eq!(by_id.len(), hierarchy.units.len());
        assert_eq!(hierarchy.units[0].path, "/C");

        for unit in &hierarchy.units[1..] {
            let parent = by_id[unit.parent_id().unwrap()];
            assert_eq!(unit.level, parent.level + 1);
            assert_eq!(unit.path, format!("{}/{}", parent.path, unit.id));
        }

        assert_eq!(hierarchy.report.rows_skipped, 18);
        assert_eq!(hierarchy.report.sub_regions, 6);
        assert_eq!(hierarchy.report.wards, 18);
        assert_eq!(hierarchy.report.facilities, 14);
    }

    #[test]
    fn test_build_is_deterministic() {
        let rows = vec![
            row("R1", "S1", "W1", "F1", "C1"),
            row("R2", "S2", "W2", "F2", "C2"),
            row("R1", "S1", "W3", "F3", "C3"),
        ];
        let regions = [region("R1"), region("R2")];

        let first = build_with(rows.clone(), &regions);
        let second = build_with(rows, &regions);
        assert_eq!(first, second);
    }

    #[test]
    fn test_default_build_uses_kenya_root() {
        let regions = crate::defaults::supported_regions();
        let units = build(Vec::new(), &regions);

        assert_eq!(units.len(), 3);
        assert_eq!(units[0].id, crate::defaults::COUNTRY_ID);
        assert_eq!(units[0].description, "The country Kenya");
        assert_eq!(units[1].path, "/HfVjCurKxh2/iO2edHMzzoa");
    }
}
