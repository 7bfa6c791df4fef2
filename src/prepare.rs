//! Turns a raw IRVE table into typed station records.
//!
//! Every step is optional: a column missing from the source is skipped and
//! its derived column is left out of the result. A cell that cannot be
//! coerced becomes `None`; nothing here fails the batch.
use crate::types::{
    CleanedDataset, CoercionStats, Column, Indicator, RawTable, StationRecord,
    COL_CHARGE_POINT_COUNT, COL_INSTALLATION_DATE, COL_NOMINAL_POWER, COL_OPERATOR_NAME,
    LOCATION_COLUMNS,
};
use crate::util::{non_empty, normalize_flag, parse_datetime_safe, parse_f64_safe};
use chrono::Datelike;
use csv::StringRecord;
use std::collections::BTreeSet;

/// Resolved positions of the source columns this module understands.
struct ColumnMap {
    date: Option<usize>,
    power: Option<usize>,
    charge_points: Option<usize>,
    operator: Option<usize>,
    /// First of `LOCATION_COLUMNS` present in the header; the others are ignored.
    location: Option<usize>,
    flags: Vec<(Indicator, usize)>,
}

impl ColumnMap {
    fn resolve(raw: &RawTable) -> Self {
        Self {
            date: raw.column_index(COL_INSTALLATION_DATE),
            power: raw.column_index(COL_NOMINAL_POWER),
            charge_points: raw.column_index(COL_CHARGE_POINT_COUNT),
            operator: raw.column_index(COL_OPERATOR_NAME),
            location: LOCATION_COLUMNS.iter().find_map(|name| raw.column_index(name)),
            flags: Indicator::ALL
                .iter()
                .filter_map(|&ind| raw.column_index(ind.source_column()).map(|idx| (ind, idx)))
                .collect(),
        }
    }

    fn output_columns(&self) -> BTreeSet<Column> {
        let mut cols = BTreeSet::new();
        if self.date.is_some() {
            cols.insert(Column::InstallationDate);
            cols.insert(Column::InstallationYear);
        }
        if self.power.is_some() {
            cols.insert(Column::NominalPower);
        }
        if self.charge_points.is_some() {
            cols.insert(Column::ChargePointCount);
        }
        if self.operator.is_some() {
            cols.insert(Column::OperatorName);
        }
        if self.location.is_some() {
            cols.insert(Column::LocationName);
        }
        cols.extend(self.flags.iter().map(|(ind, _)| Column::Flag(*ind)));
        cols
    }
}

/// Clean and type every row of `raw`. The output has exactly one record per
/// input row, in the same order.
pub fn prepare(raw: &RawTable) -> CleanedDataset {
    let map = ColumnMap::resolve(raw);
    let mut stats = CoercionStats::default();
    let records = raw
        .records
        .iter()
        .map(|row| prepare_row(&map, row, &mut stats))
        .collect();
    CleanedDataset::new(map.output_columns(), records, stats)
}

fn prepare_row(map: &ColumnMap, row: &StringRecord, stats: &mut CoercionStats) -> StationRecord {
    let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i));
    let mut rec = StationRecord::default();

    if map.date.is_some() {
        let raw = cell(map.date);
        rec.installation_date = parse_datetime_safe(raw);
        rec.installation_year = rec.installation_date.map(|d| d.year());
        if rec.installation_date.is_none() && non_empty(raw).is_some() {
            stats.unparsed_dates += 1;
        }
    }

    if map.power.is_some() {
        let raw = cell(map.power);
        rec.nominal_power = parse_f64_safe(raw);
        if rec.nominal_power.is_none() && non_empty(raw).is_some() {
            stats.unparsed_power += 1;
        }
    }

    if map.charge_points.is_some() {
        let raw = cell(map.charge_points);
        rec.charge_point_count = parse_f64_safe(raw);
        if rec.charge_point_count.is_none() && non_empty(raw).is_some() {
            stats.unparsed_charge_points += 1;
        }
    }

    rec.operator_name = non_empty(cell(map.operator)).map(str::to_string);

    rec.location_name = non_empty(cell(map.location)).map(str::to_string);

    for &(ind, idx) in &map.flags {
        rec.indicators.set(ind, normalize_flag(row.get(idx)));
    }

    rec
}
