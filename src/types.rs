use chrono::NaiveDateTime;
use csv::StringRecord;
use serde::Serialize;
use std::collections::BTreeSet;
use tabled::Tabled;

pub const COL_INSTALLATION_DATE: &str = "date_mise_en_service";
pub const COL_NOMINAL_POWER: &str = "puissance_nominale";
pub const COL_CHARGE_POINT_COUNT: &str = "nbre_pdc";
pub const COL_OPERATOR_NAME: &str = "nom_operateur";

/// Candidate source columns for the commune, most canonical first.
pub const LOCATION_COLUMNS: [&str; 2] = ["consolidated_commune", "commune"];

/// Raw table as read from disk: a header row and the data records, untyped.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: StringRecord,
    pub records: Vec<StringRecord>,
}

impl RawTable {
    pub fn new(headers: StringRecord, records: Vec<StringRecord>) -> Self {
        Self { headers, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Position of a named column, if the table has it.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }
}

/// Boolean-like indicator columns that are normalized to 0/1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Indicator {
    ConnectorType2,
    ConnectorCcs,
    ConnectorChademo,
    ConnectorEf,
    FreeOfCharge,
    PayPerUse,
    PayByCard,
    Reservation,
}

impl Indicator {
    pub const ALL: [Indicator; 8] = [
        Indicator::ConnectorType2,
        Indicator::ConnectorCcs,
        Indicator::ConnectorChademo,
        Indicator::ConnectorEf,
        Indicator::FreeOfCharge,
        Indicator::PayPerUse,
        Indicator::PayByCard,
        Indicator::Reservation,
    ];

    pub const CONNECTORS: [Indicator; 4] = [
        Indicator::ConnectorType2,
        Indicator::ConnectorCcs,
        Indicator::ConnectorChademo,
        Indicator::ConnectorEf,
    ];

    pub const PAYMENTS: [Indicator; 3] = [
        Indicator::PayByCard,
        Indicator::PayPerUse,
        Indicator::FreeOfCharge,
    ];

    /// Column name in the consolidated IRVE export.
    pub fn source_column(self) -> &'static str {
        match self {
            Indicator::ConnectorType2 => "prise_type_2",
            Indicator::ConnectorCcs => "prise_type_combo_ccs",
            Indicator::ConnectorChademo => "prise_type_chademo",
            Indicator::ConnectorEf => "prise_type_ef",
            Indicator::FreeOfCharge => "gratuit",
            Indicator::PayPerUse => "paiement_acte",
            Indicator::PayByCard => "paiement_cb",
            Indicator::Reservation => "reservation",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Indicator::ConnectorType2 => "Type 2 (AC standard)",
            Indicator::ConnectorCcs => "CCS Combo (DC fast)",
            Indicator::ConnectorChademo => "CHAdeMO (DC)",
            Indicator::ConnectorEf => "Type EF (AC)",
            Indicator::FreeOfCharge => "Free",
            Indicator::PayPerUse => "Pay-as-you-go",
            Indicator::PayByCard => "Credit Card",
            Indicator::Reservation => "Reservation",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Columns a cleaned dataset may or may not carry, depending on its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    InstallationDate,
    InstallationYear,
    NominalPower,
    ChargePointCount,
    OperatorName,
    LocationName,
    Flag(Indicator),
}

/// Per-row 0/1 values, `None` where the dataset has no such column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndicatorValues([Option<u8>; 8]);

impl IndicatorValues {
    pub fn get(&self, indicator: Indicator) -> Option<u8> {
        self.0[indicator.slot()]
    }

    pub fn set(&mut self, indicator: Indicator, value: u8) {
        self.0[indicator.slot()] = Some(value);
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationRecord {
    pub installation_date: Option<NaiveDateTime>,
    pub installation_year: Option<i32>,
    pub nominal_power: Option<f64>,
    pub charge_point_count: Option<f64>,
    pub operator_name: Option<String>,
    pub location_name: Option<String>,
    pub indicators: IndicatorValues,
}

/// Non-empty cells that could not be coerced, counted per column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CoercionStats {
    pub unparsed_dates: usize,
    pub unparsed_power: usize,
    pub unparsed_charge_points: usize,
}

impl CoercionStats {
    pub fn total(&self) -> usize {
        self.unparsed_dates + self.unparsed_power + self.unparsed_charge_points
    }
}

/// Output of preparation. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct CleanedDataset {
    columns: BTreeSet<Column>,
    records: Vec<StationRecord>,
    stats: CoercionStats,
}

impl CleanedDataset {
    pub fn new(columns: BTreeSet<Column>, records: Vec<StationRecord>, stats: CoercionStats) -> Self {
        Self {
            columns,
            records,
            stats,
        }
    }

    pub fn has_column(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    pub fn columns(&self) -> impl Iterator<Item = Column> + '_ {
        self.columns.iter().copied()
    }

    pub fn records(&self) -> &[StationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn stats(&self) -> CoercionStats {
        self.stats
    }

    /// Number of rows with the indicator set, `None` if the column is absent.
    pub fn flag_count(&self, indicator: Indicator) -> Option<usize> {
        if !self.has_column(Column::Flag(indicator)) {
            return None;
        }
        Some(
            self.records
                .iter()
                .filter(|r| r.indicators.get(indicator) == Some(1))
                .count(),
        )
    }
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct OverviewRow {
    #[serde(rename = "Metric")]
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct YearlyInstallRow {
    #[serde(rename = "Year")]
    #[tabled(rename = "Year")]
    pub year: i32,
    #[serde(rename = "NewStations")]
    #[tabled(rename = "NewStations")]
    pub new_stations: usize,
    #[serde(rename = "CumulativeStations")]
    #[tabled(rename = "CumulativeStations")]
    pub cumulative_stations: usize,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct RankingRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Name")]
    #[tabled(rename = "Name")]
    pub name: String,
    #[serde(rename = "Stations")]
    #[tabled(rename = "Stations")]
    pub stations: usize,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct CategoryCountRow {
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub category: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: usize,
    #[serde(rename = "SharePct")]
    #[tabled(rename = "SharePct")]
    pub share_pct: String,
}

/// One prepared record as text; missing values are empty.
#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct StationRow {
    #[serde(rename = "InstallationDate")]
    #[tabled(rename = "InstallationDate")]
    pub installation_date: String,
    #[serde(rename = "Year")]
    #[tabled(rename = "Year")]
    pub installation_year: String,
    #[serde(rename = "PowerKw")]
    #[tabled(rename = "PowerKw")]
    pub nominal_power: String,
    #[serde(rename = "ChargePoints")]
    #[tabled(rename = "ChargePoints")]
    pub charge_points: String,
    #[serde(rename = "Operator")]
    #[tabled(rename = "Operator")]
    pub operator: String,
    #[serde(rename = "Commune")]
    #[tabled(rename = "Commune")]
    pub location: String,
    #[serde(rename = "Type2")]
    #[tabled(rename = "Type2")]
    pub type_2: String,
    #[serde(rename = "CCS")]
    #[tabled(rename = "CCS")]
    pub ccs: String,
    #[serde(rename = "CHAdeMO")]
    #[tabled(rename = "CHAdeMO")]
    pub chademo: String,
    #[serde(rename = "EF")]
    #[tabled(rename = "EF")]
    pub ef: String,
    #[serde(rename = "Free")]
    #[tabled(rename = "Free")]
    pub free: String,
    #[serde(rename = "PayPerUse")]
    #[tabled(rename = "PayPerUse")]
    pub pay_per_use: String,
    #[serde(rename = "CreditCard")]
    #[tabled(rename = "CreditCard")]
    pub pay_by_card: String,
    #[serde(rename = "Reservation")]
    #[tabled(rename = "Reservation")]
    pub reservation: String,
}

impl From<&StationRecord> for StationRow {
    fn from(rec: &StationRecord) -> Self {
        fn text<T: ToString>(v: Option<T>) -> String {
            v.map(|v| v.to_string()).unwrap_or_default()
        }
        let flag = |ind: Indicator| text(rec.indicators.get(ind));
        StationRow {
            installation_date: text(rec.installation_date),
            installation_year: text(rec.installation_year),
            nominal_power: text(rec.nominal_power),
            charge_points: text(rec.charge_point_count),
            operator: rec.operator_name.clone().unwrap_or_default(),
            location: rec.location_name.clone().unwrap_or_default(),
            type_2: flag(Indicator::ConnectorType2),
            ccs: flag(Indicator::ConnectorCcs),
            chademo: flag(Indicator::ConnectorChademo),
            ef: flag(Indicator::ConnectorEf),
            free: flag(Indicator::FreeOfCharge),
            pay_per_use: flag(Indicator::PayPerUse),
            pay_by_card: flag(Indicator::PayByCard),
            reservation: flag(Indicator::Reservation),
        }
    }
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ProjectionRow {
    #[serde(rename = "Year")]
    #[tabled(rename = "Year")]
    pub year: i64,
    #[serde(rename = "ProjectedChargePoints")]
    #[tabled(rename = "ProjectedChargePoints")]
    pub projected: String,
    #[serde(rename = "Target")]
    #[tabled(rename = "Target")]
    pub target: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub total_stations: usize,
    pub total_charge_points: f64,
    pub total_power_kw: f64,
    pub total_operators: usize,
    pub growth_rate_pct: u32,
    pub projected_final: f64,
    pub gap: f64,
    pub gap_pct: f64,
    pub unparsed_cells: CoercionStats,
}
