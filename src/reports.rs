use crate::config::Settings;
use crate::projection::{project, ProjectionResult};
use crate::types::{
    CategoryCountRow, CleanedDataset, Column, Indicator, OverviewRow, ProjectionRow, RankingRow,
    StationRow, SummaryStats, YearlyInstallRow,
};
use crate::util::{average, format_int, format_number, percent};
use std::collections::{BTreeMap, HashMap, HashSet};

pub const GROWTH_FIRST_YEAR: i32 = 2010;
pub const GROWTH_LAST_YEAR: i32 = 2025;
pub const RECENT_YEARS_FROM: i32 = 2020;
pub const TOP_LOCATIONS: usize = 15;
pub const TOP_OPERATORS: usize = 10;
pub const DATA_PREVIEW_ROWS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overview {
    pub total_stations: usize,
    pub total_charge_points: f64,
    pub total_power_kw: f64,
    pub total_operators: usize,
}

impl Overview {
    pub fn rows(&self) -> Vec<OverviewRow> {
        let row = |metric: &str, value: String| OverviewRow {
            metric: metric.to_string(),
            value,
        };
        vec![
            row("Charging Stations", format_int(self.total_stations)),
            row("Charge Points", format_number(self.total_charge_points, 0)),
            row("Total Power (MW)", format_number(self.total_power_kw / 1000.0, 0)),
            row("Operators", format_int(self.total_operators)),
        ]
    }
}

/// Section I: headline totals. Missing values are skipped, not counted as 0.
pub fn generate_overview(data: &CleanedDataset) -> Overview {
    let recs = data.records();
    let operators: HashSet<&str> = recs
        .iter()
        .filter_map(|r| r.operator_name.as_deref())
        .collect();
    Overview {
        total_stations: data.len(),
        total_charge_points: recs.iter().filter_map(|r| r.charge_point_count).sum(),
        total_power_kw: recs.iter().filter_map(|r| r.nominal_power).sum(),
        total_operators: operators.len(),
    }
}

/// Section II: new and cumulative stations per installation year.
pub fn generate_yearly_installs(data: &CleanedDataset) -> Vec<YearlyInstallRow> {
    if !data.has_column(Column::InstallationYear) {
        return Vec::new();
    }
    let mut by_year: BTreeMap<i32, usize> = BTreeMap::new();
    for year in data.records().iter().filter_map(|r| r.installation_year) {
        if (GROWTH_FIRST_YEAR..=GROWTH_LAST_YEAR).contains(&year) {
            *by_year.entry(year).or_default() += 1;
        }
    }

    let mut cumulative = 0usize;
    by_year
        .into_iter()
        .map(|(year, new_stations)| {
            cumulative += new_stations;
            YearlyInstallRow {
                year,
                new_stations,
                cumulative_stations: cumulative,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthHighlights {
    pub recent_avg: f64,
    pub peak_year: i32,
    pub peak_installs: usize,
}

/// Needs at least two years from [`RECENT_YEARS_FROM`] onward to say anything.
pub fn growth_highlights(rows: &[YearlyInstallRow]) -> Option<GrowthHighlights> {
    let recent: Vec<f64> = rows
        .iter()
        .filter(|r| r.year >= RECENT_YEARS_FROM)
        .map(|r| r.new_stations as f64)
        .collect();
    if recent.len() < 2 {
        return None;
    }
    // First year wins a tie, so fold instead of max_by_key (which keeps the last)
    let peak = rows.iter().fold(None::<&YearlyInstallRow>, |best, r| match best {
        Some(b) if b.new_stations >= r.new_stations => Some(b),
        _ => Some(r),
    })?;
    Some(GrowthHighlights {
        recent_avg: average(&recent),
        peak_year: peak.year,
        peak_installs: peak.new_stations,
    })
}

fn rank_by_count<'a>(names: impl Iterator<Item = &'a str>, limit: usize) -> Vec<RankingRow> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for name in names {
        *counts.entry(name).or_default() += 1;
    }
    let mut sorted: Vec<(&str, usize)> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    sorted
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(idx, (name, stations))| RankingRow {
            rank: idx + 1,
            name: name.to_string(),
            stations,
        })
        .collect()
}

/// Section III: communes with the most stations.
pub fn generate_top_locations(data: &CleanedDataset) -> Vec<RankingRow> {
    rank_by_count(
        data.records().iter().filter_map(|r| r.location_name.as_deref()),
        TOP_LOCATIONS,
    )
}

/// Section III: operators with the most stations.
pub fn generate_top_operators(data: &CleanedDataset) -> Vec<RankingRow> {
    rank_by_count(
        data.records().iter().filter_map(|r| r.operator_name.as_deref()),
        TOP_OPERATORS,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpeedTier {
    Slow,
    Medium,
    Fast,
    UltraFast,
}

impl SpeedTier {
    /// Right-closed bins: (0,22], (22,50], (50,150], (150,10000].
    pub fn classify(power_kw: f64) -> Option<SpeedTier> {
        match power_kw {
            p if p <= 0.0 || p.is_nan() => None,
            p if p <= 22.0 => Some(SpeedTier::Slow),
            p if p <= 50.0 => Some(SpeedTier::Medium),
            p if p <= 150.0 => Some(SpeedTier::Fast),
            p if p <= 10_000.0 => Some(SpeedTier::UltraFast),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SpeedTier::Slow => "Slow (<=22kW)",
            SpeedTier::Medium => "Medium (22-50kW)",
            SpeedTier::Fast => "Fast (50-150kW)",
            SpeedTier::UltraFast => "Ultra-Fast (>150kW)",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PowerTiers {
    pub rows: Vec<CategoryCountRow>,
    pub slow_pct: f64,
    pub fast_or_ultra_pct: f64,
}

/// Section IV: stations per charging-speed tier, as a share of bucketed rows.
pub fn generate_power_tiers(data: &CleanedDataset) -> PowerTiers {
    let mut counts: HashMap<SpeedTier, usize> = HashMap::new();
    for tier in data
        .records()
        .iter()
        .filter_map(|r| r.nominal_power)
        .filter_map(SpeedTier::classify)
    {
        *counts.entry(tier).or_default() += 1;
    }
    let bucketed: usize = counts.values().sum();
    let get = |t: SpeedTier| counts.get(&t).copied().unwrap_or(0);

    let slow_pct = percent(get(SpeedTier::Slow), bucketed);
    let fast_or_ultra_pct = percent(get(SpeedTier::Fast) + get(SpeedTier::UltraFast), bucketed);
    let rows = category_rows(
        counts.iter().map(|(t, c)| (t.label(), *c)).collect(),
        bucketed,
    );
    PowerTiers {
        rows,
        slow_pct,
        fast_or_ultra_pct,
    }
}

/// Drop zero counts, sort by count (desc, then label) and attach shares.
fn category_rows(counts: Vec<(&str, usize)>, denominator: usize) -> Vec<CategoryCountRow> {
    let mut counts: Vec<(&str, usize)> = counts.into_iter().filter(|(_, c)| *c > 0).collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    counts
        .into_iter()
        .map(|(label, count)| CategoryCountRow {
            category: label.to_string(),
            count,
            share_pct: format_number(percent(count, denominator), 1),
        })
        .collect()
}

fn flag_counts(data: &CleanedDataset, indicators: &[Indicator]) -> Vec<(&'static str, usize)> {
    indicators
        .iter()
        .filter_map(|&ind| data.flag_count(ind).map(|c| (ind.label(), c)))
        .collect()
}

/// Section V: stations offering each connector, as a share of all stations.
pub fn generate_connector_counts(data: &CleanedDataset) -> Vec<CategoryCountRow> {
    category_rows(flag_counts(data, &Indicator::CONNECTORS), data.len())
}

/// Section VI: payment options, as a share of all payment flags set.
pub fn generate_payment_counts(data: &CleanedDataset) -> Vec<CategoryCountRow> {
    let counts = flag_counts(data, &Indicator::PAYMENTS);
    let total: usize = counts.iter().map(|(_, c)| c).sum();
    category_rows(counts, total)
}

/// Section VI: percentage of stations that accept reservations.
pub fn reservation_share(data: &CleanedDataset) -> Option<f64> {
    data.flag_count(Indicator::Reservation)
        .map(|count| percent(count, data.len()))
}

/// How the scenario's signed gap reads to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapLabel {
    Shortfall,
    Surplus,
}

impl GapLabel {
    pub fn from_gap(gap: f64) -> Self {
        if gap > 0.0 {
            GapLabel::Shortfall
        } else {
            GapLabel::Surplus
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            GapLabel::Shortfall => "Shortfall",
            GapLabel::Surplus => "Surplus",
        }
    }

    pub fn direction(self) -> &'static str {
        match self {
            GapLabel::Shortfall => "below target",
            GapLabel::Surplus => "above target",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioReport {
    pub current: f64,
    pub growth_rate_pct: u32,
    pub base_year: i32,
    pub target: f64,
    pub result: ProjectionResult,
}

impl ScenarioReport {
    pub fn label(&self) -> GapLabel {
        GapLabel::from_gap(self.result.gap)
    }

    pub fn rows(&self) -> Vec<ProjectionRow> {
        self.result
            .points
            .iter()
            .map(|p| ProjectionRow {
                year: i64::from(self.base_year) + i64::from(p.offset),
                projected: format_number(p.value, 0),
                target: format_number(self.target, 0),
            })
            .collect()
    }

    /// e.g. `Shortfall: 1,128,707 (75.2% below target)`
    pub fn headline(&self) -> String {
        let label = self.label();
        format!(
            "{}: {} ({}% {})",
            label.title(),
            format_number(self.result.gap.abs().trunc(), 0),
            format_number(self.result.gap_percent.abs(), 1),
            label.direction()
        )
    }
}

/// Section VII: project today's charge points to the target year.
///
/// The starting value is the total charge-point count truncated to a whole
/// number.
pub fn generate_scenario(
    data: &CleanedDataset,
    settings: &Settings,
    growth_rate_pct: u32,
) -> ScenarioReport {
    let current = generate_overview(data).total_charge_points.trunc();
    let result = project(
        current,
        f64::from(growth_rate_pct) / 100.0,
        settings.horizon_years(),
        settings.target,
    );
    ScenarioReport {
        current,
        growth_rate_pct,
        base_year: settings.base_year,
        target: settings.target,
        result,
    }
}

pub fn generate_summary(
    data: &CleanedDataset,
    overview: &Overview,
    scenario: &ScenarioReport,
) -> SummaryStats {
    SummaryStats {
        total_stations: overview.total_stations,
        total_charge_points: overview.total_charge_points,
        total_power_kw: overview.total_power_kw,
        total_operators: overview.total_operators,
        growth_rate_pct: scenario.growth_rate_pct,
        projected_final: scenario.result.final_value(),
        gap: scenario.result.gap,
        gap_pct: scenario.result.gap_percent,
        unparsed_cells: data.stats(),
    }
}

/// Section IX: the first `limit` prepared records, in source order.
pub fn generate_data_sources(data: &CleanedDataset, limit: usize) -> Vec<StationRow> {
    data.records().iter().take(limit).map(StationRow::from).collect()
}
