//! Command-line configuration and the growth-rate policy.
use crate::error::ConfigError;
use clap::Parser;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_DATA_FILE: &str = "consolidation-etalab-schema-irve-statique-v-2.3.1-20251024.csv";

/// Bounds for the user-adjustable growth rate, in whole percent.
///
/// The projector accepts any rate; these limits only apply to user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowthRatePolicy {
    pub min: u32,
    pub max: u32,
    pub step: u32,
    pub default: u32,
}

pub const GROWTH_RATE_POLICY: GrowthRatePolicy = GrowthRatePolicy {
    min: 10,
    max: 60,
    step: 5,
    default: 30,
};

impl GrowthRatePolicy {
    pub fn validate(&self, value: u32) -> Result<u32, ConfigError> {
        if !(self.min..=self.max).contains(&value) {
            return Err(ConfigError::GrowthRateOutOfRange {
                value,
                min: self.min,
                max: self.max,
            });
        }
        if (value - self.min) % self.step != 0 {
            return Err(ConfigError::GrowthRateStep {
                value,
                step: self.step,
            });
        }
        Ok(value)
    }
}

/// Dashboard sections that produce a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Overview,
    Growth,
    Geography,
    ChargingSpeed,
    Connectors,
    Payments,
    Scenario,
    DataSources,
}

impl Section {
    pub const ALL: [Section; 8] = [
        Section::Overview,
        Section::Growth,
        Section::Geography,
        Section::ChargingSpeed,
        Section::Connectors,
        Section::Payments,
        Section::Scenario,
        Section::DataSources,
    ];

    pub fn numeral(self) -> &'static str {
        match self {
            Section::Overview => "I",
            Section::Growth => "II",
            Section::Geography => "III",
            Section::ChargingSpeed => "IV",
            Section::Connectors => "V",
            Section::Payments => "VI",
            Section::Scenario => "VII",
            Section::DataSources => "IX",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Section::Overview => "The State of French EV Today",
            Section::Growth => "Year-by-Year Growth Acceleration",
            Section::Geography => "Regional Concentration & Disparities",
            Section::ChargingSpeed => "The Critical Role of Fast Charging",
            Section::Connectors => "Technical Standardization: Connector Types",
            Section::Payments => "Payment Methods & Reservations",
            Section::Scenario => "Closing the Infrastructure Gap",
            Section::DataSources => "Data Sources & Methodology",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.numeral(), self.title())
    }
}

impl FromStr for Section {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Section::ALL
            .into_iter()
            .find(|sec| sec.numeral().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigError::UnknownSection(s.to_string()))
    }
}

/// Which sections a non-interactive run should print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionChoice {
    One(Section),
    All,
}

impl FromStr for SectionChoice {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(SectionChoice::All);
        }
        s.parse().map(SectionChoice::One)
    }
}

impl SectionChoice {
    pub fn sections(self) -> Vec<Section> {
        match self {
            SectionChoice::One(s) => vec![s],
            SectionChoice::All => Section::ALL.to_vec(),
        }
    }
}

/// Console reports for the French EV charging infrastructure dataset.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Path to the consolidated IRVE CSV file
    #[arg(long, default_value = DEFAULT_DATA_FILE)]
    pub data: PathBuf,
    /// Directory for exported CSV and JSON files
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,
    /// Print one section (I to VII) or `all`, then exit instead of showing the menu
    #[arg(long)]
    pub section: Option<SectionChoice>,
    /// Annual growth rate for the scenario, in percent
    #[arg(long, default_value_t = GROWTH_RATE_POLICY.default)]
    pub growth_rate: u32,
    /// Charge-point target at the end of the projection window
    #[arg(long, default_value_t = 1_500_000.0)]
    pub target: f64,
    /// First year of the projection window
    #[arg(long, default_value_t = 2025)]
    pub base_year: i32,
    /// Last year of the projection window
    #[arg(long, default_value_t = 2030)]
    pub target_year: i32,
    /// Number of rows shown in console previews
    #[arg(long, default_value_t = 5)]
    pub preview_rows: usize,
}

/// Validated settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub data: PathBuf,
    pub output_dir: PathBuf,
    pub section: Option<SectionChoice>,
    pub growth_rate_pct: u32,
    pub target: f64,
    pub base_year: i32,
    pub target_year: i32,
    pub preview_rows: usize,
}

impl Settings {
    pub fn horizon_years(&self) -> u32 {
        // Validated non-negative in `TryFrom<Cli>`
        (self.target_year - self.base_year).unsigned_abs()
    }
}

impl TryFrom<Cli> for Settings {
    type Error = ConfigError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let growth_rate_pct = GROWTH_RATE_POLICY.validate(cli.growth_rate)?;
        if cli.target_year < cli.base_year {
            return Err(ConfigError::InvertedWindow {
                base_year: cli.base_year,
                target_year: cli.target_year,
            });
        }
        if !(cli.target.is_finite() && cli.target > 0.0) {
            return Err(ConfigError::NonPositiveTarget(cli.target));
        }
        Ok(Settings {
            data: cli.data,
            output_dir: cli.output_dir,
            section: cli.section,
            growth_rate_pct,
            target: cli.target,
            base_year: cli.base_year,
            target_year: cli.target_year,
            preview_rows: cli.preview_rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(10, true)]
    #[case(30, true)]
    #[case(60, true)]
    #[case(5, false)]
    #[case(65, false)]
    #[case(32, false)]
    fn growth_rate_policy_validate(#[case] value: u32, #[case] ok: bool) {
        assert_eq!(GROWTH_RATE_POLICY.validate(value).is_ok(), ok);
    }

    #[test]
    fn growth_rate_policy_step_error() {
        assert_eq!(
            GROWTH_RATE_POLICY.validate(32),
            Err(ConfigError::GrowthRateStep { value: 32, step: 5 })
        );
    }

    #[rstest]
    #[case("I", Section::Overview)]
    #[case("iv", Section::ChargingSpeed)]
    #[case(" VII ", Section::Scenario)]
    #[case("ix", Section::DataSources)]
    fn section_from_str(#[case] input: &str, #[case] expected: Section) {
        assert_eq!(input.parse::<Section>().unwrap(), expected);
    }

    #[test]
    fn section_choice_all_and_unknown() {
        assert_eq!("ALL".parse::<SectionChoice>().unwrap(), SectionChoice::All);
        assert_eq!(
            "VIII".parse::<SectionChoice>(),
            Err(ConfigError::UnknownSection("VIII".to_string()))
        );
    }

    #[test]
    fn settings_defaults() {
        let cli = Cli::try_parse_from(["irve_report"]).unwrap();
        let settings = Settings::try_from(cli).unwrap();
        assert_eq!(settings.data, PathBuf::from(DEFAULT_DATA_FILE));
        assert_eq!(settings.growth_rate_pct, 30);
        assert_eq!(settings.horizon_years(), 5);
        assert_eq!(settings.target, 1_500_000.0);
        assert_eq!(settings.section, None);
    }

    #[test]
    fn settings_rejects_inverted_window() {
        let cli =
            Cli::try_parse_from(["irve_report", "--base-year", "2030", "--target-year", "2025"])
                .unwrap();
        assert!(matches!(
            Settings::try_from(cli),
            Err(ConfigError::InvertedWindow { .. })
        ));
    }

    #[test]
    fn settings_rejects_growth_rate_out_of_policy() {
        let cli = Cli::try_parse_from(["irve_report", "--growth-rate", "70"]).unwrap();
        assert!(Settings::try_from(cli).is_err());
    }

    #[rstest]
    #[case("0")]
    #[case("-5")]
    #[case("inf")]
    #[case("NaN")]
    fn settings_rejects_non_positive_target(#[case] target: &str) {
        let arg = format!("--target={target}");
        let cli = Cli::try_parse_from(["irve_report", arg.as_str()]).unwrap();
        assert!(matches!(
            Settings::try_from(cli),
            Err(ConfigError::NonPositiveTarget(_))
        ));
    }

    #[test]
    fn cli_parses_section() {
        let cli = Cli::try_parse_from(["irve_report", "--section", "iii"]).unwrap();
        assert_eq!(cli.section, Some(SectionChoice::One(Section::Geography)));
    }
}
