// Entry point and high-level CLI flow.
//
// - With `--section`, the selected sections are printed and exported once.
// - Otherwise a menu lists sections I-VII and IX; the dataset is loaded and cleaned
//   on first use and reused for every section until it is reloaded.
mod config;
mod error;
mod loader;
mod logging;
mod output;
mod prepare;
mod projection;
mod reports;
mod types;
mod util;

use anyhow::{Context, Result};
use clap::Parser;
use config::{Cli, Section, Settings, GROWTH_RATE_POLICY};
use once_cell::sync::Lazy;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, error, info, warn};
use types::CleanedDataset;

// Prepared dataset memoized per source path, so repeated section renders
// don't reload or re-clean the CSV.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState::default()));

#[derive(Default)]
struct AppState {
    source: Option<PathBuf>,
    data: Option<Arc<CleanedDataset>>,
}

/// Read a single trimmed line after printing `prompt`; `None` on end of input.
fn read_line(prompt: &str) -> Option<String> {
    print!("{prompt}");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Ask for a growth rate until the answer fits the policy. Empty input keeps
/// `current`.
fn prompt_growth_rate(current: u32) -> Option<u32> {
    loop {
        let answer = read_line(&format!(
            "Annual growth rate in % ({}-{}, step {}) [{}]: ",
            GROWTH_RATE_POLICY.min, GROWTH_RATE_POLICY.max, GROWTH_RATE_POLICY.step, current
        ))?;
        if answer.is_empty() {
            return Some(current);
        }
        match answer.parse::<u32>() {
            Ok(v) => match GROWTH_RATE_POLICY.validate(v) {
                Ok(v) => return Some(v),
                Err(e) => warn!("{e}"),
            },
            Err(_) => warn!("'{answer}' is not a whole number"),
        }
    }
}

/// Load and clean `path`, reusing the cached dataset when it came from the
/// same file.
fn load_dataset(path: &Path, force: bool) -> Result<Arc<CleanedDataset>> {
    let key = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let mut state = APP_STATE.lock().unwrap_or_else(PoisonError::into_inner);
    if !force && state.source.as_deref() == Some(key.as_path()) {
        if let Some(data) = &state.data {
            debug!("Reusing prepared dataset for {}", key.display());
            return Ok(Arc::clone(data));
        }
    }

    let raw = loader::load_raw(path)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    let data = Arc::new(prepare::prepare(&raw));
    info!(
        "Processing dataset... ({} rows loaded, {} columns recognised)",
        util::format_int(raw.len()),
        data.columns().count()
    );
    let stats = data.stats();
    if stats.total() > 0 {
        warn!(
            "Unparseable cells set to missing: {} dates, {} power ratings, {} charge-point counts",
            util::format_int(stats.unparsed_dates),
            util::format_int(stats.unparsed_power),
            util::format_int(stats.unparsed_charge_points)
        );
    }

    state.source = Some(key);
    state.data = Some(Arc::clone(&data));
    Ok(data)
}

fn export<T: serde::Serialize>(settings: &Settings, file: &str, rows: &[T]) -> Result<()> {
    let path = settings.output_dir.join(file);
    output::write_csv(&path, rows)?;
    println!("(Full table exported to {})\n", path.display());
    Ok(())
}

/// Print one section and export its tables.
fn handle_section(
    section: Section,
    data: &CleanedDataset,
    settings: &Settings,
    growth_rate_pct: u32,
) -> Result<()> {
    let n = settings.preview_rows;
    println!("{section}\n");

    match section {
        Section::Overview => {
            let rows = reports::generate_overview(data).rows();
            output::preview_table_rows(&rows, rows.len());
            export(settings, "section1_overview.csv", &rows)?;
        }
        Section::Growth => {
            let rows = reports::generate_yearly_installs(data);
            output::preview_table_rows(&rows, rows.len());
            if let Some(hl) = reports::growth_highlights(&rows) {
                println!(
                    "Since {}: {} new stations per year on average. Peak year {} with {} new stations.\n",
                    reports::RECENT_YEARS_FROM,
                    util::format_number(hl.recent_avg, 0),
                    hl.peak_year,
                    util::format_int(hl.peak_installs)
                );
            }
            export(settings, "section2_yearly_growth.csv", &rows)?;
        }
        Section::Geography => {
            let locations = reports::generate_top_locations(data);
            println!("Charging Stations by City");
            output::preview_table_rows(&locations, n);
            export(settings, "section3_top_locations.csv", &locations)?;

            let operators = reports::generate_top_operators(data);
            println!("Stations by Network Operator");
            output::preview_table_rows(&operators, n);
            export(settings, "section3_top_operators.csv", &operators)?;
        }
        Section::ChargingSpeed => {
            let tiers = reports::generate_power_tiers(data);
            output::preview_table_rows(&tiers.rows, tiers.rows.len());
            println!(
                "{}% slow (<=22kW), {}% fast or ultra-fast (>50kW).\n",
                util::format_number(tiers.slow_pct, 1),
                util::format_number(tiers.fast_or_ultra_pct, 1)
            );
            export(settings, "section4_charging_speed.csv", &tiers.rows)?;
        }
        Section::Connectors => {
            let rows = reports::generate_connector_counts(data);
            output::preview_table_rows(&rows, rows.len());
            export(settings, "section5_connectors.csv", &rows)?;
        }
        Section::Payments => {
            let rows = reports::generate_payment_counts(data);
            output::preview_table_rows(&rows, rows.len());
            if let Some(share) = reports::reservation_share(data) {
                println!(
                    "{}% of stations accept reservations.\n",
                    util::format_number(share, 1)
                );
            }
            export(settings, "section6_payments.csv", &rows)?;
        }
        Section::Scenario => {
            let scenario = reports::generate_scenario(data, settings, growth_rate_pct);
            println!(
                "Current charge points ({}): {}",
                settings.base_year,
                util::format_number(scenario.current, 0)
            );
            println!(
                "Projected {} (at {}% growth): {}",
                settings.target_year,
                growth_rate_pct,
                util::format_number(scenario.result.final_value().trunc(), 0)
            );
            println!("{}\n", scenario.headline());
            let rows = scenario.rows();
            output::preview_table_rows(&rows, rows.len());
            export(settings, "section7_projection.csv", &rows)?;

            let overview = reports::generate_overview(data);
            let summary = reports::generate_summary(data, &overview, &scenario);
            let path = settings.output_dir.join("summary.json");
            output::write_json(&path, &summary)?;
            println!("Summary Stats ({}):", path.display());
            println!(
                "{{\"projected_final\": {}, \"gap\": {}, \"gap_pct\": {}}}\n",
                util::format_number(summary.projected_final, 2),
                util::format_number(summary.gap, 2),
                util::format_number(summary.gap_pct, 2)
            );
        }
        Section::DataSources => {
            let source = settings.data.file_name().map_or_else(
                || settings.data.display().to_string(),
                |f| f.to_string_lossy().into_owned(),
            );
            println!("Source: {source}");
            println!("Total records: {}\n", util::format_int(data.len()));
            let rows = reports::generate_data_sources(data, reports::DATA_PREVIEW_ROWS);
            output::preview_table_rows(&rows, n);
            export(settings, "section9_data_sources.csv", &rows)?;
        }
    }
    Ok(())
}

fn run_menu(settings: &Settings) -> Result<()> {
    let mut growth_rate_pct = settings.growth_rate_pct;
    loop {
        println!("Select Section:");
        for section in Section::ALL {
            println!("[{}] {}", section.numeral(), section.title());
        }
        println!("[L] Reload the file");
        println!("[Q] Quit\n");

        let Some(choice) = read_line("Enter choice: ") else {
            break;
        };
        if choice.eq_ignore_ascii_case("q") {
            break;
        }
        if choice.eq_ignore_ascii_case("l") {
            load_dataset(&settings.data, true)?;
            continue;
        }

        let section = match choice.parse::<Section>() {
            Ok(s) => s,
            Err(e) => {
                println!("Invalid choice ({e}). Please enter I-VII, IX, L or Q.\n");
                continue;
            }
        };
        if section == Section::Scenario {
            let Some(rate) = prompt_growth_rate(growth_rate_pct) else {
                break;
            };
            growth_rate_pct = rate;
        }
        let data = load_dataset(&settings.data, false)?;
        handle_section(section, &data, settings, growth_rate_pct)?;
    }
    println!("Exiting the program.");
    Ok(())
}

fn run(settings: Settings) -> Result<()> {
    fs::create_dir_all(&settings.output_dir).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            settings.output_dir.display()
        )
    })?;

    // Halt before rendering anything if the source can't be loaded
    let data = load_dataset(&settings.data, false)?;

    match settings.section {
        Some(choice) => {
            for section in choice.sections() {
                handle_section(section, &data, &settings, settings.growth_rate_pct)?;
            }
            Ok(())
        }
        None => run_menu(&settings),
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = logging::init_tracing() {
        eprintln!("Error: {err:?}");
    }

    let result = Settings::try_from(cli)
        .context("Invalid configuration")
        .and_then(run);
    if let Err(err) = result {
        error!("{err:?}");
        std::process::exit(1);
    }
}
