//! Command implementations. Each returns a serializable report.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use stockcast_forecast::{
    ArtifactStore, Forecast, ForecastConfig, ForecastEngine, ForecastStore, ForecastSummary, Metrics,
};
use stockcast_infra::{FileArtifactStore, ForecastSettings, InMemoryForecastStore, InMemoryInventory, InventorySnapshot};

use crate::cli::{Cli, Commands};

type FileEngine = ForecastEngine<InMemoryInventory, InMemoryForecastStore, FileArtifactStore>;

#[derive(Debug, Serialize)]
pub struct TrainReport {
    pub trained: bool,
    pub artifact: String,
    pub metrics: Option<Metrics>,
}

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub written: usize,
    pub stored: usize,
    pub artifact: String,
    pub out: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Report {
    Train(TrainReport),
    Run(RunReport),
    Summary(ForecastSummary),
}

pub fn execute(cli: &Cli) -> Result<Report> {
    let settings = ForecastSettings::load(cli.settings.as_deref()).context("failed to load settings")?;

    match &cli.command {
        Commands::Train {
            data,
            exclude_promotions,
        } => train(&settings, data, !exclude_promotions).map(Report::Train),
        Commands::Run { data, config, out } => run(&settings, data, config, out).map(Report::Run),
        Commands::Summary {
            data,
            forecasts,
            start,
            end,
        } => summary(&settings, data, forecasts, *start, *end).map(Report::Summary),
    }
}

pub fn train(settings: &ForecastSettings, data: &Path, include_promotions: bool) -> Result<TrainReport> {
    let engine = engine(settings, data, InMemoryForecastStore::new())?;
    let metrics = engine.train(include_promotions)?;
    if metrics.is_none() {
        warn!(data = %data.display(), "not enough history to train; artifact left unchanged");
    }

    Ok(TrainReport {
        trained: metrics.is_some(),
        artifact: engine.artifacts().location(),
        metrics,
    })
}

pub fn run(settings: &ForecastSettings, data: &Path, config: &Path, out: &Path) -> Result<RunReport> {
    let config: ForecastConfig = read_json(config).context("failed to load forecast config")?;
    let store = forecast_table(out)?;
    let engine = engine(settings, data, store)?;

    let written = engine.run(Some(&config))?;
    let rows = engine.forecasts().all()?;
    write_json(out, &rows)?;
    info!(written, stored = rows.len(), out = %out.display(), "forecast table saved");

    Ok(RunReport {
        written,
        stored: rows.len(),
        artifact: engine.artifacts().location(),
        out: out.display().to_string(),
    })
}

pub fn summary(
    settings: &ForecastSettings,
    data: &Path,
    forecasts: &Path,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<ForecastSummary> {
    anyhow::ensure!(start <= end, "start {start} is after end {end}");
    let store = forecast_table(forecasts)?;
    let engine = engine(settings, data, store)?;
    Ok(engine.summarize(start, end)?)
}

fn engine(settings: &ForecastSettings, data: &Path, forecasts: InMemoryForecastStore) -> Result<FileEngine> {
    let snapshot = InventorySnapshot::load(data)?;
    let inventory = InMemoryInventory::from_snapshot(snapshot)
        .with_context(|| format!("inconsistent snapshot {}", data.display()))?;
    Ok(ForecastEngine::new(inventory, forecasts, settings.artifact_store()))
}

/// Forecast rows previously written to `path`; empty when the file is absent.
fn forecast_table(path: &Path) -> Result<InMemoryForecastStore> {
    let store = InMemoryForecastStore::new();
    if !path.exists() {
        return Ok(store);
    }
    let rows: Vec<Forecast> = read_json(path)?;
    for row in rows {
        store.upsert(row)?;
    }
    Ok(store)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("failed to parse {}", path.display()))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    }
    let bytes = serde_json::to_vec_pretty(value)?;
    fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))
}
