use std::sync::Arc;

use anyhow::{anyhow, Result};
use renewable_sizing::{bess, config, report, simulation::RunControl, telemetry};
use config::{Config, Task};
use report::{BessReport, SimulationReport, SizingReport, SweepReport};
use telemetry::init_tracing;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let mut cfg = Config::load()?;
    if let Some(arg) = std::env::args().nth(1) {
        cfg.run.task = arg
            .parse()
            .map_err(|_| anyhow!("unknown task '{arg}', expected simulate, size, sweep or bess"))?;
    }

    let token = CancellationToken::new();
    let signal = tokio::spawn(telemetry::shutdown_signal(token.clone()));
    let mut control = RunControl::unbounded().with_cancellation(token.clone());
    if let Some(deadline) = cfg.run.deadline() {
        control = control.with_timeout(deadline);
    }

    info!(task = %cfg.run.task, "starting run");

    let report = match cfg.run.task {
        Task::Simulate => serde_json::to_value(simulate(cfg, control).await?)?,
        Task::Size => serde_json::to_value(size(cfg, control).await?)?,
        Task::Sweep => serde_json::to_value(sweep(cfg, control, token.clone()).await?)?,
        Task::Bess => serde_json::to_value(size_bess(cfg).await?)?,
    };
    signal.abort();

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn simulate(cfg: Config, control: RunControl) -> Result<SimulationReport> {
    let report = tokio::task::spawn_blocking(move || {
        let simulator = cfg.simulator()?;
        let load = cfg.load.model();
        let series = simulator.run(&cfg.simulation, load.as_ref(), &control)?;
        Ok::<_, renewable_sizing::SizingError>(SimulationReport::new(
            cfg.borehole,
            *simulator.thermal(),
            cfg.simulation,
            series,
        ))
    })
    .await??;

    info!(
        steps = report.summary.steps,
        spf = ?report.summary.seasonal_performance_factor,
        "simulation complete"
    );
    Ok(report)
}

async fn size(cfg: Config, control: RunControl) -> Result<SizingReport> {
    let report = tokio::task::spawn_blocking(move || {
        let optimizer = cfg.optimizer()?;
        let load = cfg.load.model();
        let sizing = optimizer.optimize(
            load.as_ref(),
            cfg.simulation.ground_temperature_k,
            cfg.simulation.mode,
            &control,
        )?;
        Ok::<_, renewable_sizing::SizingError>(SizingReport::new(&cfg.borehole, sizing))
    })
    .await??;
    Ok(report)
}

/// One blocking task per grid point; the first failure cancels the rest
async fn sweep(cfg: Config, control: RunControl, token: CancellationToken) -> Result<SweepReport> {
    let sweep = Arc::new(cfg.sweep());
    let load = cfg.load.model();
    let ground_temperature_k = cfg.simulation.ground_temperature_k;
    let mode = cfg.simulation.mode;

    let mut tasks = JoinSet::new();
    for point in sweep.points()? {
        let sweep = Arc::clone(&sweep);
        let load = Arc::clone(&load);
        let control = control.clone();
        tasks.spawn_blocking(move || sweep.evaluate(point, load.as_ref(), ground_temperature_k, mode, &control));
    }

    let mut rows = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        match joined.map_err(anyhow::Error::from).and_then(|row| Ok(row?)) {
            Ok(row) => rows.push(row),
            Err(e) => {
                token.cancel();
                return Err(e);
            }
        }
    }

    info!(points = rows.len(), "sweep complete");
    Ok(SweepReport::new(rows))
}

async fn size_bess(cfg: Config) -> Result<BessReport> {
    let sizing = tokio::task::spawn_blocking(move || bess::size_storage(&cfg.bess)).await??;
    info!(
        units = sizing.units,
        total_capacity_kwh = sizing.total_capacity_kwh,
        "battery storage sized"
    );
    Ok(BessReport::new(sizing))
}
