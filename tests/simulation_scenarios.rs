//! End-to-end runs of the single-borehole simulator on the reference site

use renewable_sizing::domain::*;
use renewable_sizing::simulation::*;
use renewable_sizing::SizingError;

fn simulator(geometry: BoreholeGeometry, cop_model: CopModel) -> SingleBoreholeSimulator {
    let thermal = ThermalProperties::derive(
        &geometry,
        &MaterialProperties::reference_soil(),
        &MaterialProperties::reference_grout(),
        &PipeProperties::default(),
        &FluidProperties::default(),
        &ResistanceOverrides::default(),
    )
    .unwrap();
    SingleBoreholeSimulator::new(geometry, thermal, cop_model).unwrap()
}

#[test]
fn test_reference_year_heating() {
    let sim = simulator(BoreholeGeometry::default(), CopModel::default());
    let params = SimulationParameters::default();
    let series = sim
        .run(&params, &QuadraticAnnualLoad::default(), &RunControl::unbounded())
        .unwrap();

    // floor(365.2 days / 8 h) + 1
    assert_eq!(series.len(), 1096);
    assert!(series.iter().all(|r| {
        [r.interface_temp_k, r.outlet_temp_k, r.cop, r.ground_load_w, r.electrical_power_w]
            .iter()
            .all(|v| v.is_finite())
    }));

    let (lo, hi) = series
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| (lo.min(r.outlet_temp_k), hi.max(r.outlet_temp_k)));
    assert!((lo - 265.571).abs() < 0.05, "coldest outlet {lo}");
    assert!((hi - 281.636).abs() < 0.05, "warmest outlet {hi}");

    // COP stays inside the linear model over the outlet range seen
    let model = CopModel::default();
    assert!(series
        .iter()
        .all(|r| r.cop >= model.raw_cop(lo) - 1e-9 && r.cop <= model.raw_cop(hi).max(model.raw_cop(288.0)) + 1e-9));

    // Extraction never warms the ground
    assert!(series.iter().all(|r| r.interface_temp_k <= params.ground_temperature_k + 1e-12));

    let summary = series.summarize(11, params.time_step_s);
    let spf = summary.seasonal_performance_factor.unwrap();
    assert!((spf - 3.598).abs() < 0.01, "SPF {spf}");
    let (cop_lo, cop_hi) = summary.cop_range.unwrap();
    assert!((cop_lo - 3.0956).abs() < 0.005);
    assert!((cop_hi - 5.037).abs() < 1e-9);
}

#[test]
fn test_zero_load_leaves_ground_undisturbed() {
    let sim = simulator(BoreholeGeometry::default(), CopModel::default());
    let series = sim
        .run(&SimulationParameters::default(), &ConstantLoad::zero(), &RunControl::unbounded())
        .unwrap();

    assert_eq!(series.len(), 1096);
    for r in series.iter() {
        assert_eq!(r.ground_load_w, 0.0);
        assert_eq!(r.interface_temp_k, 288.0);
        assert_eq!(r.outlet_temp_k, 288.0);
        assert!((r.cop - CopModel::default().raw_cop(288.0)).abs() < 1e-12);
    }
}

#[test]
fn test_cooling_month_warms_ground() {
    let sim = simulator(BoreholeGeometry::default(), CopModel::default());
    let params = SimulationParameters {
        mode: OperatingMode::Cooling,
        duration_s: SECONDS_IN_YEAR / 12.0,
        ..Default::default()
    };
    let series = sim
        .run(&params, &QuadraticAnnualLoad::default(), &RunControl::unbounded())
        .unwrap();

    assert_eq!(series.len(), 92);
    let last = series.records().last().unwrap();
    assert!(last.interface_temp_k > 300.0, "{}", last.interface_temp_k);
    assert!(last.ground_load_w < 0.0);
}

#[test]
fn test_truncated_history_tracks_full_history() {
    let sim = simulator(BoreholeGeometry::default(), CopModel::default());
    let full = SimulationParameters {
        duration_s: SECONDS_IN_YEAR / 4.0,
        ..Default::default()
    };
    let truncated = SimulationParameters {
        history: HistoryWindow::Truncated { steps: 90 },
        ..full
    };
    let load = QuadraticAnnualLoad::default();

    let exact = sim.run(&full, &load, &RunControl::unbounded()).unwrap();
    let approx = sim.run(&truncated, &load, &RunControl::unbounded()).unwrap();

    assert_eq!(exact.len(), approx.len());
    for (a, b) in exact.iter().zip(approx.iter()) {
        assert!((a.outlet_temp_k - b.outlet_temp_k).abs() < 0.5);
    }
}

#[test]
fn test_reject_policy_aborts_without_partial_result() {
    // Two boreholes cannot carry the load without freezing the loop
    let sim = simulator(
        BoreholeGeometry::default().with_count(2),
        CopModel::default().with_limit(CopLimit::Reject { floor: 2.5 }),
    );
    let err = sim
        .run(&SimulationParameters::default(), &QuadraticAnnualLoad::default(), &RunControl::unbounded())
        .unwrap_err();
    match err {
        // The first outlet temperature is already below the floor
        SizingError::NumericDomain { step, .. } => assert_eq!(step, Some(0)),
        other => panic!("unexpected error: {other}"),
    }
}
