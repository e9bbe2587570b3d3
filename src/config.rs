use std::sync::Arc;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::bess::BessInputs;
use crate::domain::{
    BoreholeGeometry, FluidProperties, MaterialProperties, PipeProperties, ResistanceOverrides,
    Section, ThermalProperties,
};
use crate::error::SizingError;
use crate::optimizer::{ArrayConfigOptimizer, ParameterSweep, SizingParameters, SweepParameters};
use crate::simulation::{
    BuildingLoadModel, ConstantLoad, CopModel, QuadraticAnnualLoad, SimulationParameters,
    SingleBoreholeSimulator,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub run: RunConfig,
    pub borehole: BoreholeGeometry,
    pub soil: MaterialProperties,
    pub grout: MaterialProperties,
    pub pipe: PipeProperties,
    pub fluid: FluidProperties,
    pub resistances: ResistanceOverrides,
    pub load: LoadProfile,
    pub simulation: SimulationParameters,
    pub cop: CopModel,
    pub sizing: SizingParameters,
    pub sweep: SweepParameters,
    pub bess: BessInputs,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            run: RunConfig::default(),
            borehole: BoreholeGeometry::default(),
            soil: MaterialProperties::reference_soil(),
            grout: MaterialProperties::reference_grout(),
            pipe: PipeProperties::default(),
            fluid: FluidProperties::default(),
            resistances: ResistanceOverrides::default(),
            load: LoadProfile::default(),
            simulation: SimulationParameters::default(),
            cop: CopModel::default(),
            sizing: SizingParameters::default(),
            sweep: SweepParameters::default(),
            bess: BessInputs::default(),
        }
    }
}

/// What the binary does when started
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Task {
    /// Single-borehole time series
    #[default]
    Simulate,
    /// Borehole count and critical radius
    Size,
    /// Depth × conductivity table
    Sweep,
    /// Battery storage sizing
    Bess,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub task: Task,
    /// Wall-clock limit for the whole run
    pub deadline_seconds: Option<u64>,
}

impl RunConfig {
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_seconds.map(Duration::from_secs)
    }
}

/// Building load profile selection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoadProfile {
    Quadratic(QuadraticAnnualLoad),
    Constant(ConstantLoad),
}

impl Default for LoadProfile {
    fn default() -> Self {
        LoadProfile::Quadratic(QuadraticAnnualLoad::default())
    }
}

impl LoadProfile {
    pub fn model(&self) -> Arc<dyn BuildingLoadModel> {
        match *self {
            LoadProfile::Quadratic(load) => Arc::new(load),
            LoadProfile::Constant(load) => Arc::new(load),
        }
    }

    fn validate(&self) -> Result<(), SizingError> {
        match self {
            LoadProfile::Quadratic(load) => {
                if !(load.period_s.is_finite() && load.period_s > 0.0) {
                    return Err(SizingError::invalid("load.period_s", load.period_s, "must be positive"));
                }
                for (field, value) in [("load.a", load.a), ("load.b", load.b), ("load.c", load.c)] {
                    if !value.is_finite() {
                        return Err(SizingError::invalid(field, value, "must be finite"));
                    }
                }
            }
            LoadProfile::Constant(load) => {
                if !load.load_w.is_finite() {
                    return Err(SizingError::invalid("load.load_w", load.load_w, "must be finite"));
                }
            }
        }
        Ok(())
    }
}

impl Config {
    /// Built-in defaults, then `config/default.toml`, then `GSHP__*` variables
    pub fn load() -> Result<Self, SizingError> {
        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("config/default.toml"))
            .merge(Env::prefixed("GSHP__").split("__"));
        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SizingError> {
        self.borehole.validate()?;
        self.soil.validate(Section::Soil)?;
        self.grout.validate(Section::Grout)?;
        self.load.validate()?;
        self.simulation.validate()?;
        self.cop.validate()?;
        self.sizing.validate()?;
        self.sweep.profile.validate()?;
        self.bess.validate()?;
        if self.run.deadline_seconds == Some(0) {
            return Err(SizingError::invalid("run.deadline_seconds", 0.0, "must be positive"));
        }
        Ok(())
    }

    pub fn thermal(&self) -> Result<ThermalProperties, SizingError> {
        ThermalProperties::derive(
            &self.borehole,
            &self.soil,
            &self.grout,
            &self.pipe,
            &self.fluid,
            &self.resistances,
        )
    }

    pub fn simulator(&self) -> Result<SingleBoreholeSimulator, SizingError> {
        SingleBoreholeSimulator::new(self.borehole, self.thermal()?, self.cop)
    }

    pub fn optimizer(&self) -> Result<ArrayConfigOptimizer, SizingError> {
        ArrayConfigOptimizer::new(self.borehole, self.thermal()?, self.cop, self.sizing)
    }

    pub fn sweep(&self) -> ParameterSweep {
        ParameterSweep {
            radius_m: self.borehole.radius_m,
            soil: self.soil,
            grout: self.grout,
            pipe: self.pipe,
            fluid: self.fluid,
            overrides: self.resistances,
            cop_model: self.cop,
            sizing: self.sizing,
            params: self.sweep.clone(),
        }
    }
}
