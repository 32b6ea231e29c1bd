//! Preliminary ship design library entry points.
//!
//! Given a cargo target (deadweight, fixed hull or container count) and a
//! propulsion choice, this crate searches for a self-consistent hull, powers
//! it, balances its masses and optionally prices it. Higher-level consumers
//! (the CLI) should only depend on the functions exported here instead of
//! reimplementing behavior.
//!

#![deny(warnings)]

pub mod config;
pub mod dimensions;
pub mod economics;
pub mod error;
pub mod freeboard;
pub mod mass;
pub mod power;
pub mod profiles;
pub mod report;
pub mod request;
pub mod result;
pub mod solver;
pub mod stability;
pub mod state;
pub mod sweep;
pub mod tables;
pub mod volume;
pub mod voyage;

pub use config::{default_params_path, load_request, resolve_request, save_request};
pub use economics::{CiiRating, EconomicsSummary, EmissionsSummary};
pub use error::{Error, Result};
pub use mass::MassBreakdown;
pub use power::{PowerEstimate, PowerFailure};
pub use profiles::{fuel_type, fuel_types, ship_type, ship_types, FuelProfile, ShipTypeProfile};
pub use report::{render_report, ReportItem, ReportOptions};
pub use request::{
    Calibration, CostParameters, DesignMode, DesignRequest, EconomicParameters,
    GeometricConstraints, HullDimensions, SolverOptions,
};
pub use result::{Bound, DesignResult, DesignWarning, SolveStatus, TeuCheck, TraceEvent};
pub use solver::solve;
pub use state::DesignState;
pub use sweep::{run_sweep, write_sweep_csv, SweepParameter, SweepPoint, SweepRun};
pub use volume::VolumeCheck;
pub use voyage::{Route, RouteCatalog, SpeedProfile, VoyagePlan};
