//! Editor for racing-sim car data: torque-curve LUTs, `engine.ini` and
//! gearbox values.

pub mod app;
pub mod backup;
pub mod engine;
pub mod error;
pub mod gearbox;
pub mod ini;
pub mod lut;
pub mod notice;
pub mod point_editor;
pub mod session;
pub mod settings;

pub use error::{ConfigError, LutError};
