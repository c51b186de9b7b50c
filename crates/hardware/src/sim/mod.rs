//! Simulation driving utilities.
//!
//! The controller itself is a passive state machine; this module supplies the
//! clock-domain driver that steps it from an external simulator clock.

pub mod driver;

pub use driver::Simulator;
