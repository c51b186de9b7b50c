//! Clock-domain driver for the memory controller.
//!
//! The surrounding simulator and the controller may run at different clock
//! frequencies. The driver accumulates fractional controller progress per
//! driver tick and steps the controller a whole cycle at a time, so a scale
//! of 1.5 runs three controller cycles for every two driver ticks with no
//! drift over a run of any length.

use std::cell::RefCell;
use std::rc::Rc;

use crate::common::{ConfigError, DeadlockError};
use crate::config::Config;
use crate::mem::controller::MemoryController;
use crate::mem::upstream::UpstreamChannel;

/// Steps a [`MemoryController`] from an external simulator clock.
#[derive(Debug)]
pub struct Simulator {
    controller: MemoryController,
    clock_scale: f64,
    /// Accumulated fractional controller cycles not yet executed.
    leap: f64,
    cycle: u64,
}

impl Simulator {
    /// Builds a driver and its controller from one configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the configuration fails validation.
    pub fn new(
        config: &Config,
        upstream: Vec<Rc<RefCell<UpstreamChannel>>>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            controller: MemoryController::new(config, upstream)?,
            clock_scale: config.general.clock_scale,
            leap: 0.0,
            cycle: 0,
        })
    }

    /// Advances the model by one driver tick.
    ///
    /// Runs zero or more whole controller cycles depending on the clock
    /// scale and the accumulated fractional progress.
    ///
    /// # Returns
    ///
    /// The total progress reported by the controller cycles executed.
    ///
    /// # Errors
    ///
    /// Propagates a [`DeadlockError`] from the controller.
    pub fn tick(&mut self) -> Result<u64, DeadlockError> {
        self.leap += self.clock_scale;
        let mut progress = 0;
        while self.leap >= 1.0 {
            progress += self.controller.operate(self.cycle)?;
            self.cycle += 1;
            self.leap -= 1.0;
        }
        Ok(progress)
    }

    /// Advances the model by `ticks` driver ticks.
    ///
    /// # Errors
    ///
    /// Propagates the first [`DeadlockError`] from the controller.
    pub fn run(&mut self, ticks: u64) -> Result<u64, DeadlockError> {
        let mut progress = 0;
        for _ in 0..ticks {
            progress += self.tick()?;
        }
        Ok(progress)
    }

    /// Current controller cycle count.
    #[inline]
    pub const fn cycle(&self) -> u64 {
        self.cycle
    }

    /// The driven controller.
    pub const fn controller(&self) -> &MemoryController {
        &self.controller
    }

    /// The driven controller, mutably.
    pub const fn controller_mut(&mut self) -> &mut MemoryController {
        &mut self.controller
    }
}
