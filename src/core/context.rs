//! Explicit simulation context: the run's random source and clock.
//!
//! A [`SimulationContext`] is created once per run and passed by reference to
//! whatever needs randomness or the current time. Seeding it with the same
//! value reproduces the same sequence of draws, which is what replaying an
//! archived run relies on.

#![forbid(unsafe_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the simulation clock.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SimulationTimeError {
    /// Start or end time is not finite, or the end precedes the start.
    #[error("Invalid time interval [{start_time}, {end_time}]")]
    InvalidInterval {
        /// Requested start time.
        start_time: f64,
        /// Requested end time.
        end_time: f64,
    },
    /// The clock needs at least one step.
    #[error("Number of time steps must be positive")]
    NoTimeSteps,
    /// The clock has already reached its end time.
    #[error("Simulation time has reached its end after {steps} steps")]
    Finished {
        /// Steps taken.
        steps: u64,
    },
}

/// A fixed-step simulation clock.
///
/// Time is computed from the step count rather than accumulated, so it does
/// not drift over long runs.
///
/// # Examples
///
/// ```rust
/// use cellular_potts::core::context::SimulationTime;
///
/// let mut clock = SimulationTime::new(0.0, 1.0, 4).unwrap();
/// clock.increment_time_one_step().unwrap();
/// assert_eq!(clock.time(), 0.25);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationTime {
    start_time: f64,
    end_time: f64,
    total_time_steps: u64,
    time_steps_elapsed: u64,
}

impl Default for SimulationTime {
    fn default() -> Self {
        Self {
            start_time: 0.0,
            end_time: 1.0,
            total_time_steps: 1,
            time_steps_elapsed: 0,
        }
    }
}

impl SimulationTime {
    /// Creates a clock running from `start_time` to `end_time` in
    /// `total_time_steps` equal steps.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationTimeError::InvalidInterval`] for a non-finite or
    /// reversed interval and [`SimulationTimeError::NoTimeSteps`] for zero steps.
    pub fn new(start_time: f64, end_time: f64, total_time_steps: u64) -> Result<Self, SimulationTimeError> {
        if !start_time.is_finite() || !end_time.is_finite() || end_time < start_time {
            return Err(SimulationTimeError::InvalidInterval { start_time, end_time });
        }
        if total_time_steps == 0 {
            return Err(SimulationTimeError::NoTimeSteps);
        }
        Ok(Self {
            start_time,
            end_time,
            total_time_steps,
            time_steps_elapsed: 0,
        })
    }

    /// Length of one step.
    #[must_use]
    pub fn time_step(&self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let steps = self.total_time_steps as f64;
        (self.end_time - self.start_time) / steps
    }

    /// Current simulation time.
    #[must_use]
    pub fn time(&self) -> f64 {
        if self.time_steps_elapsed == self.total_time_steps {
            return self.end_time;
        }
        #[allow(clippy::cast_precision_loss)]
        let elapsed = self.time_steps_elapsed as f64;
        elapsed.mul_add(self.time_step(), self.start_time)
    }

    /// Start time.
    #[must_use]
    pub const fn start_time(&self) -> f64 {
        self.start_time
    }

    /// End time.
    #[must_use]
    pub const fn end_time(&self) -> f64 {
        self.end_time
    }

    /// Steps taken so far.
    #[must_use]
    pub const fn time_steps_elapsed(&self) -> u64 {
        self.time_steps_elapsed
    }

    /// Total number of steps.
    #[must_use]
    pub const fn total_time_steps(&self) -> u64 {
        self.total_time_steps
    }

    /// Whether the end time has been reached.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.time_steps_elapsed >= self.total_time_steps
    }

    /// Advances the clock by one step.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationTimeError::Finished`] once the end time is reached.
    pub const fn increment_time_one_step(&mut self) -> Result<(), SimulationTimeError> {
        if self.is_finished() {
            return Err(SimulationTimeError::Finished {
                steps: self.time_steps_elapsed,
            });
        }
        self.time_steps_elapsed += 1;
        Ok(())
    }

    /// Rewinds the clock to its start time.
    pub const fn reset(&mut self) {
        self.time_steps_elapsed = 0;
    }
}

/// Random source and clock of one simulation run.
#[derive(Clone, Debug)]
pub struct SimulationContext {
    seed: u64,
    rng: StdRng,
    time: SimulationTime,
}

impl SimulationContext {
    /// Context seeded with `seed` and a default clock over `[0, 1]` in one step.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cellular_potts::core::context::SimulationContext;
    ///
    /// let mut a = SimulationContext::seeded(3);
    /// let mut b = SimulationContext::seeded(3);
    /// assert_eq!(a.ranf(), b.ranf());
    /// ```
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
            time: SimulationTime::default(),
        }
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_time(mut self, time: SimulationTime) -> Self {
        self.time = time;
        self
    }

    /// Seed the random source was created from.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Re-seeds the random source and rewinds the clock.
    pub fn reset(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = StdRng::seed_from_u64(seed);
        self.time.reset();
    }

    /// Uniform variate in `[0, 1)`.
    pub fn ranf(&mut self) -> f64 {
        self.rng.random()
    }

    /// Mutable access to the random source, for draws other than [`Self::ranf`].
    pub const fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// The clock.
    #[must_use]
    pub const fn time(&self) -> &SimulationTime {
        &self.time
    }

    /// Mutable access to the clock.
    pub const fn time_mut(&mut self) -> &mut SimulationTime {
        &mut self.time
    }
}
