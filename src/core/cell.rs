//! Cell agents tracked by a population.
//!
//! A [`Cell`] carries the biological state the lattice core needs: a stable
//! identity, a proliferative classification, a generation, a birth time, the
//! label used by differential adhesion, and a death flag. Cell-cycle models
//! live outside this crate; they mark cells dead through [`Cell::kill`].
//!
//! Cells are stored in an arena owned by the population and addressed by
//! [`CellKey`].
//!
//! # Examples
//!
//! ```rust
//! use cellular_potts::core::cell::{CellBuilder, CellProliferativeType};
//!
//! let cell = CellBuilder::default()
//!     .proliferative_type(CellProliferativeType::Stem)
//!     .birth_time(-3.5)
//!     .build()
//!     .unwrap();
//! assert_eq!(cell.proliferative_type(), CellProliferativeType::Stem);
//! assert!(!cell.is_dead());
//! ```

#![forbid(unsafe_code)]

use super::util::{make_uuid, validate_uuid};
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use uuid::Uuid;

new_key_type! {
    /// Key type for accessing cells in a population's cell arena.
    ///
    /// Keys stay valid while the cell is alive and are never reused for a
    /// different cell within the same arena.
    pub struct CellKey;
}

/// Proliferative classification supplied by the cell generator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CellProliferativeType {
    /// Stem cell.
    Stem,
    /// Transit-amplifying cell.
    #[default]
    Transit,
    /// Terminally differentiated cell.
    Differentiated,
}

impl CellProliferativeType {
    /// All classifications, in counting order.
    pub const ALL: [Self; 3] = [Self::Stem, Self::Transit, Self::Differentiated];

    /// Position of this classification in [`Self::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Stem => 0,
            Self::Transit => 1,
            Self::Differentiated => 2,
        }
    }
}

/// One biological cell.
#[derive(Builder, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct Cell {
    /// Stable identity of the cell.
    #[builder(setter(into), default = "make_uuid()")]
    uuid: Uuid,
    /// Proliferative classification.
    #[builder(default)]
    proliferative_type: CellProliferativeType,
    /// Generation counter used by generation-based cycle models.
    #[builder(default)]
    generation: u32,
    /// Simulation time at which the cell was born (may be negative).
    #[builder(default)]
    birth_time: f64,
    /// Whether the cell carries the differential-adhesion label.
    #[builder(default)]
    labelled: bool,
    /// Set once the cell has died.
    #[builder(setter(skip), default)]
    dead: bool,
}

impl CellBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(uuid) = &self.uuid {
            validate_uuid(uuid).map_err(|e| e.to_string())?;
        }
        match self.birth_time {
            Some(birth_time) if !birth_time.is_finite() => {
                Err(format!("birth time must be finite, got {birth_time}"))
            }
            _ => Ok(()),
        }
    }
}

impl Cell {
    /// Creates a live, unlabelled cell with a fresh identity.
    #[must_use]
    pub fn new(proliferative_type: CellProliferativeType, birth_time: f64) -> Self {
        Self {
            uuid: make_uuid(),
            proliferative_type,
            generation: 0,
            birth_time,
            labelled: false,
            dead: false,
        }
    }

    /// Creates a live, unlabelled cell from its parts. Used by generators that
    /// draw identities from a seeded source.
    pub(crate) const fn from_parts(
        uuid: Uuid,
        proliferative_type: CellProliferativeType,
        generation: u32,
        birth_time: f64,
    ) -> Self {
        Self {
            uuid,
            proliferative_type,
            generation,
            birth_time,
            labelled: false,
            dead: false,
        }
    }

    /// Returns the cell's identity.
    #[must_use]
    pub const fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// Returns the proliferative classification.
    #[must_use]
    pub const fn proliferative_type(&self) -> CellProliferativeType {
        self.proliferative_type
    }

    /// Changes the proliferative classification.
    pub const fn set_proliferative_type(&mut self, proliferative_type: CellProliferativeType) {
        self.proliferative_type = proliferative_type;
    }

    /// Returns the generation counter.
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }

    /// Returns the birth time.
    #[must_use]
    pub const fn birth_time(&self) -> f64 {
        self.birth_time
    }

    /// Sets the birth time.
    pub const fn set_birth_time(&mut self, birth_time: f64) {
        self.birth_time = birth_time;
    }

    /// Age of the cell at simulation time `time`.
    #[must_use]
    pub fn age(&self, time: f64) -> f64 {
        time - self.birth_time
    }

    /// Whether the cell carries the differential-adhesion label.
    #[must_use]
    pub const fn is_labelled(&self) -> bool {
        self.labelled
    }

    /// Adds or removes the differential-adhesion label.
    pub const fn set_labelled(&mut self, labelled: bool) {
        self.labelled = labelled;
    }

    /// Whether the cell has died.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.dead
    }

    /// Marks the cell as dead. The population removes it on its next
    /// dead-cell pass.
    pub const fn kill(&mut self) {
        self.dead = true;
    }
}
