//! Hamiltonian update rules.
//!
//! Each rule scores one term of the Potts Hamiltonian for a pair of elements
//! (or an element and the medium). A stepper proposing to copy a site from one
//! element into another asks every rule for its contribution and sums them;
//! accepting or rejecting the move is the stepper's business, not the rules'.
//!
//! Rules are pure functions of the population and their own parameters. The
//! closed set of rules is [`PottsUpdateRule`], whose serde representation is
//! tagged with the rule's registered name so a restored rule resolves to the
//! right concrete type.

mod adhesion;
mod differential_adhesion;
mod hamiltonian;
mod volume_constraint;

pub use adhesion::*;
pub use differential_adhesion::*;
pub use hamiltonian::*;
pub use volume_constraint::*;

use crate::core::population::{PopulationError, PottsBasedCellPopulation};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use thiserror::Error;

/// Errors raised while evaluating a rule.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum UpdateRuleError {
    /// The population could not answer a query the rule needed.
    #[error(transparent)]
    Population(#[from] PopulationError),
}

/// Behaviour shared by every Hamiltonian term.
pub trait UpdateRule<const D: usize> {
    /// Registered name of the rule, e.g. `"AdhesionUpdateRule"`.
    fn name(&self) -> &'static str;

    /// Energy associated with element `target` and its neighbour, which is
    /// either element `neighbour` or, for `None`, the medium.
    ///
    /// # Errors
    ///
    /// Returns an error if the population cannot resolve an element, a cell
    /// or a neighbour query.
    fn evaluate_hamiltonian_contribution(
        &self,
        target: usize,
        neighbour: Option<usize>,
        population: &PottsBasedCellPopulation<D>,
    ) -> Result<f64, UpdateRuleError>;

    /// Writes one `<Name>value</Name>` line per parameter.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from `out`.
    fn output_update_rule_parameters(&self, out: &mut dyn Write) -> io::Result<()>;

    /// `"<Name>-<D>"`.
    fn identifier(&self) -> String {
        format!("{}-{D}", self.name())
    }

    /// Writes the rule's parameter block, bracketed by its identifier.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from `out`.
    fn output_update_rule_info(&self, out: &mut dyn Write) -> io::Result<()> {
        let identifier = self.identifier();
        writeln!(out, "\t\t<{identifier}>")?;
        self.output_update_rule_parameters(out)?;
        writeln!(out, "\t\t</{identifier}>")
    }
}

/// Writes one parameter line of a rule's info block.
pub(crate) fn write_parameter(out: &mut dyn Write, name: &str, value: f64) -> io::Result<()> {
    writeln!(out, "\t\t\t<{name}>{value}</{name}>")
}

/// The closed set of update rules.
///
/// # Examples
///
/// ```rust
/// use cellular_potts::core::update_rules::{PottsUpdateRule, UpdateRule, VolumeConstraintUpdateRule};
///
/// let rule: PottsUpdateRule<2> = VolumeConstraintUpdateRule::default().into();
/// let json = serde_json::to_string(&rule).unwrap();
/// assert!(json.contains("\"type\":\"VolumeConstraintUpdateRule\""));
/// let back: PottsUpdateRule<2> = serde_json::from_str(&json).unwrap();
/// assert_eq!(back.identifier(), "VolumeConstraintUpdateRule-2");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PottsUpdateRule<const D: usize> {
    /// Penalises deviation from a target volume.
    VolumeConstraintUpdateRule(VolumeConstraintUpdateRule<D>),
    /// Adhesion between neighbouring elements and with the medium.
    AdhesionUpdateRule(AdhesionUpdateRule<D>),
    /// Adhesion depending on whether cells carry the label.
    DifferentialAdhesionUpdateRule(DifferentialAdhesionUpdateRule<D>),
}

impl<const D: usize> PottsUpdateRule<D> {
    fn as_rule(&self) -> &dyn UpdateRule<D> {
        match self {
            Self::VolumeConstraintUpdateRule(rule) => rule,
            Self::AdhesionUpdateRule(rule) => rule,
            Self::DifferentialAdhesionUpdateRule(rule) => rule,
        }
    }
}

impl<const D: usize> UpdateRule<D> for PottsUpdateRule<D> {
    fn name(&self) -> &'static str {
        self.as_rule().name()
    }

    fn evaluate_hamiltonian_contribution(
        &self,
        target: usize,
        neighbour: Option<usize>,
        population: &PottsBasedCellPopulation<D>,
    ) -> Result<f64, UpdateRuleError> {
        self.as_rule()
            .evaluate_hamiltonian_contribution(target, neighbour, population)
    }

    fn output_update_rule_parameters(&self, out: &mut dyn Write) -> io::Result<()> {
        self.as_rule().output_update_rule_parameters(out)
    }
}

impl<const D: usize> From<VolumeConstraintUpdateRule<D>> for PottsUpdateRule<D> {
    fn from(rule: VolumeConstraintUpdateRule<D>) -> Self {
        Self::VolumeConstraintUpdateRule(rule)
    }
}

impl<const D: usize> From<AdhesionUpdateRule<D>> for PottsUpdateRule<D> {
    fn from(rule: AdhesionUpdateRule<D>) -> Self {
        Self::AdhesionUpdateRule(rule)
    }
}

impl<const D: usize> From<DifferentialAdhesionUpdateRule<D>> for PottsUpdateRule<D> {
    fn from(rule: DifferentialAdhesionUpdateRule<D>) -> Self {
        Self::DifferentialAdhesionUpdateRule(rule)
    }
}
