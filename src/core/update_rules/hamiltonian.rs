use super::{PottsUpdateRule, UpdateRule, UpdateRuleError};
use crate::core::population::PottsBasedCellPopulation;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use tracing::trace;

/// An ordered collection of update rules whose contributions are summed.
///
/// # Examples
///
/// ```rust
/// use cellular_potts::prelude::*;
///
/// let mesh = PottsMeshGenerator::new(4, 1, 2, 4, 2, 2).generate().unwrap();
/// let cells = CellsGenerator::default().generate_basic(mesh.num_elements());
/// let population =
///     PottsBasedCellPopulation::new(mesh, cells, None, PopulationConfig::default()).unwrap();
///
/// let mut hamiltonian = Hamiltonian::<2>::new();
/// hamiltonian.add_rule(VolumeConstraintUpdateRule::<2>::new(1.0, 16.0));
/// hamiltonian.add_rule(AdhesionUpdateRule::<2>::default());
///
/// // (4 - 16)² plus four contacts at 0.1.
/// let energy = hamiltonian.evaluate(0, Some(1), &population).unwrap();
/// assert!((energy - 144.4).abs() < 1e-9);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Hamiltonian<const D: usize> {
    rules: Vec<PottsUpdateRule<D>>,
}

impl<const D: usize> Hamiltonian<D> {
    /// An empty Hamiltonian.
    #[must_use]
    pub const fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Appends a rule.
    pub fn add_rule(&mut self, rule: impl Into<PottsUpdateRule<D>>) {
        self.rules.push(rule.into());
    }

    /// Rules in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[PottsUpdateRule<D>] {
        &self.rules
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rule has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Sum of every rule's contribution for `target` and `neighbour`.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a rule.
    pub fn evaluate(
        &self,
        target: usize,
        neighbour: Option<usize>,
        population: &PottsBasedCellPopulation<D>,
    ) -> Result<f64, UpdateRuleError> {
        let mut total = 0.0;
        for rule in &self.rules {
            let contribution = rule.evaluate_hamiltonian_contribution(target, neighbour, population)?;
            trace!(rule = rule.name(), target, ?neighbour, contribution, "Hamiltonian term");
            total += contribution;
        }
        Ok(total)
    }

    /// Writes every rule's info block, in order.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from `out`.
    pub fn output_update_rules_info(&self, out: &mut dyn Write) -> io::Result<()> {
        for rule in &self.rules {
            rule.output_update_rule_info(out)?;
        }
        Ok(())
    }
}

impl<const D: usize, R: Into<PottsUpdateRule<D>>> FromIterator<R> for Hamiltonian<D> {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().map(Into::into).collect(),
        }
    }
}
