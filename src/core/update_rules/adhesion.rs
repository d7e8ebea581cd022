use super::{UpdateRule, UpdateRuleError, write_parameter};
use crate::core::cell::Cell;
use crate::core::population::{PopulationError, PottsBasedCellPopulation};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

// =============================================================================
// COEFFICIENTS
// =============================================================================

/// Adhesion coefficients between labelled cells.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabelledAdhesionCoefficients {
    /// Both cells labelled.
    pub labelled_cell_labelled_cell: f64,
    /// Exactly one cell labelled.
    pub labelled_cell_cell: f64,
    /// A labelled cell against the medium.
    pub labelled_cell_boundary: f64,
}

impl Default for LabelledAdhesionCoefficients {
    fn default() -> Self {
        Self {
            labelled_cell_labelled_cell: 0.1,
            labelled_cell_cell: 0.1,
            labelled_cell_boundary: 0.2,
        }
    }
}

/// Adhesion coefficients between unlabelled cells, plus the label dispatch
/// shared by the adhesion rules.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdhesionCoefficients {
    /// Two cells in contact.
    pub cell_cell: f64,
    /// A cell against the medium.
    pub cell_boundary: f64,
}

impl Default for AdhesionCoefficients {
    fn default() -> Self {
        Self {
            cell_cell: 0.1,
            cell_boundary: 0.2,
        }
    }
}

impl AdhesionCoefficients {
    /// Coefficient for cells `a` and `b` in contact.
    ///
    /// With `labelled` coefficients, a pair where either cell carries the
    /// label uses them; every other pair uses [`Self::cell_cell`].
    #[must_use]
    pub fn cell_cell_energy(&self, a: &Cell, b: &Cell, labelled: Option<&LabelledAdhesionCoefficients>) -> f64 {
        match (labelled, a.is_labelled(), b.is_labelled()) {
            (Some(l), true, true) => l.labelled_cell_labelled_cell,
            (Some(l), true, false) | (Some(l), false, true) => l.labelled_cell_cell,
            _ => self.cell_cell,
        }
    }

    /// Coefficient for `cell` against the medium.
    #[must_use]
    pub fn cell_boundary_energy(&self, cell: &Cell, labelled: Option<&LabelledAdhesionCoefficients>) -> f64 {
        match labelled {
            Some(l) if cell.is_labelled() => l.labelled_cell_boundary,
            _ => self.cell_boundary,
        }
    }
}

// =============================================================================
// SHARED EVALUATION
// =============================================================================

/// Counts ordered contacts `(s, t)` with `s` a site of `target` and `t` a
/// lattice neighbour of `s` lying in `neighbour` (or in no element, for `None`).
pub(crate) fn count_contacts<const D: usize>(
    target: usize,
    neighbour: Option<usize>,
    population: &PottsBasedCellPopulation<D>,
) -> Result<usize, PopulationError> {
    let element = population.mesh().active_element(target)?;
    let mut contacts = 0;
    for &site in element.node_indices() {
        for other in population.neighbouring_node_indices_vector(site)? {
            let Some(node) = population.node(other) else {
                continue;
            };
            let touches = match neighbour {
                Some(n) => node.is_in_element(n),
                None => node.is_unoccupied(),
            };
            if touches {
                contacts += 1;
            }
        }
    }
    Ok(contacts)
}

/// Adhesion energy between `target` and `neighbour` as
/// `contacts × coefficient`, using the label dispatch of `coefficients`.
pub(crate) fn adhesion_contribution<const D: usize>(
    coefficients: &AdhesionCoefficients,
    labelled: Option<&LabelledAdhesionCoefficients>,
    target: usize,
    neighbour: Option<usize>,
    population: &PottsBasedCellPopulation<D>,
) -> Result<f64, UpdateRuleError> {
    if neighbour == Some(target) {
        return Ok(0.0);
    }
    let contacts = count_contacts(target, neighbour, population)?;
    if contacts == 0 {
        return Ok(0.0);
    }

    let cell_at = |index: usize| -> Result<&Cell, PopulationError> {
        let key = population.cell_using_location_index(index)?;
        population.cell(key).ok_or(PopulationError::UnknownCell { key })
    };
    let target_cell = cell_at(target)?;
    let coefficient = match neighbour {
        Some(n) => coefficients.cell_cell_energy(target_cell, cell_at(n)?, labelled),
        None => coefficients.cell_boundary_energy(target_cell, labelled),
    };
    #[allow(clippy::cast_precision_loss)]
    let contacts = contacts as f64;
    Ok(contacts * coefficient)
}

// =============================================================================
// RULE
// =============================================================================

/// Adhesion between neighbouring elements and between an element and the
/// medium.
///
/// The contribution counts site contacts between the two sides (using the
/// population's neighbourhood) and multiplies by the cell–cell coefficient,
/// or by the cell–boundary coefficient when the neighbour is the medium.
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
/// let rule = AdhesionUpdateRule::<2>::default();
/// let energy = rule.evaluate_hamiltonian_contribution(0, Some(1), &population).unwrap();
/// assert!((energy - 0.4).abs() < 1e-12);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AdhesionUpdateRule<const D: usize> {
    coefficients: AdhesionCoefficients,
}

impl<const D: usize> AdhesionUpdateRule<D> {
    /// Rule with the given coefficients.
    #[must_use]
    pub const fn new(cell_cell: f64, cell_boundary: f64) -> Self {
        Self {
            coefficients: AdhesionCoefficients {
                cell_cell,
                cell_boundary,
            },
        }
    }

    /// The coefficients.
    #[must_use]
    pub const fn coefficients(&self) -> &AdhesionCoefficients {
        &self.coefficients
    }

    /// Cell–cell adhesion energy parameter.
    #[must_use]
    pub const fn cell_cell_adhesion_energy_parameter(&self) -> f64 {
        self.coefficients.cell_cell
    }

    /// Sets the cell–cell adhesion energy parameter.
    pub const fn set_cell_cell_adhesion_energy_parameter(&mut self, value: f64) {
        self.coefficients.cell_cell = value;
    }

    /// Cell–boundary adhesion energy parameter.
    #[must_use]
    pub const fn cell_boundary_adhesion_energy_parameter(&self) -> f64 {
        self.coefficients.cell_boundary
    }

    /// Sets the cell–boundary adhesion energy parameter.
    pub const fn set_cell_boundary_adhesion_energy_parameter(&mut self, value: f64) {
        self.coefficients.cell_boundary = value;
    }

    /// Adhesion energy of one contact between `a` and `b`.
    #[must_use]
    pub fn cell_cell_adhesion_energy(&self, a: &Cell, b: &Cell) -> f64 {
        self.coefficients.cell_cell_energy(a, b, None)
    }

    /// Adhesion energy of one contact between `cell` and the medium.
    #[must_use]
    pub fn cell_boundary_adhesion_energy(&self, cell: &Cell) -> f64 {
        self.coefficients.cell_boundary_energy(cell, None)
    }
}

impl<const D: usize> UpdateRule<D> for AdhesionUpdateRule<D> {
    fn name(&self) -> &'static str {
        "AdhesionUpdateRule"
    }

    fn evaluate_hamiltonian_contribution(
        &self,
        target: usize,
        neighbour: Option<usize>,
        population: &PottsBasedCellPopulation<D>,
    ) -> Result<f64, UpdateRuleError> {
        adhesion_contribution(&self.coefficients, None, target, neighbour, population)
    }

    fn output_update_rule_parameters(&self, out: &mut dyn Write) -> io::Result<()> {
        write_parameter(out, "CellCellAdhesionEnergyParameter", self.coefficients.cell_cell)?;
        write_parameter(out, "CellBoundaryAdhesionEnergyParameter", self.coefficients.cell_boundary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cell::CellProliferativeType;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults_and_setters() {
        let mut rule = AdhesionUpdateRule::<2>::default();
        assert_relative_eq!(rule.cell_cell_adhesion_energy_parameter(), 0.1);
        assert_relative_eq!(rule.cell_boundary_adhesion_energy_parameter(), 0.2);

        rule.set_cell_cell_adhesion_energy_parameter(0.5);
        rule.set_cell_boundary_adhesion_energy_parameter(0.6);
        assert_relative_eq!(rule.cell_cell_adhesion_energy_parameter(), 0.5);
        assert_relative_eq!(rule.cell_boundary_adhesion_energy_parameter(), 0.6);
    }

    #[test]
    fn test_plain_adhesion_ignores_labels() {
        let rule = AdhesionUpdateRule::<2>::new(0.3, 0.4);
        let mut a = Cell::new(CellProliferativeType::Transit, 0.0);
        let b = Cell::new(CellProliferativeType::Stem, 0.0);
        a.set_labelled(true);
        assert_relative_eq!(rule.cell_cell_adhesion_energy(&a, &b), 0.3);
        assert_relative_eq!(rule.cell_boundary_adhesion_energy(&a), 0.4);
    }

    #[test]
    fn test_label_dispatch() {
        let base = AdhesionCoefficients::default();
        let labelled = LabelledAdhesionCoefficients {
            labelled_cell_labelled_cell: 0.3,
            labelled_cell_cell: 0.4,
            labelled_cell_boundary: 0.5,
        };
        let mut l = Cell::new(CellProliferativeType::Transit, 0.0);
        l.set_labelled(true);
        let u = Cell::new(CellProliferativeType::Transit, 0.0);

        assert_relative_eq!(base.cell_cell_energy(&l, &l, Some(&labelled)), 0.3);
        assert_relative_eq!(base.cell_cell_energy(&l, &u, Some(&labelled)), 0.4);
        assert_relative_eq!(base.cell_cell_energy(&u, &l, Some(&labelled)), 0.4);
        assert_relative_eq!(base.cell_cell_energy(&u, &u, Some(&labelled)), 0.1);
        assert_relative_eq!(base.cell_boundary_energy(&l, Some(&labelled)), 0.5);
        assert_relative_eq!(base.cell_boundary_energy(&u, Some(&labelled)), 0.2);
    }

    #[test]
    fn test_info_block() {
        let rule = AdhesionUpdateRule::<2>::new(0.3, 0.4);
        assert_eq!(rule.identifier(), "AdhesionUpdateRule-2");
        let mut out = Vec::new();
        rule.output_update_rule_info(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\t\t<AdhesionUpdateRule-2>\n\
             \t\t\t<CellCellAdhesionEnergyParameter>0.3</CellCellAdhesionEnergyParameter>\n\
             \t\t\t<CellBoundaryAdhesionEnergyParameter>0.4</CellBoundaryAdhesionEnergyParameter>\n\
             \t\t</AdhesionUpdateRule-2>\n"
        );
    }
}
