use super::adhesion::{AdhesionCoefficients, LabelledAdhesionCoefficients, adhesion_contribution};
use super::{UpdateRule, UpdateRuleError, write_parameter};
use crate::core::cell::Cell;
use crate::core::population::PottsBasedCellPopulation;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

/// Adhesion whose coefficients depend on whether the cells in contact carry
/// the label.
///
/// Labelled pairs and labelled cells against the medium use their own
/// coefficients; unlabelled pairs fall back to the plain adhesion
/// coefficients.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DifferentialAdhesionUpdateRule<const D: usize> {
    coefficients: AdhesionCoefficients,
    labelled: LabelledAdhesionCoefficients,
}

impl<const D: usize> DifferentialAdhesionUpdateRule<D> {
    /// Rule with the given unlabelled and labelled coefficients.
    #[must_use]
    pub const fn new(coefficients: AdhesionCoefficients, labelled: LabelledAdhesionCoefficients) -> Self {
        Self { coefficients, labelled }
    }

    /// Cell–cell adhesion energy parameter for unlabelled pairs.
    #[must_use]
    pub const fn cell_cell_adhesion_energy_parameter(&self) -> f64 {
        self.coefficients.cell_cell
    }

    /// Sets the unlabelled cell–cell parameter.
    pub const fn set_cell_cell_adhesion_energy_parameter(&mut self, value: f64) {
        self.coefficients.cell_cell = value;
    }

    /// Cell–boundary adhesion energy parameter for unlabelled cells.
    #[must_use]
    pub const fn cell_boundary_adhesion_energy_parameter(&self) -> f64 {
        self.coefficients.cell_boundary
    }

    /// Sets the unlabelled cell–boundary parameter.
    pub const fn set_cell_boundary_adhesion_energy_parameter(&mut self, value: f64) {
        self.coefficients.cell_boundary = value;
    }

    /// Parameter for two labelled cells.
    #[must_use]
    pub const fn labelled_cell_labelled_cell_adhesion_energy_parameter(&self) -> f64 {
        self.labelled.labelled_cell_labelled_cell
    }

    /// Sets the parameter for two labelled cells.
    pub const fn set_labelled_cell_labelled_cell_adhesion_energy_parameter(&mut self, value: f64) {
        self.labelled.labelled_cell_labelled_cell = value;
    }

    /// Parameter for a labelled and an unlabelled cell.
    #[must_use]
    pub const fn labelled_cell_cell_adhesion_energy_parameter(&self) -> f64 {
        self.labelled.labelled_cell_cell
    }

    /// Sets the parameter for a labelled and an unlabelled cell.
    pub const fn set_labelled_cell_cell_adhesion_energy_parameter(&mut self, value: f64) {
        self.labelled.labelled_cell_cell = value;
    }

    /// Parameter for a labelled cell against the medium.
    #[must_use]
    pub const fn labelled_cell_boundary_adhesion_energy_parameter(&self) -> f64 {
        self.labelled.labelled_cell_boundary
    }

    /// Sets the parameter for a labelled cell against the medium.
    pub const fn set_labelled_cell_boundary_adhesion_energy_parameter(&mut self, value: f64) {
        self.labelled.labelled_cell_boundary = value;
    }

    /// Adhesion energy of one contact between `a` and `b`.
    #[must_use]
    pub fn cell_cell_adhesion_energy(&self, a: &Cell, b: &Cell) -> f64 {
        self.coefficients.cell_cell_energy(a, b, Some(&self.labelled))
    }

    /// Adhesion energy of one contact between `cell` and the medium.
    #[must_use]
    pub fn cell_boundary_adhesion_energy(&self, cell: &Cell) -> f64 {
        self.coefficients.cell_boundary_energy(cell, Some(&self.labelled))
    }
}

impl<const D: usize> UpdateRule<D> for DifferentialAdhesionUpdateRule<D> {
    fn name(&self) -> &'static str {
        "DifferentialAdhesionUpdateRule"
    }

    fn evaluate_hamiltonian_contribution(
        &self,
        target: usize,
        neighbour: Option<usize>,
        population: &PottsBasedCellPopulation<D>,
    ) -> Result<f64, UpdateRuleError> {
        adhesion_contribution(
            &self.coefficients,
            Some(&self.labelled),
            target,
            neighbour,
            population,
        )
    }

    fn output_update_rule_parameters(&self, out: &mut dyn Write) -> io::Result<()> {
        write_parameter(
            out,
            "LabelledCellLabelledCellAdhesionEnergyParameter",
            self.labelled.labelled_cell_labelled_cell,
        )?;
        write_parameter(
            out,
            "LabelledCellCellAdhesionEnergyParameter",
            self.labelled.labelled_cell_cell,
        )?;
        write_parameter(
            out,
            "LabelledCellBoundaryAdhesionEnergyParameter",
            self.labelled.labelled_cell_boundary,
        )?;
        write_parameter(out, "CellCellAdhesionEnergyParameter", self.coefficients.cell_cell)?;
        write_parameter(out, "CellBoundaryAdhesionEnergyParameter", self.coefficients.cell_boundary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults() {
        let rule = DifferentialAdhesionUpdateRule::<2>::default();
        assert_relative_eq!(rule.labelled_cell_labelled_cell_adhesion_energy_parameter(), 0.1);
        assert_relative_eq!(rule.labelled_cell_cell_adhesion_energy_parameter(), 0.1);
        assert_relative_eq!(rule.labelled_cell_boundary_adhesion_energy_parameter(), 0.2);
        assert_relative_eq!(rule.cell_cell_adhesion_energy_parameter(), 0.1);
        assert_relative_eq!(rule.cell_boundary_adhesion_energy_parameter(), 0.2);
    }

    #[test]
    fn test_setters_are_independent() {
        let mut rule = DifferentialAdhesionUpdateRule::<2>::default();
        rule.set_labelled_cell_labelled_cell_adhesion_energy_parameter(0.3);
        rule.set_labelled_cell_cell_adhesion_energy_parameter(0.4);
        rule.set_cell_cell_adhesion_energy_parameter(0.5);
        rule.set_labelled_cell_boundary_adhesion_energy_parameter(0.6);
        rule.set_cell_boundary_adhesion_energy_parameter(0.7);

        assert_relative_eq!(rule.labelled_cell_labelled_cell_adhesion_energy_parameter(), 0.3);
        assert_relative_eq!(rule.labelled_cell_cell_adhesion_energy_parameter(), 0.4);
        assert_relative_eq!(rule.cell_cell_adhesion_energy_parameter(), 0.5);
        assert_relative_eq!(rule.labelled_cell_boundary_adhesion_energy_parameter(), 0.6);
        assert_relative_eq!(rule.cell_boundary_adhesion_energy_parameter(), 0.7);
    }

    #[test]
    fn test_info_block_lists_labelled_parameters_first() {
        let mut rule = DifferentialAdhesionUpdateRule::<2>::default();
        rule.set_labelled_cell_labelled_cell_adhesion_energy_parameter(0.3);
        rule.set_labelled_cell_cell_adhesion_energy_parameter(0.4);
        rule.set_cell_cell_adhesion_energy_parameter(0.5);
        rule.set_labelled_cell_boundary_adhesion_energy_parameter(0.6);
        rule.set_cell_boundary_adhesion_energy_parameter(0.7);
        assert_eq!(rule.identifier(), "DifferentialAdhesionUpdateRule-2");

        let mut out = Vec::new();
        rule.output_update_rule_info(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], "\t\t<DifferentialAdhesionUpdateRule-2>");
        assert_eq!(
            lines[1],
            "\t\t\t<LabelledCellLabelledCellAdhesionEnergyParameter>0.3</LabelledCellLabelledCellAdhesionEnergyParameter>"
        );
        assert_eq!(
            lines[5],
            "\t\t\t<CellBoundaryAdhesionEnergyParameter>0.7</CellBoundaryAdhesionEnergyParameter>"
        );
        assert_eq!(lines[6], "\t\t</DifferentialAdhesionUpdateRule-2>");
    }
}
