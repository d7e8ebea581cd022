use super::{UpdateRule, UpdateRuleError, write_parameter};
use crate::core::population::{PopulationError, PottsBasedCellPopulation};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

/// Volume constraint `λ·(V − V*)²`.
///
/// `V` is the current site count of the target element, `λ` the deformation
/// energy parameter and `V*` the mature cell target volume. The neighbour is
/// ignored.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VolumeConstraintUpdateRule<const D: usize> {
    deformation_energy_parameter: f64,
    mature_cell_target_volume: f64,
}

impl<const D: usize> Default for VolumeConstraintUpdateRule<D> {
    fn default() -> Self {
        Self {
            deformation_energy_parameter: 0.5,
            mature_cell_target_volume: 16.0,
        }
    }
}

impl<const D: usize> VolumeConstraintUpdateRule<D> {
    /// Rule with the given parameters.
    #[must_use]
    pub const fn new(deformation_energy_parameter: f64, mature_cell_target_volume: f64) -> Self {
        Self {
            deformation_energy_parameter,
            mature_cell_target_volume,
        }
    }

    /// `λ`.
    #[must_use]
    pub const fn deformation_energy_parameter(&self) -> f64 {
        self.deformation_energy_parameter
    }

    /// Sets `λ`.
    pub const fn set_deformation_energy_parameter(&mut self, value: f64) {
        self.deformation_energy_parameter = value;
    }

    /// `V*`.
    #[must_use]
    pub const fn mature_cell_target_volume(&self) -> f64 {
        self.mature_cell_target_volume
    }

    /// Sets `V*`.
    pub const fn set_mature_cell_target_volume(&mut self, value: f64) {
        self.mature_cell_target_volume = value;
    }
}

impl<const D: usize> UpdateRule<D> for VolumeConstraintUpdateRule<D> {
    fn name(&self) -> &'static str {
        "VolumeConstraintUpdateRule"
    }

    fn evaluate_hamiltonian_contribution(
        &self,
        target: usize,
        _neighbour: Option<usize>,
        population: &PottsBasedCellPopulation<D>,
    ) -> Result<f64, UpdateRuleError> {
        let element = population
            .mesh()
            .active_element(target)
            .map_err(PopulationError::from)?;
        #[allow(clippy::cast_precision_loss)]
        let volume = element.num_nodes() as f64;
        let deviation = volume - self.mature_cell_target_volume;
        Ok(self.deformation_energy_parameter * deviation * deviation)
    }

    fn output_update_rule_parameters(&self, out: &mut dyn Write) -> io::Result<()> {
        write_parameter(out, "DeformationEnergyParameter", self.deformation_energy_parameter)?;
        write_parameter(out, "MatureCellTargetVolume", self.mature_cell_target_volume)
    }
}
