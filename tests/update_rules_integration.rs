//! Integration tests for the Hamiltonian terms evaluated against generated
//! populations.

use approx::assert_relative_eq;
use cellular_potts::prelude::*;

/// 4×4 lattice: e0 = {1, 2, 5, 6}, e1 = {9, 10, 13, 14}.
fn stacked_population(neighbourhood: Neighbourhood) -> PottsBasedCellPopulation<2> {
    let mesh = PottsMeshGenerator::new(4, 1, 2, 4, 2, 2).generate().unwrap();
    let cells = CellsGenerator::default().generate_basic(mesh.num_elements());
    let config = PopulationConfigBuilder::default()
        .neighbourhood(neighbourhood)
        .build()
        .unwrap();
    PottsBasedCellPopulation::new(mesh, cells, None, config).unwrap()
}

/// 5×4 lattice: e0 = {0, 1, 5, 6}, e1 = {2, 3, 7, 8}, e2 = {10, 11, 15, 16},
/// e3 = {12, 13, 17, 18}; column x = 4 is medium.
fn tiled_population() -> PottsBasedCellPopulation<2> {
    let mesh = PottsMeshGenerator::new(5, 2, 2, 4, 2, 2).generate().unwrap();
    let cells = CellsGenerator::default().generate_basic(mesh.num_elements());
    PottsBasedCellPopulation::new(mesh, cells, None, PopulationConfig::default()).unwrap()
}

fn label(population: &mut PottsBasedCellPopulation<2>, location: usize) {
    let key = population.cell_using_location_index(location).unwrap();
    population.cell_mut(key).unwrap().set_labelled(true);
}

// =============================================================================
// VOLUME CONSTRAINT
// =============================================================================

#[test]
fn test_volume_constraint_ignores_neighbour() {
    let population = stacked_population(Neighbourhood::Moore);
    let rule = VolumeConstraintUpdateRule::<2>::new(1.0, 16.0);

    for neighbour in [None, Some(1)] {
        assert_relative_eq!(
            rule.evaluate_hamiltonian_contribution(0, neighbour, &population)
                .unwrap(),
            144.0
        );
    }

    let at_target = VolumeConstraintUpdateRule::<2>::new(0.5, 4.0);
    assert_relative_eq!(
        at_target
            .evaluate_hamiltonian_contribution(1, None, &population)
            .unwrap(),
        0.0
    );
}

#[test]
fn test_volume_tracks_site_moves() {
    let mut population = stacked_population(Neighbourhood::Moore);
    let rule = VolumeConstraintUpdateRule::<2>::new(1.0, 4.0);

    // Site 7 is medium; rotating after site 6 grows element 0 to five sites.
    population.migrate_node(6).unwrap();
    assert_relative_eq!(
        rule.evaluate_hamiltonian_contribution(0, None, &population)
            .unwrap(),
        1.0
    );
}

// =============================================================================
// ADHESION
// =============================================================================

#[test]
fn test_adhesion_counts_moore_contacts() {
    let population = stacked_population(Neighbourhood::Moore);
    let rule = AdhesionUpdateRule::<2>::default();

    assert_relative_eq!(
        rule.evaluate_hamiltonian_contribution(0, Some(1), &population)
            .unwrap(),
        0.4
    );
    assert_relative_eq!(
        rule.evaluate_hamiltonian_contribution(1, Some(0), &population)
            .unwrap(),
        0.4
    );
    assert_relative_eq!(
        rule.evaluate_hamiltonian_contribution(0, None, &population)
            .unwrap(),
        2.0
    );
    assert_relative_eq!(
        rule.evaluate_hamiltonian_contribution(0, Some(0), &population)
            .unwrap(),
        0.0
    );
}

#[test]
fn test_adhesion_counts_von_neumann_contacts() {
    let population = stacked_population(Neighbourhood::VonNeumann);
    let rule = AdhesionUpdateRule::<2>::default();

    assert_relative_eq!(
        rule.evaluate_hamiltonian_contribution(0, Some(1), &population)
            .unwrap(),
        0.2
    );
    assert_relative_eq!(
        rule.evaluate_hamiltonian_contribution(0, None, &population)
            .unwrap(),
        0.8
    );
}

#[test]
fn test_adhesion_counts_single_diagonal_contact() {
    let population = tiled_population();
    let rule = AdhesionUpdateRule::<2>::new(0.7, 0.9);
    // Only site 6 of e0 touches e3, through its north-east neighbour 12.
    assert_relative_eq!(
        rule.evaluate_hamiltonian_contribution(0, Some(3), &population)
            .unwrap(),
        0.7
    );
}

#[test]
fn test_adhesion_rejects_retired_element() {
    let mut population = tiled_population();
    let key = population.cell_using_location_index(0).unwrap();
    population.cell_mut(key).unwrap().kill();
    population.update(true).unwrap();

    let rule = AdhesionUpdateRule::<2>::default();
    let error = rule
        .evaluate_hamiltonian_contribution(0, None, &population)
        .unwrap_err();
    assert!(matches!(
        error,
        UpdateRuleError::Population(PopulationError::Mesh(MeshError::ElementDeleted { index: 0 }))
    ));
}

// =============================================================================
// DIFFERENTIAL ADHESION
// =============================================================================

#[test]
fn test_differential_adhesion_with_defaults_matches_plain_adhesion() {
    let mut population = tiled_population();
    label(&mut population, 0);
    label(&mut population, 1);

    let rule = DifferentialAdhesionUpdateRule::<2>::default();
    assert_relative_eq!(
        rule.evaluate_hamiltonian_contribution(0, Some(1), &population)
            .unwrap(),
        0.4
    );
}

#[test]
fn test_differential_adhesion_dispatches_on_labels() {
    let mut population = tiled_population();
    let mut rule = DifferentialAdhesionUpdateRule::<2>::default();
    rule.set_labelled_cell_labelled_cell_adhesion_energy_parameter(0.3);
    rule.set_labelled_cell_cell_adhesion_energy_parameter(0.4);
    rule.set_labelled_cell_boundary_adhesion_energy_parameter(0.5);

    // Four contacts between e0 and e1; five between e1 and the medium.
    assert_relative_eq!(
        rule.evaluate_hamiltonian_contribution(0, Some(1), &population)
            .unwrap(),
        0.4
    );
    assert_relative_eq!(
        rule.evaluate_hamiltonian_contribution(1, None, &population)
            .unwrap(),
        1.0
    );

    label(&mut population, 1);
    assert_relative_eq!(
        rule.evaluate_hamiltonian_contribution(0, Some(1), &population)
            .unwrap(),
        1.6
    );
    assert_relative_eq!(
        rule.evaluate_hamiltonian_contribution(1, None, &population)
            .unwrap(),
        2.5
    );

    label(&mut population, 0);
    assert_relative_eq!(
        rule.evaluate_hamiltonian_contribution(0, Some(1), &population)
            .unwrap(),
        1.2,
        epsilon = 1e-12
    );
}

// =============================================================================
// HAMILTONIAN
// =============================================================================

#[test]
fn test_hamiltonian_dump_concatenates_rule_blocks() {
    let mut hamiltonian = Hamiltonian::<2>::new();
    hamiltonian.add_rule(VolumeConstraintUpdateRule::<2>::new(0.1, 20.0));
    hamiltonian.add_rule(AdhesionUpdateRule::<2>::default());

    let mut out = Vec::new();
    hamiltonian.output_update_rules_info(&mut out).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "\t\t<VolumeConstraintUpdateRule-2>\n\
         \t\t\t<DeformationEnergyParameter>0.1</DeformationEnergyParameter>\n\
         \t\t\t<MatureCellTargetVolume>20</MatureCellTargetVolume>\n\
         \t\t</VolumeConstraintUpdateRule-2>\n\
         \t\t<AdhesionUpdateRule-2>\n\
         \t\t\t<CellCellAdhesionEnergyParameter>0.1</CellCellAdhesionEnergyParameter>\n\
         \t\t\t<CellBoundaryAdhesionEnergyParameter>0.2</CellBoundaryAdhesionEnergyParameter>\n\
         \t\t</AdhesionUpdateRule-2>\n"
    );
}

#[test]
fn test_hamiltonian_sum_of_terms() {
    let population = tiled_population();
    let hamiltonian: Hamiltonian<2> = [
        PottsUpdateRule::from(VolumeConstraintUpdateRule::<2>::new(0.5, 6.0)),
        AdhesionUpdateRule::<2>::default().into(),
        DifferentialAdhesionUpdateRule::<2>::default().into(),
    ]
    .into_iter()
    .collect();

    // 0.5·(4 − 6)² + 2 × (5 contacts × 0.2)
    assert_relative_eq!(hamiltonian.evaluate(1, None, &population).unwrap(), 4.0);
}
