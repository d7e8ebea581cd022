//! Integration tests for the population lifecycle: construction, neighbour
//! queries, cell death, element retirement and result output.

use cellular_potts::prelude::*;

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// 5×4 lattice with four 2×2 elements:
/// e0 = {0, 1, 5, 6}, e1 = {2, 3, 7, 8}, e2 = {10, 11, 15, 16}, e3 = {12, 13, 17, 18}.
fn four_element_population(config: PopulationConfig) -> PottsBasedCellPopulation<2> {
    let mesh = PottsMeshGenerator::new(5, 2, 2, 4, 2, 2).generate().unwrap();
    let cells = CellsGenerator::default().generate_basic(mesh.num_elements());
    PottsBasedCellPopulation::new(mesh, cells, None, config).unwrap()
}

fn reindexing() -> PopulationConfig {
    PopulationConfigBuilder::default()
        .element_retirement(ElementRetirement::Reindex)
        .build()
        .unwrap()
}

#[test]
fn test_generated_layout_and_bijection() {
    init_tracing();
    let population = four_element_population(PopulationConfig::default());

    assert_eq!(population.num_nodes(), 20);
    assert_eq!(population.num_elements(), 4);
    assert_eq!(population.num_cells(), 4);
    assert_eq!(population.element(0).unwrap().node_indices(), &[0, 1, 5, 6]);
    assert_eq!(population.element(3).unwrap().node_indices(), &[12, 13, 17, 18]);
    assert!(population.node(4).unwrap().is_unoccupied());

    for index in 0..4 {
        let key = population.cell_using_location_index(index).unwrap();
        assert_eq!(population.location_index_using_cell(key).unwrap(), index);
    }
    assert!(population.validation_report().is_empty());
}

#[test]
fn test_neighbour_queries_follow_configured_neighbourhood() {
    init_tracing();
    let moore = four_element_population(PopulationConfig::default());
    assert_eq!(
        moore.neighbouring_node_indices_vector(6).unwrap().as_slice(),
        &[11, 10, 5, 0, 1, 2, 7, 12]
    );

    let von_neumann = four_element_population(
        PopulationConfigBuilder::default()
            .neighbourhood(Neighbourhood::VonNeumann)
            .build()
            .unwrap(),
    );
    assert_eq!(
        von_neumann.neighbouring_node_indices_vector(6).unwrap().as_slice(),
        &[11, 5, 1, 7]
    );
    assert_eq!(
        von_neumann.neighbouring_node_indices(0).unwrap(),
        [5, 1].into_iter().collect::<FastHashSet<_>>()
    );
}

#[test]
fn test_tombstone_retirement_keeps_indices() {
    init_tracing();
    let mut population = four_element_population(PopulationConfig::default());
    let survivor = population.cell_using_location_index(2).unwrap();

    let victim = population.cell_using_location_index(1).unwrap();
    population.cell_mut(victim).unwrap().kill();
    assert_eq!(population.num_live_cells(), 3);

    assert_eq!(population.update(true).unwrap(), 1);
    assert_eq!(population.num_elements(), 3);
    assert_eq!(population.mesh().num_all_elements(), 4);
    assert!(population.element(1).unwrap().is_deleted());
    assert!(population.cell(victim).is_none());
    assert_eq!(population.location_index_using_cell(survivor).unwrap(), 2);

    for site in [2, 3, 7, 8] {
        assert!(population.node(site).unwrap().is_unoccupied());
    }
    assert!(population.validate().is_ok());
}

#[test]
fn test_reindex_retirement_renumbers_survivors() {
    init_tracing();
    let mut population = four_element_population(reindexing());
    let moved = population.cell_using_location_index(1).unwrap();
    let last = population.cell_using_location_index(3).unwrap();

    let victim = population.cell_using_location_index(0).unwrap();
    population.cell_mut(victim).unwrap().kill();
    assert_eq!(population.update(true).unwrap(), 1);

    assert_eq!(population.mesh().num_all_elements(), 3);
    assert_eq!(population.location_index_using_cell(moved).unwrap(), 0);
    assert_eq!(population.location_index_using_cell(last).unwrap(), 2);
    assert_eq!(population.element(0).unwrap().node_indices(), &[2, 3, 7, 8]);
    assert!(population.node(2).unwrap().is_in_element(0));
    assert!(!population.node(2).unwrap().is_in_element(1));
    assert!(population.validate().is_ok());
}

#[test]
fn test_update_without_births_or_deaths_does_not_retire() {
    init_tracing();
    let mut population = four_element_population(PopulationConfig::default());
    let victim = population.cell_using_location_index(0).unwrap();
    population.cell_mut(victim).unwrap().kill();

    // The orphaned element is reported, not retired.
    assert_eq!(
        population.update(false),
        Err(PopulationError::InvariantViolation(
            InvariantViolation::ElementWithoutCell { element: 0 }
        ))
    );
    assert_eq!(population.num_elements(), 4);

    assert_eq!(population.update(true).unwrap(), 1);
}

#[test]
fn test_results_skip_dead_and_retired_elements() {
    init_tracing();
    let mut population = four_element_population(PopulationConfig::default());

    let mut before = Vec::new();
    population.write_results(0.0, &mut before).unwrap();
    assert_eq!(
        String::from_utf8(before).unwrap(),
        "0\t4 0 1 5 6 4 2 3 7 8 4 10 11 15 16 4 12 13 17 18 \n"
    );

    let victim = population.cell_using_location_index(2).unwrap();
    population.cell_mut(victim).unwrap().kill();

    let mut dead = Vec::new();
    population.write_results(0.5, &mut dead).unwrap();
    assert_eq!(
        String::from_utf8(dead).unwrap(),
        "0.5\t4 0 1 5 6 4 2 3 7 8 4 12 13 17 18 \n"
    );

    population.update(true).unwrap();
    let mut writer = VizElementsWriter::new(Vec::new());
    writer.write_results(1.0, &population).unwrap();
    assert_eq!(
        String::from_utf8(writer.into_inner().unwrap()).unwrap(),
        "1\t4 0 1 5 6 4 2 3 7 8 4 12 13 17 18 \n"
    );
}

#[test]
fn test_node_rotation_moves_next_site() {
    init_tracing();
    let mut population = four_element_population(PopulationConfig::default());

    // Site 6 is the last site of element 0; site 7 moves from element 1 into it.
    assert_eq!(population.migrate_node(6).unwrap(), Some(0));
    assert!(population.node(7).unwrap().is_in_element(0));
    assert!(!population.node(7).unwrap().is_in_element(1));
    assert_eq!(population.element(0).unwrap().num_nodes(), 5);
    assert_eq!(population.element(1).unwrap().num_nodes(), 3);

    // Unoccupied sites move nothing.
    assert_eq!(population.migrate_node(4).unwrap(), None);
    assert!(population.validate().is_ok());
}

#[test]
fn test_crypt_population_counts() {
    init_tracing();
    let mesh = PottsMeshGenerator::new(5, 2, 2, 4, 2, 2).generate().unwrap();
    let mut ctx = SimulationContext::seeded(7);
    let thresholds = CryptThresholds::new(0.5, 1.0, 2.0, 2.5).unwrap();
    let cells = CellsGenerator::default()
        .generate_for_crypt(&mesh, &mut ctx, &thresholds, None, false)
        .unwrap();
    let population =
        PottsBasedCellPopulation::new(mesh, cells, None, PopulationConfig::default()).unwrap();

    // Bottom elements have centroid y = 0.5, top elements y = 2.5.
    let counts = population.cell_proliferative_type_counts();
    assert_eq!(counts[CellProliferativeType::Stem.index()], 2);
    assert_eq!(counts[CellProliferativeType::Differentiated.index()], 2);
    assert_eq!(counts[CellProliferativeType::Transit.index()], 0);
}
