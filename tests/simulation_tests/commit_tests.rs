//! Commit Protocol Tests
//!
//! Tests verify:
//! - Writes are only staged until a tick runs
//! - Armed triples are applied once and acknowledged with control=1
//! - Control and target may arrive in either order
//! - The always-armed variant applies targets without a handshake

use std::time::Duration;

use ventsim::config::{CommitMode, Config};
use ventsim::registers::{
    Quantity, RegisterStore, RD5_MODE_CONTROL, RD5_MODE_REPORTED, RD5_MODE_TARGET,
    RD5_POWER_CONTROL, RD5_POWER_REPORTED, RD5_POWER_TARGET, RD5_TEMPERATURE_CONTROL,
    RD5_TEMPERATURE_REPORTED, RD5_TEMPERATURE_TARGET,
};
use ventsim::simulation::{Simulation, CONTROL_ACKNOWLEDGED, CONTROL_ARMED};

// =============================================================================
// Helper Functions
// =============================================================================

fn setup(mode: CommitMode) -> (Simulation, RegisterStore) {
    let config = Config::builder().commit_mode(mode).build();
    let store = RegisterStore::new(&config.register_map);
    (Simulation::new(&config), store)
}

fn tick(simulation: &Simulation, store: &RegisterStore) -> usize {
    simulation.tick_at(store, Duration::ZERO).commits.len()
}

// =============================================================================
// Handshake Tests
// =============================================================================

#[test]
fn test_write_is_staged_until_tick() {
    let (simulation, store) = setup(CommitMode::Handshake);

    store.set(RD5_POWER_CONTROL, CONTROL_ARMED);
    store.set(RD5_POWER_TARGET, 75);
    assert_eq!(store.get(RD5_POWER_REPORTED), 40);

    assert_eq!(tick(&simulation, &store), 1);
    assert_eq!(store.get(RD5_POWER_REPORTED), 75);
    assert_eq!(store.get(RD5_POWER_CONTROL), CONTROL_ACKNOWLEDGED);
}

#[test]
fn test_commit_happens_once() {
    let (simulation, store) = setup(CommitMode::Handshake);

    store.set(RD5_POWER_CONTROL, CONTROL_ARMED);
    store.set(RD5_POWER_TARGET, 75);
    assert_eq!(tick(&simulation, &store), 1);

    for _ in 0..5 {
        assert_eq!(tick(&simulation, &store), 0);
    }
    assert_eq!(store.get(RD5_POWER_REPORTED), 75);
    assert_eq!(store.get(RD5_POWER_CONTROL), CONTROL_ACKNOWLEDGED);
}

#[test]
fn test_disarmed_triple_ignores_new_target() {
    let (simulation, store) = setup(CommitMode::Handshake);

    store.set(RD5_POWER_CONTROL, CONTROL_ACKNOWLEDGED);
    store.set(RD5_POWER_TARGET, 90);
    assert_eq!(tick(&simulation, &store), 0);
    assert_eq!(store.get(RD5_POWER_REPORTED), 40);

    store.set(RD5_POWER_CONTROL, CONTROL_ARMED);
    assert_eq!(tick(&simulation, &store), 1);
    assert_eq!(store.get(RD5_POWER_REPORTED), 90);
}

#[test]
fn test_target_before_control() {
    let (simulation, store) = setup(CommitMode::Handshake);

    store.set(RD5_MODE_CONTROL, CONTROL_ACKNOWLEDGED);
    store.set(RD5_MODE_TARGET, 4);
    tick(&simulation, &store);
    assert_eq!(store.get(RD5_MODE_REPORTED), 2);

    store.set(RD5_MODE_CONTROL, CONTROL_ARMED);
    tick(&simulation, &store);
    assert_eq!(store.get(RD5_MODE_REPORTED), 4);
    assert_eq!(store.get(RD5_MODE_CONTROL), CONTROL_ACKNOWLEDGED);
}

#[test]
fn test_armed_with_equal_target_stays_armed() {
    let (simulation, store) = setup(CommitMode::Handshake);

    // Defaults: control armed, target == reported
    assert_eq!(tick(&simulation, &store), 0);
    assert_eq!(store.get(RD5_TEMPERATURE_CONTROL), CONTROL_ARMED);
    assert_eq!(store.get(RD5_TEMPERATURE_REPORTED), 225);
}

#[test]
fn test_all_triples_commit_in_one_tick() {
    let (simulation, store) = setup(CommitMode::Handshake);

    store.set(RD5_POWER_TARGET, 60);
    store.set(RD5_MODE_TARGET, 1);
    store.set(RD5_TEMPERATURE_TARGET, 210);

    let report = simulation.tick_at(&store, Duration::ZERO);
    let quantities: Vec<Quantity> = report.commits.iter().map(|c| c.triple.quantity).collect();
    assert_eq!(quantities, vec![Quantity::Power, Quantity::Mode, Quantity::Temperature]);

    assert_eq!(report.commits[0].previous, 40);
    assert_eq!(report.commits[0].applied, 60);
    assert_eq!(store.get(RD5_MODE_REPORTED), 1);
    assert_eq!(store.get(RD5_TEMPERATURE_REPORTED), 210);
}

// =============================================================================
// Always-Armed Variant Tests
// =============================================================================

#[test]
fn test_always_armed_applies_without_handshake() {
    let (simulation, store) = setup(CommitMode::AlwaysArmed);

    store.set(RD5_POWER_TARGET, 75);
    assert_eq!(tick(&simulation, &store), 1);
    assert_eq!(store.get(RD5_POWER_REPORTED), 75);
    assert_eq!(store.get(RD5_POWER_CONTROL), CONTROL_ARMED);

    store.set(RD5_POWER_TARGET, 20);
    assert_eq!(tick(&simulation, &store), 1);
    assert_eq!(store.get(RD5_POWER_REPORTED), 20);
}

#[test]
fn test_always_armed_resets_control() {
    let (simulation, store) = setup(CommitMode::AlwaysArmed);

    store.set(RD5_POWER_CONTROL, 1);
    store.set(RD5_POWER_TARGET, 50);
    assert_eq!(tick(&simulation, &store), 1);
    assert_eq!(store.get(RD5_POWER_CONTROL), CONTROL_ARMED);
    assert_eq!(store.get(RD5_POWER_REPORTED), 50);
}
