//! Tests for Engine
//!
//! These tests verify:
//! - Read dispatch, including gaps of unknown registers
//! - Single and multiple writes, with echo responses
//! - Unknown writes are echoed but not stored
//! - Writes never change reported state of a commit triple by themselves
//! - Frame-level error handling (unsupported, malformed)

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use bytes::Bytes;
use ventsim::config::Config;
use ventsim::engine::Engine;
use ventsim::protocol::{Frame, Header, Request, Response};
use ventsim::registers::{
    RegisterMap, RD5_MODE_REPORTED, RD5_POWER_CONTROL, RD5_POWER_REPORTED, RD5_POWER_TARGET,
    RD5_TEMPERATURE_REPORTED,
};
use ventsim::simulation::Simulation;
use ventsim::SimError;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_engine() -> Engine {
    Engine::new(&Config::default()).unwrap()
}

fn read(engine: &Engine, start: u16, count: u16) -> Vec<u16> {
    match engine.execute(Request::ReadHoldingRegisters { start, count }) {
        Response::ReadHoldingRegisters { values } => values,
        other => panic!("Expected read response, got {:?}", other),
    }
}

fn frame(function: u8, payload: &[u8]) -> Frame {
    Frame {
        header: Header {
            transaction_id: 1,
            protocol_id: 0,
            length: 2 + payload.len() as u16,
            unit_id: 1,
            function,
        },
        payload: Bytes::copy_from_slice(payload),
    }
}

// =============================================================================
// Construction Tests
// =============================================================================

#[test]
fn test_engine_rejects_invalid_map() {
    let map = RegisterMap::atrea_rd5().with_outdoor(RD5_POWER_CONTROL, 0);
    let config = Config::builder().register_map(map).build();

    assert!(matches!(Engine::new(&config), Err(SimError::Config(_))));
}

// =============================================================================
// Read Tests
// =============================================================================

#[test]
fn test_read_reported_block() {
    let engine = setup_engine();
    assert_eq!(read(&engine, RD5_POWER_REPORTED, 3), vec![40, 2, 225]);
}

#[test]
fn test_read_with_gaps_returns_zero_for_unknown() {
    let engine = setup_engine();

    // 10700..=10710: ctrl x3, gap, reported x3, gap, target x3
    let values = read(&engine, RD5_POWER_CONTROL, 11);
    assert_eq!(values, vec![0, 0, 0, 0, 40, 2, 225, 0, 40, 2, 225]);
    assert_eq!(engine.store().diagnostics().unknown_reads, 2);
}

#[test]
fn test_read_zero_registers() {
    let engine = setup_engine();
    assert!(read(&engine, RD5_POWER_REPORTED, 0).is_empty());
}

// =============================================================================
// Write Tests
// =============================================================================

#[test]
fn test_write_single_echoes_and_stores() {
    let engine = setup_engine();

    let response = engine.execute(Request::WriteSingleRegister {
        address: RD5_POWER_TARGET,
        value: 75,
    });
    assert_eq!(
        response,
        Response::WriteSingleRegister { address: RD5_POWER_TARGET, value: 75 }
    );
    assert_eq!(read(&engine, RD5_POWER_TARGET, 1), vec![75]);
}

#[test]
fn test_write_single_unchanged_still_echoes() {
    let engine = setup_engine();

    let response = engine.execute(Request::WriteSingleRegister {
        address: RD5_POWER_TARGET,
        value: 40,
    });
    assert_eq!(
        response,
        Response::WriteSingleRegister { address: RD5_POWER_TARGET, value: 40 }
    );
}

#[test]
fn test_write_unknown_echoes_but_reads_zero() {
    let engine = setup_engine();

    let response = engine.execute(Request::WriteSingleRegister { address: 4242, value: 17 });
    assert_eq!(response, Response::WriteSingleRegister { address: 4242, value: 17 });
    assert_eq!(read(&engine, 4242, 1), vec![0]);
}

#[test]
fn test_write_multiple_echoes_start_and_count() {
    let engine = setup_engine();

    let response = engine.execute(Request::WriteMultipleRegisters {
        start: RD5_POWER_TARGET,
        values: vec![80, 3, 200],
    });
    assert_eq!(
        response,
        Response::WriteMultipleRegisters { start: RD5_POWER_TARGET, count: 3 }
    );
    assert_eq!(read(&engine, RD5_POWER_TARGET, 3), vec![80, 3, 200]);
}

#[test]
fn test_write_multiple_skips_unknown_addresses() {
    let engine = setup_engine();

    // 10706 reported, 10707 unknown, 10708 target
    engine.execute(Request::WriteMultipleRegisters {
        start: RD5_TEMPERATURE_REPORTED,
        values: vec![230, 5, 90],
    });

    assert_eq!(read(&engine, RD5_TEMPERATURE_REPORTED, 3), vec![230, 0, 90]);
    assert_eq!(engine.store().diagnostics().unknown_writes, 1);
}

#[test]
fn test_write_does_not_commit_by_itself() {
    let engine = setup_engine();

    engine.execute(Request::WriteSingleRegister { address: RD5_POWER_CONTROL, value: 0 });
    engine.execute(Request::WriteSingleRegister { address: RD5_POWER_TARGET, value: 75 });

    assert_eq!(read(&engine, RD5_POWER_REPORTED, 1), vec![40]);

    let simulation = Simulation::new(&Config::default());
    simulation.tick_at(engine.store(), Duration::ZERO);

    assert_eq!(read(&engine, RD5_POWER_REPORTED, 1), vec![75]);
    assert_eq!(read(&engine, RD5_POWER_CONTROL, 1), vec![1]);
}

// =============================================================================
// Frame Handling Tests
// =============================================================================

#[test]
fn test_handle_frame_read() {
    let engine = setup_engine();

    let response = engine.handle(&frame(0x03, &[0x29, 0xD1, 0x00, 0x01])).unwrap();
    assert_eq!(response, Response::ReadHoldingRegisters { values: vec![2] });
    assert_eq!(read(&engine, RD5_MODE_REPORTED, 1), vec![2]);
}

#[test]
fn test_handle_unsupported_function() {
    let engine = setup_engine();

    for function in [0x01, 0x02, 0x04, 0x05, 0x0F, 0x17, 0x2B] {
        assert!(matches!(
            engine.handle(&frame(function, &[0, 0, 0, 1])),
            Err(SimError::UnsupportedFunction(f)) if f == function
        ));
    }
}

#[test]
fn test_handle_malformed_payload() {
    let engine = setup_engine();

    assert!(matches!(
        engine.handle(&frame(0x06, &[0x29])),
        Err(SimError::MalformedRequest(_))
    ));
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_multi_writes_and_ticks() {
    let engine = Arc::new(setup_engine());
    let simulation = Simulation::new(&Config::default());

    let writers: Vec<_> = (0..4u16)
        .map(|i| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for round in 0..50u16 {
                    engine.execute(Request::WriteMultipleRegisters {
                        start: RD5_POWER_CONTROL,
                        values: vec![0, 0, 0],
                    });
                    engine.execute(Request::WriteSingleRegister {
                        address: RD5_POWER_TARGET,
                        value: i * 100 + round,
                    });
                }
            })
        })
        .collect();

    for _ in 0..50 {
        simulation.tick_at(engine.store(), Duration::ZERO);
    }
    for writer in writers {
        writer.join().unwrap();
    }

    // Arm once more and let the last staged target land
    engine.execute(Request::WriteSingleRegister { address: RD5_POWER_CONTROL, value: 0 });
    simulation.tick_at(engine.store(), Duration::ZERO);

    let target = read(&engine, RD5_POWER_TARGET, 1)[0];
    assert_eq!(read(&engine, RD5_POWER_REPORTED, 1), vec![target]);
}
