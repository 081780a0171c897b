//! Motor timing through the hub: timed runs, braking, re-arming, stop-all.

use crate::harness::{connected_hub, plug, power_history, run_for};

use wedo_hub::device::limiter::SendPolicy;
use wedo_hub::device::motor::{Direction, MotorState};
use wedo_hub::protocol::codec::PortId;

#[test]
fn timed_run_sequence_on_the_wire() {
    let (mut hub, clock, mut sink) = connected_hub();
    plug(&mut hub, &mut sink, &[(PortId::A, 1)]);

    hub.with_motor(PortId::A, |m, now| Some(m.set_on_for(500, now)));
    run_for(&mut hub, &clock, &mut sink, 490);
    assert_eq!(hub.motor(PortId::A).unwrap().state(), MotorState::Running);

    run_for(&mut hub, &clock, &mut sink, 10);
    assert_eq!(hub.motor(PortId::A).unwrap().state(), MotorState::Braking);

    run_for(&mut hub, &clock, &mut sink, 1000);
    assert_eq!(hub.motor(PortId::A).unwrap().state(), MotorState::Off);
    assert_eq!(power_history(&hub, PortId::A), vec![100, 127, 0]);
}

#[test]
fn direction_change_mid_run_keeps_deadline() {
    let (mut hub, clock, mut sink) = connected_hub();
    plug(&mut hub, &mut sink, &[(PortId::B, 1)]);

    hub.with_motor(PortId::B, |m, now| Some(m.set_on_for(2000, now)));
    run_for(&mut hub, &clock, &mut sink, 800);
    hub.with_motor(PortId::B, |m, now| m.set_direction(Direction::Reverse, now));

    let timer = *hub.motor(PortId::B).unwrap().pending_timer().unwrap();
    assert_eq!(timer.deadline_ms(), 2000);

    run_for(&mut hub, &clock, &mut sink, 1200);
    assert_eq!(hub.motor(PortId::B).unwrap().state(), MotorState::Braking);
    assert_eq!(power_history(&hub, PortId::B), vec![100, 156, 127]);
}

#[test]
fn explicit_off_during_braking_cancels_auto_off() {
    let (mut hub, clock, mut sink) = connected_hub();
    plug(&mut hub, &mut sink, &[(PortId::A, 1)]);

    hub.with_motor(PortId::A, |m, now| Some(m.start_braking(now)));
    run_for(&mut hub, &clock, &mut sink, 300);
    hub.with_motor(PortId::A, |m, _| Some(m.set_off(SendPolicy::Limited)));
    run_for(&mut hub, &clock, &mut sink, 2000);

    assert_eq!(power_history(&hub, PortId::A), vec![127, 0]);
}

#[test]
fn auto_off_is_sent_even_when_limiter_is_exhausted() {
    let (mut hub, clock, mut sink) = connected_hub();
    plug(&mut hub, &mut sink, &[(PortId::A, 1)]);

    hub.with_motor(PortId::A, |m, now| Some(m.start_braking(now)));
    clock.set(1000);
    // Exhaust the window the auto-off falls into.
    for _ in 0..40 {
        hub.set_led(0x00_00_FF).unwrap();
    }
    hub.poll();

    assert_eq!(hub.motor(PortId::A).unwrap().state(), MotorState::Off);
    assert_eq!(power_history(&hub, PortId::A), vec![127, 0]);
}

#[test]
fn detach_drops_motor_and_its_timer() {
    let (mut hub, clock, mut sink) = connected_hub();
    plug(&mut hub, &mut sink, &[(PortId::A, 1)]);
    hub.with_motor(PortId::A, |m, now| Some(m.set_on_for(1000, now)));

    hub.session().detach(PortId::A);
    run_for(&mut hub, &clock, &mut sink, 3000);
    assert!(hub.motor(PortId::A).is_none());
    assert_eq!(power_history(&hub, PortId::A), vec![100]);
}

#[test]
fn stop_all_bypasses_exhausted_limiter() {
    let (mut hub, _, mut sink) = connected_hub();
    plug(&mut hub, &mut sink, &[(PortId::A, 1), (PortId::B, 1)]);
    hub.with_motor(PortId::A, |m, _| Some(m.set_on()));
    hub.with_motor(PortId::B, |m, _| Some(m.set_on()));
    for _ in 0..40 {
        hub.set_led(0xFF_FF_FF).unwrap();
    }
    hub.session_mut().clear_writes();

    hub.stop_all();
    assert_eq!(
        hub.session().written_bytes(),
        vec![vec![5, 3], vec![1, 1, 1, 0], vec![2, 1, 1, 0]]
    );
    assert!(!hub.motor(PortId::A).unwrap().is_on());
    assert!(!hub.motor(PortId::B).unwrap().is_on());
}
