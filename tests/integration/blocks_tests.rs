//! Block scripts end to end: JSON → WeDo2Blocks → Hub → simulated session.

use std::time::Duration;

use crate::harness::{RecordingSink, SimBlocks, blocks_with, power_history, run_for};

use wedo_hub::adapters::time::ManualClock;
use wedo_hub::app::commands::{BlockCommand, CompareOp, MotorId, TiltDirection, TiltDirectionAny};
use wedo_hub::app::service::Completion;
use wedo_hub::device::motor::MotorState;
use wedo_hub::protocol::codec::PortId;

fn parse(script: &str) -> Vec<BlockCommand> {
    serde_json::from_str(script).expect("valid script")
}

/// Execute each block and wait out its completion like a script runner.
fn run_script(
    blocks: &mut SimBlocks,
    clock: &ManualClock,
    sink: &mut RecordingSink,
    script: &str,
) -> Duration {
    let mut total = Duration::ZERO;
    for command in parse(script) {
        let completion = blocks.execute(command);
        total += completion.wait;
        run_for(
            blocks.hub_mut(),
            clock,
            sink,
            completion.wait.as_millis() as u64,
        );
    }
    total
}

#[test]
fn motor_on_for_script_brakes_and_stops() {
    let (mut blocks, clock, mut sink) = blocks_with(&[(PortId::A, 1)]);
    let waited = run_script(
        &mut blocks,
        &clock,
        &mut sink,
        r#"[{ "opcode": "motorOnFor", "MOTOR_ID": "motor", "DURATION": 1.5 }]"#,
    );
    assert_eq!(waited, Duration::from_millis(1500));
    assert_eq!(
        blocks.hub().motor(PortId::A).unwrap().state(),
        MotorState::Braking
    );

    run_for(blocks.hub_mut(), &clock, &mut sink, 1000);
    assert_eq!(power_history(blocks.hub(), PortId::A), vec![100, 127, 0]);
}

#[test]
fn power_and_direction_script() {
    let (mut blocks, clock, mut sink) = blocks_with(&[(PortId::A, 1), (PortId::B, 1)]);
    run_script(
        &mut blocks,
        &clock,
        &mut sink,
        r#"[
            { "opcode": "startMotorPower", "MOTOR_ID": "motor B", "POWER": 30 },
            { "opcode": "setMotorDirection", "MOTOR_ID": "all motors", "MOTOR_DIRECTION": "that way" },
            { "opcode": "motorOff", "MOTOR_ID": "motor B" }
        ]"#,
    );

    assert_eq!(power_history(blocks.hub(), PortId::B), vec![30, (-30i8) as u8, 0]);
    assert!(
        power_history(blocks.hub(), PortId::A).is_empty(),
        "motor A was never on"
    );
}

#[test]
fn light_and_sound_script() {
    let (mut blocks, clock, mut sink) = blocks_with(&[]);
    let waited = run_script(
        &mut blocks,
        &clock,
        &mut sink,
        r#"[
            { "opcode": "setLightHue", "HUE": 66.67 },
            { "opcode": "playNoteFor", "NOTE": 200, "DURATION": 0.25 },
            { "opcode": "playNoteFor", "NOTE": 60, "DURATION": 0 }
        ]"#,
    );
    assert_eq!(waited, Duration::from_millis(100 + 250));

    let writes = blocks.hub().session().written_bytes();
    assert_eq!(writes.len(), 2);
    // Hue 66.67 % of the wheel is blue.
    assert_eq!(writes[0][..3], [6, 4, 3]);
    assert!(writes[0][5] > 250);
    // Note clamped to 125: 440 * 2^(56/12) ≈ 11175 Hz.
    let hz = u16::from_le_bytes([writes[1][3], writes[1][4]]);
    assert_eq!(hz, 11175);
    assert_eq!(u16::from_le_bytes([writes[1][5], writes[1][6]]), 250);
}

#[test]
fn stop_all_block_silences_everything() {
    let (mut blocks, clock, mut sink) = blocks_with(&[(PortId::A, 1)]);
    blocks.motor_on(MotorId::A);
    blocks.play_note_for(69.0, 3.0);
    blocks.hub_mut().session_mut().clear_writes();

    assert_eq!(blocks.execute(BlockCommand::StopAll), Completion::IMMEDIATE);
    run_for(blocks.hub_mut(), &clock, &mut sink, 100);
    assert_eq!(
        blocks.hub().session().written_bytes(),
        vec![vec![5, 3], vec![1, 1, 1, 0]]
    );
}

#[test]
fn sensor_reporters_follow_notifications() {
    let (mut blocks, clock, mut sink) =
        blocks_with(&[(PortId::A, 35), (PortId::B, 34)]);

    blocks.hub().session().sensor_value(PortId::A, &[64]);
    blocks.hub().session().sensor_value(PortId::B, &[230, 0]);
    run_for(blocks.hub_mut(), &clock, &mut sink, 10);

    assert_eq!(blocks.get_distance(), 64);
    assert!(blocks.when_distance(CompareOp::Greater, 50.0));
    assert_eq!(blocks.get_tilt_angle(TiltDirection::Left), 26);
    assert!(blocks.is_tilted(TiltDirection::Left.into()));
    assert!(!blocks.is_tilted(TiltDirection::Right.into()));
    assert!(blocks.when_tilted(TiltDirectionAny::Any));

    blocks.hub().session().detach(PortId::B);
    run_for(blocks.hub_mut(), &clock, &mut sink, 10);
    assert_eq!(blocks.get_tilt_angle(TiltDirection::Left), 0);
    assert!(!blocks.is_tilted(TiltDirectionAny::Any));
}

#[test]
fn timed_blocks_pace_scripts_without_a_hub() {
    let (mut blocks, clock, mut sink) = blocks_with(&[]);
    blocks.hub_mut().session_mut().drop_link();
    let waited = run_script(
        &mut blocks,
        &clock,
        &mut sink,
        r#"[
            { "opcode": "motorOnFor", "MOTOR_ID": "motor A", "DURATION": 2 },
            { "opcode": "motorOn", "MOTOR_ID": "motor A" }
        ]"#,
    );
    assert_eq!(waited, Duration::from_millis(2100));
    assert!(blocks.hub().session().writes().is_empty());
}
