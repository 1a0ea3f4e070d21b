//! SPS - headless runner
//!
//! Loads a config and a level, then drives the simulation with a scripted
//! input sequence at the configured tick rate and logs what happens.
//!
//! ```text
//! sps [config.toml] [level.toml] [ticks]
//! ```
//!
//! Without a level the built-in test arena is used. Set `RUST_LOG=debug` to
//! see spawns, despawns and poses.

use std::env;
use std::path::Path;

use anyhow::{Context, Result};
use glam::Vec3;
use sps_game::{
    EntityId, EntityKind, Level, PlayerInput, Simulation, SimulationConfig, TransformSink,
    WeaponKind,
};

const DEFAULT_TICKS: u64 = 600;

/// Forwards poses to the log.
#[derive(Default)]
struct LogSink {
    updates: usize,
}

impl TransformSink for LogSink {
    fn set_position(&mut self, entity: EntityId, position: Vec3) {
        self.updates += 1;
        log::trace!("{entity:?} at {position:.2}");
    }

    fn set_rotation(&mut self, entity: EntityId, rotation: Vec3) {
        log::trace!("{entity:?} rotated to {rotation:.1}");
    }
}

/// Input for tick `frame`: walk a square, turn, shoot in bursts, press a key
/// every second so a dead player comes back.
fn scripted_input(frame: u64, tick_rate: u64) -> PlayerInput {
    let second = frame / tick_rate.max(1);
    let mut input = PlayerInput::default();

    match second % 4 {
        0 => input.movement.forward = true,
        1 => input.movement.right = true,
        2 => input.movement.backward = true,
        _ => input.movement.left = true,
    }
    input.mouse_delta = (2.0, 0.0);
    input.actions.sprint = second % 2 == 0;
    input.actions.jump = frame % (tick_rate * 3) == 0;
    input.actions.fire = frame % tick_rate < tick_rate / 4;
    input.key_pressed = frame % tick_rate == 0;

    if frame == tick_rate * 5 {
        input.select_weapon = Some(WeaponKind::Flamethrower);
    }
    input
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();

    let config = match args.first() {
        Some(path) => SimulationConfig::load(Path::new(path))
            .with_context(|| format!("loading config {path}"))?,
        None => SimulationConfig::default(),
    };
    let level = match args.get(1) {
        Some(path) => {
            Level::load(Path::new(path)).with_context(|| format!("loading level {path}"))?
        }
        None => Level::test_arena(),
    };
    let ticks = match args.get(2) {
        Some(n) => n.parse().with_context(|| format!("bad tick count `{n}`"))?,
        None => DEFAULT_TICKS,
    };

    let tick_rate = u64::from(config.tick_rate);
    let mut simulation = Simulation::new(config, level).context("starting simulation")?;
    let mut sink = LogSink::default();

    for frame in 0..ticks {
        simulation.tick(&scripted_input(frame, tick_rate));
        simulation.flush_poses(&mut sink);

        if frame % tick_rate == 0 {
            if let Some(player) = simulation.player() {
                log::info!(
                    "t={:.2}s pos={:.2} health={} ammo={} drones={}",
                    simulation.clock().time,
                    player.position(),
                    player.health,
                    player.weapon.ammo,
                    simulation.count(EntityKind::Drone),
                );
            }
        }
    }

    log::info!(
        "ran {ticks} ticks, {} pose updates, {} turrets left",
        sink.updates,
        simulation.count(EntityKind::Turret)
    );
    Ok(())
}
