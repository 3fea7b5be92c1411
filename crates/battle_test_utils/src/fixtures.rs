//! Test fixtures and helpers.
//!
//! Pre-built battlefields for consistent testing. Every fixture has had
//! its spawns admitted already, so slot `i` holds the `i`-th soldier
//! listed in the fixture's docs.

use std::f32::consts::PI;

use battle_core::battlefield::{Battlefield, TickEvents};
use battle_core::soldier::{Soldier, SoldierId};

/// Handle of the first occupant of `slot`.
#[must_use]
pub fn first_gen(slot: u32) -> SoldierId {
    SoldierId::new(slot, 0)
}

/// Admit everything queued so far without advancing any soldier.
///
/// Runs a zero-length tick, so the tick counter advances by one.
pub fn admit(field: &mut Battlefield) -> TickEvents {
    field.tick(0.0)
}

/// Battlefield holding exactly `soldiers`, in order.
#[must_use]
pub fn battlefield_with(soldiers: Vec<Soldier>) -> Battlefield {
    let mut field = Battlefield::new();
    for soldier in soldiers {
        field.request_spawn(soldier);
    }
    admit(&mut field);
    field
}

/// Two baseline soldiers facing each other `distance` apart on the x axis.
///
/// Slot 0 is team 0 at the origin, slot 1 is team 1 at `(distance, 0)`.
#[must_use]
pub fn duel(distance: f32) -> Battlefield {
    battlefield_with(vec![
        Soldier::new(0.0, 0.0, 0.0, 0),
        Soldier::new(distance, 0.0, PI, 1),
    ])
}

/// Two opposing lines of `per_side` soldiers, `gap` units apart.
///
/// Even slots are team 0 on x = 0, odd slots are team 1 on x = `gap`.
#[must_use]
pub fn skirmish(per_side: usize, gap: f32) -> Battlefield {
    let mut soldiers = Vec::with_capacity(per_side * 2);
    for i in 0..per_side {
        let y = i as f32 * 40.0;
        soldiers.push(Soldier::new(0.0, y, 0.0, 0));
        soldiers.push(Soldier::new(gap, y, PI, 1));
    }
    battlefield_with(soldiers)
}

/// Run `ticks` ticks of `delta` seconds, collecting every event.
pub fn run_ticks(field: &mut Battlefield, ticks: usize, delta: f32) -> Vec<TickEvents> {
    (0..ticks).map(|_| field.tick(delta)).collect()
}
