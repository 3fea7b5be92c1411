//! Battlefield storage and the per-tick simulation loop.
//!
//! The battlefield owns every soldier in a slot array that never shrinks.
//! Dead soldiers keep their slot until a later spawn overwrites it, and
//! spawns requested at any time are buffered and only admitted in a
//! dedicated phase, so the slot array is never mutated while it is being
//! scanned.
//!
//! # Tick Order
//!
//! 1. **Targeting / combat / movement** - every live soldier in slot order
//! 2. **Admission** - pending spawns move into dead slots or new ones
//! 3. **Death sweep** - soldiers at or below zero health are marked dead
//!
//! Deaths are only marked in step 3, so a soldier whose health crosses zero
//! can still be hit by later attackers in the same tick.
//!
//! # Example
//!
//! ```
//! use battle_core::battlefield::Battlefield;
//!
//! let mut field = Battlefield::new();
//! field.spawn(0.0, 0.0, 0.0, 0);
//! field.spawn(300.0, 0.0, std::f32::consts::PI, 1);
//!
//! // Spawns are admitted during the tick
//! let events = field.tick(0.0);
//! assert_eq!(events.spawned.len(), 2);
//! assert_eq!(field.live_count(), 2);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::{BattleError, Result};
use crate::soldier::{Soldier, SoldierId, TeamId};
use crate::stats::{BattlefieldConfig, TargetingPolicy};

/// A soldier together with the generation of its slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Slot {
    generation: u32,
    soldier: Soldier,
}

/// A soldier picked up a new target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetAcquired {
    /// The soldier that acquired.
    pub soldier: SoldierId,
    /// The chosen target.
    pub target: SoldierId,
}

/// An attack landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageEvent {
    /// Soldier that attacked.
    pub attacker: SoldierId,
    /// Soldier that was hit.
    pub target: SoldierId,
    /// Damage applied.
    pub damage: i32,
}

/// Events generated during a single tick.
///
/// The simulation does not need them; drivers use them for effects and
/// reporting without diffing state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickEvents {
    /// Targets acquired this tick.
    pub acquisitions: Vec<TargetAcquired>,
    /// Attacks that landed this tick.
    pub damage_events: Vec<DamageEvent>,
    /// Soldiers admitted from the spawn buffer this tick.
    pub spawned: Vec<SoldierId>,
    /// Soldiers marked dead by this tick's sweep.
    pub deaths: Vec<SoldierId>,
}

impl TickEvents {
    /// Whether nothing observable happened.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.acquisitions.is_empty()
            && self.damage_events.is_empty()
            && self.spawned.is_empty()
            && self.deaths.is_empty()
    }
}

/// The battlefield simulation.
///
/// Owns the slot storage and the spawn buffer exclusively. Presentation
/// code reads soldiers through [`soldiers`](Self::soldiers) and injects new
/// ones through [`spawn`](Self::spawn).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Battlefield {
    /// Ticks completed so far.
    tick: u64,
    /// Storage and targeting settings.
    config: BattlefieldConfig,
    /// Logical slot capacity, grown by [`grow`](Self::grow).
    capacity: usize,
    /// Slot storage. Never shrinks.
    slots: Vec<Slot>,
    /// Soldiers waiting for the next admission phase.
    pending: Vec<Soldier>,
}

impl Battlefield {
    /// Create an empty battlefield with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(BattlefieldConfig::default())
    }

    /// Create an empty battlefield with the given configuration.
    #[must_use]
    pub fn with_config(config: BattlefieldConfig) -> Self {
        let config = BattlefieldConfig {
            growth_increment: config.growth_increment.max(1),
            ..config
        };
        Self {
            tick: 0,
            capacity: config.initial_capacity,
            slots: Vec::with_capacity(config.initial_capacity),
            pending: Vec::with_capacity(config.pending_capacity),
            config,
        }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &BattlefieldConfig {
        &self.config
    }

    /// Number of ticks completed.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Number of slots in use, dead or alive.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Logical slot capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Soldiers waiting for admission.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Number of soldiers not yet marked dead.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|s| !s.soldier.is_dead).count()
    }

    /// Number of live soldiers on `team`.
    #[must_use]
    pub fn live_count_for_team(&self, team: TeamId) -> usize {
        self.slots
            .iter()
            .filter(|s| !s.soldier.is_dead && s.soldier.team == team)
            .count()
    }

    /// Teams that still have at least one live soldier, in ascending order.
    #[must_use]
    pub fn teams_alive(&self) -> Vec<TeamId> {
        let mut teams: Vec<TeamId> = self
            .slots
            .iter()
            .filter(|s| !s.soldier.is_dead)
            .map(|s| s.soldier.team)
            .collect();
        teams.sort_unstable();
        teams.dedup();
        teams
    }

    /// Queue a baseline soldier for admission on the next tick.
    pub fn spawn(&mut self, x: f32, y: f32, facing: f32, team: TeamId) {
        self.request_spawn(Soldier::new(x, y, facing, team));
    }

    /// Queue an already-built soldier for admission on the next tick.
    ///
    /// Never touches the live slots.
    pub fn request_spawn(&mut self, soldier: Soldier) {
        tracing::trace!(x = soldier.x, y = soldier.y, team = soldier.team, "Spawn requested");
        self.pending.push(soldier);
    }

    /// Look up a soldier by handle. Stale handles resolve to `None`.
    #[must_use]
    pub fn get(&self, id: SoldierId) -> Option<&Soldier> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation)
            .map(|slot| &slot.soldier)
    }

    /// Look up a soldier by handle, reporting stale handles as an error.
    pub fn try_get(&self, id: SoldierId) -> Result<&Soldier> {
        self.get(id).ok_or(BattleError::StaleHandle {
            slot: id.slot,
            generation: id.generation,
        })
    }

    /// Iterate over every occupied slot in slot order, dead soldiers included.
    pub fn soldiers(&self) -> impl Iterator<Item = (SoldierId, &Soldier)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, slot)| (SoldierId::new(i as u32, slot.generation), &slot.soldier))
    }

    /// Iterate over live soldiers in slot order.
    pub fn live_soldiers(&self) -> impl Iterator<Item = (SoldierId, &Soldier)> {
        self.soldiers().filter(|(_, s)| !s.is_dead)
    }

    /// Grow slot capacity to `new_capacity`.
    ///
    /// # Errors
    ///
    /// Returns [`BattleError::InvalidCapacity`] if `new_capacity` does not
    /// exceed the number of occupied slots.
    pub fn grow(&mut self, new_capacity: usize) -> Result<()> {
        let occupied = self.slots.len();
        if new_capacity <= occupied {
            return Err(BattleError::InvalidCapacity {
                occupied,
                requested: new_capacity,
            });
        }

        self.slots.reserve_exact(new_capacity - occupied);
        tracing::debug!(
            from = self.capacity,
            to = new_capacity,
            "Battlefield storage grown"
        );
        self.capacity = new_capacity;
        Ok(())
    }

    /// Advance the simulation by `delta_seconds`.
    ///
    /// Negative or non-finite deltas are treated as zero.
    pub fn tick(&mut self, delta_seconds: f32) -> TickEvents {
        let mut events = TickEvents::default();

        let delta = if delta_seconds.is_finite() && delta_seconds >= 0.0 {
            delta_seconds
        } else {
            tracing::warn!(delta_seconds, "Invalid tick delta, using 0");
            0.0
        };

        // 1. Targeting, combat and movement in stable slot order
        for index in 0..self.slots.len() {
            self.update_soldier(index, delta, &mut events);
        }

        // 2. Admission
        self.admit_pending(&mut events);

        // 3. Death sweep
        self.sweep_dead(&mut events);

        self.tick += 1;

        if !events.is_empty() {
            tracing::debug!(
                tick = self.tick,
                acquired = events.acquisitions.len(),
                hits = events.damage_events.len(),
                spawned = events.spawned.len(),
                deaths = events.deaths.len(),
                "Tick complete"
            );
        }

        events
    }

    /// Handle for the current occupant of slot `index`.
    fn id_at(&self, index: usize) -> SoldierId {
        SoldierId::new(index as u32, self.slots[index].generation)
    }

    /// Whether `id` refers to a soldier that has not been swept.
    fn is_live(&self, id: SoldierId) -> bool {
        self.get(id).is_some_and(Soldier::is_alive)
    }

    /// Targeting policy followed by combat or movement for one soldier.
    fn update_soldier(&mut self, index: usize, delta: f32, events: &mut TickEvents) {
        if self.slots[index].soldier.is_dead {
            return;
        }

        if let Some(target) = self.slots[index].soldier.target {
            if !self.is_live(target) {
                self.slots[index].soldier.target = None;
            }
        }

        match self.slots[index].soldier.target {
            // Acquiring consumes the soldier's turn
            None => {
                if let Some(target) = self.find_nearest_enemy(index) {
                    self.slots[index].soldier.target = Some(target);
                    let soldier = self.id_at(index);
                    tracing::trace!(?soldier, ?target, "Target acquired");
                    events
                        .acquisitions
                        .push(TargetAcquired { soldier, target });
                }
            }
            Some(target) => self.engage(index, target, delta, events),
        }
    }

    /// Nearest live opponent of the soldier in slot `index`.
    ///
    /// Only a strictly closer candidate replaces the current best, so ties
    /// go to the lowest slot.
    fn find_nearest_enemy(&self, index: usize) -> Option<SoldierId> {
        let hunter = &self.slots[index].soldier;
        let origin = hunter.position();
        let mut best: Option<(usize, f32)> = None;

        for (j, slot) in self.slots.iter().enumerate() {
            let candidate = &slot.soldier;
            if j == index || candidate.is_dead || candidate.team == hunter.team {
                continue;
            }

            let dist = origin.distance(candidate.position());
            if self.config.targeting == TargetingPolicy::VisionLimited
                && dist > hunter.vision_range
            {
                continue;
            }

            if best.map_or(true, |(_, best_dist)| dist < best_dist) {
                best = Some((j, dist));
            }
        }

        best.map(|(j, _)| self.id_at(j))
    }

    /// Attack the target if it is in the cone, otherwise close in on it.
    fn engage(&mut self, index: usize, target: SoldierId, delta: f32, events: &mut TickEvents) {
        let target_pos = self.slots[target.index()].soldier.position();
        let attacker = &mut self.slots[index].soldier;

        if attacker.in_attack_cone(target_pos.x, target_pos.y) {
            if attacker.attack_clock >= attacker.attack_cooldown {
                // Surplus time is dropped, not banked toward the next attack
                attacker.attack_clock = 0.0;
                let damage = attacker.damage;

                let victim = &mut self.slots[target.index()].soldier;
                victim.health = victim.health.saturating_sub(damage);

                events.damage_events.push(DamageEvent {
                    attacker: self.id_at(index),
                    target,
                    damage,
                });
            } else {
                attacker.attack_clock += delta;
            }
            return;
        }

        let here = attacker.position();
        let offset = target_pos - here;
        if offset.length() <= f32::EPSILON {
            return;
        }

        let moved = here + offset.normalize_or_zero() * (attacker.speed * delta);
        attacker.x = moved.x;
        attacker.y = moved.y;
        attacker.facing_angle = here.bearing_to(target_pos);
    }

    /// Move buffered spawns into storage, reusing dead slots first.
    fn admit_pending(&mut self, events: &mut TickEvents) {
        if self.pending.is_empty() {
            return;
        }

        let pending = std::mem::replace(
            &mut self.pending,
            Vec::with_capacity(self.config.pending_capacity),
        );

        // Slots before the cursor hold no dead soldier
        let mut cursor = 0;
        for soldier in pending {
            let free = self.slots[cursor..]
                .iter()
                .position(|slot| slot.soldier.is_dead)
                .map(|offset| cursor + offset);

            let index = if let Some(index) = free {
                let slot = &mut self.slots[index];
                slot.generation = slot.generation.wrapping_add(1);
                slot.soldier = soldier;
                cursor = index + 1;
                index
            } else {
                if self.slots.len() >= self.capacity {
                    let requested = (self.capacity + self.config.growth_increment)
                        .max(self.slots.len() + 1);
                    if let Err(err) = self.grow(requested) {
                        tracing::error!(%err, "Fatal storage error during spawn admission");
                        panic!("{err}");
                    }
                }
                self.slots.push(Slot {
                    generation: 0,
                    soldier,
                });
                cursor = self.slots.len();
                self.slots.len() - 1
            };

            events.spawned.push(self.id_at(index));
        }
    }

    /// Mark every soldier at or below zero health as dead.
    fn sweep_dead(&mut self, events: &mut TickEvents) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let soldier = &mut slot.soldier;
            if !soldier.is_dead && soldier.health <= 0 {
                soldier.is_dead = true;
                let id = SoldierId::new(index as u32, slot.generation);
                tracing::debug!(?id, team = soldier.team, "Soldier died");
                events.deaths.push(id);
            }
        }
    }

    /// Hash of the tick counter and every slot, in slot order.
    ///
    /// Two battlefields fed the same spawns and deltas produce the same
    /// hash.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.tick.hash(&mut hasher);
        self.slots.len().hash(&mut hasher);
        self.pending.len().hash(&mut hasher);

        for slot in &self.slots {
            let s = &slot.soldier;
            slot.generation.hash(&mut hasher);
            s.health.hash(&mut hasher);
            s.is_dead.hash(&mut hasher);
            s.team.hash(&mut hasher);
            s.target.hash(&mut hasher);
            s.x.to_bits().hash(&mut hasher);
            s.y.to_bits().hash(&mut hasher);
            s.facing_angle.to_bits().hash(&mut hasher);
            s.attack_clock.to_bits().hash(&mut hasher);
        }

        hasher.finish()
    }

    /// Release all storage. Consumes the battlefield, so it runs at most once.
    pub fn teardown(self) {
        tracing::info!(
            slots = self.slots.len(),
            pending = self.pending.len(),
            ticks = self.tick,
            "Battlefield torn down"
        );
    }
}

impl Default for Battlefield {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::PI;

    use super::*;
    use crate::stats::SoldierStats;

    /// Battlefield with the given soldiers already admitted.
    fn field_with(soldiers: Vec<Soldier>) -> Battlefield {
        let mut field = Battlefield::new();
        for s in soldiers {
            field.request_spawn(s);
        }
        field.admit_pending(&mut TickEvents::default());
        field
    }

    fn id(slot: u32) -> SoldierId {
        SoldierId::new(slot, 0)
    }

    #[test]
    fn test_battlefield_new() {
        let field = Battlefield::new();
        assert_eq!(field.tick_count(), 0);
        assert_eq!(field.slot_count(), 0);
        assert_eq!(field.capacity(), 50);
        assert_eq!(field.pending_count(), 0);
    }

    #[test]
    fn test_spawn_is_buffered_until_tick() {
        let mut field = Battlefield::new();
        field.spawn(0.0, 0.0, 0.0, 0);
        assert_eq!(field.slot_count(), 0);
        assert_eq!(field.pending_count(), 1);

        let events = field.tick(0.1);
        assert_eq!(events.spawned, vec![id(0)]);
        assert_eq!(field.slot_count(), 1);
        assert_eq!(field.pending_count(), 0);
    }

    #[test]
    fn test_spawned_soldier_does_not_act_on_admission_tick() {
        let mut field = field_with(vec![Soldier::new(0.0, 0.0, 0.0, 0)]);
        field.spawn(100.0, 0.0, PI, 1);

        let events = field.tick(1.0);
        // The admitted soldier was not in storage during the update phase
        assert!(events.acquisitions.is_empty());
        let events = field.tick(1.0);
        assert_eq!(events.acquisitions.len(), 2);
    }

    #[test]
    fn test_targets_nearest_enemy_ignoring_allies() {
        let mut field = field_with(vec![
            Soldier::new(0.0, 0.0, 0.0, 0),
            Soldier::new(10.0, 0.0, 0.0, 0),
            Soldier::new(500.0, 0.0, 0.0, 1),
            Soldier::new(250.0, 0.0, 0.0, 1),
        ]);

        field.tick(0.0);
        assert_eq!(field.get(id(0)).unwrap().target, Some(id(3)));
        assert_eq!(field.get(id(1)).unwrap().target, Some(id(3)));
    }

    #[test]
    fn test_nearest_tie_goes_to_lowest_slot() {
        let mut field = field_with(vec![
            Soldier::new(0.0, 0.0, 0.0, 0),
            Soldier::new(100.0, 0.0, 0.0, 1),
            Soldier::new(-100.0, 0.0, 0.0, 1),
        ]);

        field.tick(0.0);
        assert_eq!(field.get(id(0)).unwrap().target, Some(id(1)));
    }

    #[test]
    fn test_idle_without_opponents() {
        let mut field = field_with(vec![
            Soldier::new(0.0, 0.0, 0.0, 0),
            Soldier::new(50.0, 0.0, 0.0, 0),
        ]);

        let events = field.tick(1.0);
        assert!(events.acquisitions.is_empty());
        assert!(field.soldiers().all(|(_, s)| s.target.is_none()));
        assert_eq!(field.get(id(0)).unwrap().x, 0.0);
    }

    #[test]
    fn test_acquire_and_act_are_exclusive() {
        let mut field = field_with(vec![
            Soldier::new(0.0, 0.0, 0.0, 0),
            Soldier::new(1000.0, 0.0, PI, 1),
        ]);

        field.tick(1.0);
        // Acquired only, no movement yet
        assert_eq!(field.get(id(0)).unwrap().x, 0.0);
        field.tick(1.0);
        assert_eq!(field.get(id(0)).unwrap().x, 80.0);
    }

    #[test]
    fn test_approach_updates_facing() {
        let mut field = field_with(vec![
            Soldier::new(0.0, 0.0, 0.0, 0),
            Soldier::new(0.0, 1000.0, 0.0, 1),
        ]);
        field.tick(0.0);
        field.tick(0.5);

        let s = field.get(id(0)).unwrap();
        assert!((s.y - 40.0).abs() < 1e-4);
        assert!((s.facing_angle - PI / 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_diagonal_approach_moves_along_bearing() {
        let mut field = field_with(vec![
            Soldier::new(10.0, 20.0, 0.0, 0),
            Soldier::new(610.0, 820.0, 0.0, 1),
        ]);
        field.tick(0.0);
        field.tick(1.0);

        // 3-4-5 direction at 80 u/s
        let s = field.get(id(0)).unwrap();
        assert!((s.x - 58.0).abs() < 1e-3);
        assert!((s.y - 84.0).abs() < 1e-3);
    }

    #[test]
    fn test_zero_distance_does_not_move() {
        // Facing away, so the coincident target is not in the cone
        let stats = SoldierStats::default();
        let mut field = field_with(vec![
            Soldier::with_stats(5.0, 5.0, PI, 0, &stats),
            Soldier::with_stats(5.0, 5.0, PI, 1, &stats),
        ]);
        field.tick(0.0);
        field.tick(1.0);

        let s = field.get(id(0)).unwrap();
        assert!(s.x.is_finite() && s.y.is_finite());
        assert_eq!((s.x, s.y), (5.0, 5.0));
    }

    #[test]
    fn test_single_attack_per_cooldown_window() {
        let mut field = field_with(vec![
            Soldier::new(0.0, 0.0, 0.0, 0),
            Soldier::new(100.0, 0.0, PI, 1),
        ]);
        field.tick(0.0); // acquire
        field.tick(5.0); // clock 0 -> 5, no hit yet
        assert_eq!(field.get(id(1)).unwrap().health, 100);

        field.tick(5.0);
        assert_eq!(field.get(id(1)).unwrap().health, 90);
        assert_eq!(field.get(id(0)).unwrap().attack_clock, 0.0);

        // Clock restarted from zero, surplus was not banked
        field.tick(5.0);
        assert_eq!(field.get(id(1)).unwrap().health, 90);
    }

    #[test]
    fn test_damage_event_reported() {
        let mut field = field_with(vec![
            Soldier::new(0.0, 0.0, 0.0, 0),
            Soldier::new(100.0, 0.0, 0.0, 1),
        ]);
        field.slots[0].soldier.target = Some(id(1));
        field.slots[0].soldier.attack_clock = 2.0;

        let events = field.tick(0.1);
        assert_eq!(
            events.damage_events,
            vec![DamageEvent {
                attacker: id(0),
                target: id(1),
                damage: 10,
            }]
        );
    }

    #[test]
    fn test_sticky_targeting() {
        let mut field = field_with(vec![
            Soldier::new(0.0, 0.0, 0.0, 0),
            Soldier::new(150.0, 0.0, PI, 1),
        ]);
        field.tick(0.0);
        assert_eq!(field.get(id(0)).unwrap().target, Some(id(1)));

        field.spawn(20.0, 0.0, PI, 1);
        field.tick(0.1);
        field.tick(0.1);
        assert_eq!(field.get(id(0)).unwrap().target, Some(id(1)));
    }

    #[test]
    fn test_death_marked_at_end_of_tick_and_target_cleared_next() {
        let mut field = field_with(vec![
            Soldier::new(0.0, 0.0, 0.0, 0),
            Soldier::new(100.0, 0.0, 0.0, 1),
            Soldier::new(400.0, 0.0, PI, 1),
        ]);
        field.slots[0].soldier.target = Some(id(1));
        field.slots[0].soldier.attack_clock = 2.0;
        field.slots[1].soldier.health = 5;

        let events = field.tick(0.1);
        assert_eq!(events.deaths, vec![id(1)]);
        assert!(field.get(id(1)).unwrap().is_dead);
        // Reference survives until the next tick's validity check
        assert_eq!(field.get(id(0)).unwrap().target, Some(id(1)));

        let events = field.tick(0.1);
        assert_eq!(field.get(id(0)).unwrap().target, Some(id(2)));
        assert!(events
            .acquisitions
            .contains(&TargetAcquired { soldier: id(0), target: id(2) }));
    }

    #[test]
    fn test_dying_soldier_still_hit_in_same_tick() {
        let mut field = field_with(vec![
            Soldier::new(0.0, 0.0, 0.0, 0),
            Soldier::new(0.0, 50.0, -PI / 2.0, 0),
            Soldier::new(100.0, 0.0, 0.0, 1),
        ]);
        for attacker in 0..2 {
            field.slots[attacker].soldier.target = Some(id(2));
            field.slots[attacker].soldier.attack_clock = 2.0;
        }
        field.slots[1].soldier.facing_angle = field.slots[1]
            .soldier
            .position()
            .bearing_to(field.slots[2].soldier.position());
        field.slots[2].soldier.health = 10;

        let events = field.tick(0.1);
        assert_eq!(events.damage_events.len(), 2);
        assert_eq!(field.get(id(2)).unwrap().health, -10);
        assert_eq!(events.deaths, vec![id(2)]);
    }

    #[test]
    fn test_spawn_reuses_dead_slot() {
        let mut field = field_with(vec![
            Soldier::new(0.0, 0.0, 0.0, 0),
            Soldier::new(100.0, 0.0, 0.0, 1),
        ]);
        field.slots[0].soldier.is_dead = true;

        field.spawn(7.0, 7.0, 0.0, 2);
        let events = field.tick(0.0);

        assert_eq!(field.slot_count(), 2);
        assert_eq!(events.spawned, vec![SoldierId::new(0, 1)]);
        // Old handle is stale, new one resolves
        assert!(field.get(id(0)).is_none());
        assert_eq!(field.get(SoldierId::new(0, 1)).unwrap().team, 2);
    }

    #[test]
    fn test_spawn_without_dead_slot_appends() {
        let mut field = field_with(vec![
            Soldier::new(0.0, 0.0, 0.0, 0),
            Soldier::new(100.0, 0.0, 0.0, 0),
        ]);
        let before: Vec<Soldier> = field.soldiers().map(|(_, s)| s.clone()).collect();

        field.spawn(7.0, 7.0, 0.0, 0);
        field.tick(0.0);

        assert_eq!(field.slot_count(), 3);
        let after: Vec<Soldier> = field.soldiers().take(2).map(|(_, s)| s.clone()).collect();
        assert_eq!(before, after);
        assert!(field.get(id(0)).is_some());
        assert!(field.get(id(1)).is_some());
    }

    #[test]
    fn test_stale_target_cleared_after_slot_reuse() {
        let mut field = field_with(vec![
            Soldier::new(0.0, 0.0, 0.0, 0),
            Soldier::new(1000.0, 0.0, 0.0, 1),
        ]);
        field.slots[1].soldier.is_dead = true;

        // Slot 1 now holds a teammate of soldier 0
        field.spawn(1000.0, 0.0, 0.0, 0);
        field.admit_pending(&mut TickEvents::default());
        assert_eq!(field.slots[1].generation, 1);

        field.slots[0].soldier.target = Some(id(1));
        field.tick(1.0);
        assert_eq!(field.get(id(0)).unwrap().target, None);
        assert_eq!(field.get(id(0)).unwrap().x, 0.0);
    }

    #[test]
    fn test_storage_grows_past_capacity() {
        let mut field = Battlefield::with_config(BattlefieldConfig {
            initial_capacity: 2,
            growth_increment: 3,
            ..BattlefieldConfig::default()
        });
        for i in 0..4 {
            field.spawn(i as f32, 0.0, 0.0, 0);
        }
        field.tick(0.0);

        assert_eq!(field.slot_count(), 4);
        assert_eq!(field.capacity(), 5);
        assert_eq!(field.soldiers().nth(3).unwrap().1.x, 3.0);
    }

    #[test]
    fn test_grow_rejects_shrink() {
        let mut field = field_with(vec![
            Soldier::new(0.0, 0.0, 0.0, 0),
            Soldier::new(0.0, 0.0, 0.0, 0),
        ]);
        assert_eq!(
            field.grow(2),
            Err(BattleError::InvalidCapacity {
                occupied: 2,
                requested: 2,
            })
        );
        assert!(field.grow(1).is_err());
        assert!(field.grow(3).is_ok());
        assert_eq!(field.capacity(), 3);
    }

    #[test]
    fn test_vision_limited_targeting() {
        let mut field = Battlefield::with_config(BattlefieldConfig {
            targeting: TargetingPolicy::VisionLimited,
            ..BattlefieldConfig::default()
        });
        field.spawn(0.0, 0.0, 0.0, 0);
        field.spawn(700.0, 0.0, PI, 1);
        field.tick(0.0);
        field.tick(0.0);
        assert!(field.live_soldiers().all(|(_, s)| s.target.is_none()));

        // Global awareness picks the same opponent up
        let mut field = field_with(vec![
            Soldier::new(0.0, 0.0, 0.0, 0),
            Soldier::new(700.0, 0.0, PI, 1),
        ]);
        field.tick(0.0);
        assert_eq!(field.get(id(0)).unwrap().target, Some(id(1)));
    }

    #[test]
    fn test_invalid_delta_treated_as_zero() {
        let mut field = field_with(vec![
            Soldier::new(0.0, 0.0, 0.0, 0),
            Soldier::new(1000.0, 0.0, PI, 1),
        ]);
        field.tick(0.0);
        field.tick(f32::NAN);
        field.tick(-3.0);
        assert_eq!(field.get(id(0)).unwrap().x, 0.0);
        assert_eq!(field.tick_count(), 3);
    }

    #[test]
    fn test_team_queries() {
        let mut field = field_with(vec![
            Soldier::new(0.0, 0.0, 0.0, 2),
            Soldier::new(0.0, 0.0, 0.0, 0),
            Soldier::new(0.0, 0.0, 0.0, 2),
        ]);
        field.slots[1].soldier.is_dead = true;

        assert_eq!(field.live_count(), 2);
        assert_eq!(field.live_count_for_team(2), 2);
        assert_eq!(field.live_count_for_team(0), 0);
        assert_eq!(field.teams_alive(), vec![2]);
    }

    #[test]
    fn test_try_get_stale_handle() {
        let field = field_with(vec![Soldier::new(0.0, 0.0, 0.0, 0)]);
        assert!(field.try_get(id(0)).is_ok());
        assert_eq!(
            field.try_get(SoldierId::new(0, 4)).unwrap_err(),
            BattleError::StaleHandle {
                slot: 0,
                generation: 4,
            }
        );
    }

    #[test]
    fn test_deterministic_hash() {
        let build = || {
            let mut field = Battlefield::new();
            field.spawn(0.0, 0.0, 0.0, 0);
            field.spawn(300.0, 10.0, PI, 1);
            field.spawn(-200.0, 40.0, 0.0, 1);
            for _ in 0..20 {
                field.tick(0.25);
            }
            field
        };
        assert_eq!(build().state_hash(), build().state_hash());

        let mut other = build();
        other.tick(0.25);
        assert_ne!(build().state_hash(), other.state_hash());
    }
}
