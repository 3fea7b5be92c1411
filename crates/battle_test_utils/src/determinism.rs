//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the battlefield produces
//! identical results given identical spawns and deltas.
//!
//! # Testing Strategy
//!
//! The simulation uses `f32`, so it is not bit-identical across
//! platforms. Within one build it must still be fully reproducible:
//!
//! - **Slot order**: soldiers are always processed in slot order, which
//!   also decides ties in nearest-target selection.
//! - **No randomness**: nothing in the core draws random numbers.
//! - **Buffered spawns**: admission order equals request order.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: targeting, combat and admission in `battle_core`
//! 2. **Property tests**: random layouts must still replay identically
//! 3. **Integration tests**: whole battles are reproducible
//! 4. **Threaded tests**: running N battlefields on threads all match

use std::thread;

use battle_core::battlefield::Battlefield;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic run).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the runs were deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Battlefield is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a simulation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the simulation
/// * `ticks` - Number of ticks to simulate per run
/// * `setup` - Function to create initial state
/// * `step` - Function to advance state by one tick
/// * `hash` - Function to compute state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..ticks {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Run a battlefield built by `setup_fn` twice at a fixed delta and
/// compare final hashes.
///
/// # Example
///
/// ```
/// use battle_test_utils::determinism::verify_battlefield_determinism;
/// use battle_test_utils::fixtures::duel;
///
/// assert!(verify_battlefield_determinism(|| duel(300.0), 100, 0.1));
/// ```
pub fn verify_battlefield_determinism<F>(setup_fn: F, num_ticks: u64, delta: f32) -> bool
where
    F: Fn() -> Battlefield,
{
    verify_determinism(
        2,
        num_ticks,
        &setup_fn,
        |field| {
            field.tick(delta);
        },
        Battlefield::state_hash,
    )
    .is_deterministic
}

/// Run `num_fields` battlefields on scoped threads and collect final hashes.
///
/// Catches state that leaks between runs or depends on scheduling.
pub fn run_threaded_battlefields<F>(
    setup_fn: F,
    num_fields: usize,
    num_ticks: u64,
    delta: f32,
) -> DeterminismResult
where
    F: Fn() -> Battlefield + Sync,
{
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..num_fields)
            .map(|_| {
                s.spawn(|| {
                    let mut field = setup_fn();
                    for _ in 0..num_ticks {
                        field.tick(delta);
                    }
                    field.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("battlefield thread panicked"))
            .collect()
    });

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks: num_ticks,
    }
}

/// Compare two runs tick-by-tick, finding the first divergence.
///
/// # Returns
///
/// `None` if the runs agree throughout, `Some(tick)` if they diverge at
/// that tick.
pub fn find_first_divergence<F>(setup_fn: F, num_ticks: u64, delta: f32) -> Option<u64>
where
    F: Fn() -> Battlefield,
{
    let mut first = setup_fn();
    let mut second = setup_fn();

    if first.state_hash() != second.state_hash() {
        return Some(0);
    }

    for tick in 1..=num_ticks {
        first.tick(delta);
        second.tick(delta);

        if first.state_hash() != second.state_hash() {
            tracing::debug!(tick, "Battlefields diverged");
            return Some(tick);
        }
    }

    None
}

/// Proptest strategies for battlefield testing.
pub mod strategies {
    use battle_core::math::TAU;
    use battle_core::soldier::{Soldier, TeamId};
    use proptest::prelude::*;

    /// Coordinate on a 2000 x 2000 field centered on the origin.
    pub fn arb_coordinate() -> impl Strategy<Value = f32> {
        -1000.0f32..1000.0f32
    }

    /// Facing angle in `[0, 2π)`.
    pub fn arb_facing() -> impl Strategy<Value = f32> {
        0.0f32..TAU
    }

    /// One of two teams.
    pub fn arb_team() -> impl Strategy<Value = TeamId> {
        0i32..2
    }

    /// Baseline soldier at a random pose.
    pub fn arb_soldier() -> impl Strategy<Value = Soldier> {
        (arb_coordinate(), arb_coordinate(), arb_facing(), arb_team())
            .prop_map(|(x, y, facing, team)| Soldier::new(x, y, facing, team))
    }

    /// Between 1 and `max_soldiers` soldiers.
    pub fn arb_army(max_soldiers: usize) -> impl Strategy<Value = Vec<Soldier>> {
        proptest::collection::vec(arb_soldier(), 1..=max_soldiers)
    }
}
