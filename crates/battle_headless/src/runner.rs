//! Headless battle runner implementation.
//!
//! Plays a [`Scenario`] on a [`Battlefield`] at a fixed step, standing in
//! for the windowed driver: it requests spawns on schedule, advances the
//! simulation and reads the results back.

use battle_core::battlefield::{Battlefield, TickEvents};
use battle_core::soldier::{SoldierId, TeamId};
use serde::{Deserialize, Serialize};

use crate::scenario::Scenario;

/// Final state of a soldier that survived the battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurvivorReport {
    /// Handle of the survivor.
    pub id: SoldierId,
    /// Team.
    pub team: TeamId,
    /// Remaining health.
    pub health: i32,
    /// Final X.
    pub x: f32,
    /// Final Y.
    pub y: f32,
}

/// Outcome of a headless battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleReport {
    /// Scenario name.
    pub scenario: String,
    /// Ticks simulated.
    pub ticks: u64,
    /// Simulated seconds.
    pub elapsed_seconds: f64,
    /// Sole surviving team, if exactly one remains.
    pub winner: Option<TeamId>,
    /// Soldiers still alive at the end.
    pub survivors: Vec<SurvivorReport>,
    /// Sum of all damage dealt.
    pub total_damage: i64,
    /// Soldiers killed.
    pub deaths: usize,
    /// Final battlefield hash.
    pub state_hash: u64,
}

/// Headless runner configuration.
#[derive(Debug, Clone, Default)]
pub struct HeadlessConfig {
    /// Keep going to `max_ticks` even after one team is left.
    pub run_to_completion: bool,
    /// Log a progress line every this many ticks (0 = never).
    pub progress_interval: u64,
}

/// Plays scenarios without graphics.
#[derive(Debug, Clone, Default)]
pub struct HeadlessRunner {
    config: HeadlessConfig,
}

impl HeadlessRunner {
    /// Create a new headless runner with default config.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a runner with custom configuration.
    #[must_use]
    pub fn with_config(config: HeadlessConfig) -> Self {
        Self { config }
    }

    /// Play `scenario` and return the final battlefield with its report.
    pub fn play(&self, scenario: &Scenario) -> (Battlefield, BattleReport) {
        let mut field = Battlefield::with_config(scenario.config);
        let last_spawn = scenario.last_spawn_tick();

        let mut ticks = 0;
        let mut total_damage: i64 = 0;
        let mut deaths = 0;

        while ticks < scenario.max_ticks {
            for order in scenario.spawns.iter().filter(|s| s.at_tick == ticks) {
                field.request_spawn(order.build(&scenario.stats));
            }

            let events = field.tick(scenario.delta_seconds);
            ticks += 1;
            total_damage += damage_total(&events);
            deaths += events.deaths.len();

            if self.config.progress_interval > 0 && ticks % self.config.progress_interval == 0 {
                tracing::info!(
                    tick = ticks,
                    live = field.live_count(),
                    deaths,
                    "Battle progress"
                );
            }

            if !self.config.run_to_completion && ticks > last_spawn && is_decided(&field) {
                tracing::debug!(tick = ticks, "Battle decided");
                break;
            }
        }

        let teams = field.teams_alive();
        let winner = match teams.as_slice() {
            [team] => Some(*team),
            _ => None,
        };

        let survivors = field
            .live_soldiers()
            .map(|(id, s)| SurvivorReport {
                id,
                team: s.team,
                health: s.health,
                x: s.x,
                y: s.y,
            })
            .collect();

        let report = BattleReport {
            scenario: scenario.name.clone(),
            ticks,
            elapsed_seconds: ticks as f64 * f64::from(scenario.delta_seconds),
            winner,
            survivors,
            total_damage,
            deaths,
            state_hash: field.state_hash(),
        };

        tracing::info!(
            scenario = %report.scenario,
            ticks = report.ticks,
            winner = ?report.winner,
            deaths = report.deaths,
            "Battle finished"
        );

        (field, report)
    }

    /// Play `scenario` and tear the battlefield down afterwards.
    pub fn run(&self, scenario: &Scenario) -> BattleReport {
        let (field, report) = self.play(scenario);
        field.teardown();
        report
    }
}

/// Fewer than two teams can still fight.
fn is_decided(field: &Battlefield) -> bool {
    field.teams_alive().len() < 2
}

fn damage_total(events: &TickEvents) -> i64 {
    events
        .damage_events
        .iter()
        .map(|e| i64::from(e.damage))
        .sum()
}
