use eco_core::{EcosystemConfig, Error, FoodRule, OrganismId, Species};
use eco_world::{Simulation, SnapshotSequence};
use proptest::prelude::*;
use std::collections::HashSet;
use tokio_util::sync::CancellationToken;

fn config(seed: u64, food_rule: FoodRule) -> EcosystemConfig {
    EcosystemConfig {
        num_rows: 20,
        num_cols: 20,
        num_prey: 40,
        num_predators: 20,
        food_rule,
        total_timesteps: 30,
        seed,
        ..Default::default()
    }
}

fn run(config: EcosystemConfig) -> SnapshotSequence {
    Simulation::new(config).unwrap().run().unwrap()
}

fn ids(seq: &SnapshotSequence, generation: usize) -> HashSet<OrganismId> {
    let grid = seq.get(generation).unwrap();
    Species::ALL
        .into_iter()
        .flat_map(|species| grid.organisms(species).map(|(_, org)| org.id))
        .collect()
}

/// Every snapshot satisfies occupancy, liveness and genome invariants, and an
/// organism that disappears never comes back.
fn check_history(seq: &SnapshotSequence) {
    let mut gone = HashSet::new();
    let mut previous: HashSet<OrganismId> = HashSet::new();
    for generation in 0..seq.len() {
        let grid = seq.get(generation).unwrap();
        grid.audit().unwrap();

        let current = ids(seq, generation);
        assert!(current.is_disjoint(&gone), "an organism came back to life");
        gone.extend(previous.difference(&current).copied());
        previous = current;
    }
}

#[test]
fn test_snapshot_count() {
    let seq = run(config(1, FoodRule::GardenOfEden));
    assert_eq!(seq.len(), 31);
    assert_eq!(seq.stats().len(), 31);
}

#[test]
fn test_zero_timesteps_yields_initial_snapshot() {
    let mut cfg = config(1, FoodRule::Uniform);
    cfg.total_timesteps = 0;
    let seq = run(cfg);
    assert_eq!(seq.len(), 1);
    assert_eq!(seq.counts(0).unwrap().prey, 40);
    assert_eq!(seq.counts(0).unwrap().predators, 20);
}

#[test]
fn test_deterministic_replay() {
    let a = run(config(7, FoodRule::LineRunner)).to_bincode().unwrap();
    let b = run(config(7, FoodRule::LineRunner)).to_bincode().unwrap();
    assert_eq!(a, b);

    let c = run(config(8, FoodRule::LineRunner)).to_bincode().unwrap();
    assert_ne!(a, c);
}

#[test]
fn test_history_invariants() {
    for rule in [FoodRule::Uniform, FoodRule::GardenOfEden, FoodRule::LineRunner] {
        check_history(&run(config(3, rule)));
    }
}

#[test]
fn test_published_snapshots_are_frozen() {
    let mut sim = Simulation::new(config(5, FoodRule::GardenOfEden)).unwrap();
    sim.step().unwrap();
    let first = sim.sequence();
    let frozen = first.to_bincode().unwrap();

    for _ in 0..5 {
        sim.step().unwrap();
    }

    assert_eq!(first.to_bincode().unwrap(), frozen);
    let later = sim.sequence();
    assert_eq!(later.get(1), first.get(1));
}

#[test]
fn test_counters_balance_population() {
    let seq = run(config(11, FoodRule::GardenOfEden));
    for (k, tick) in seq.tick_counters().iter().enumerate() {
        let before = seq.counts(k).unwrap();
        let after = seq.counts(k + 1).unwrap();
        assert_eq!(
            after.prey as u64 + tick.prey.starved + tick.predations,
            before.prey as u64 + tick.prey.births
        );
        assert_eq!(
            after.predators as u64 + tick.predators.starved,
            before.predators as u64 + tick.predators.births
        );
    }
}

#[test]
fn test_overpopulated_config_is_rejected() {
    let cfg = EcosystemConfig {
        num_rows: 5,
        num_cols: 5,
        num_prey: 20,
        num_predators: 6,
        ..Default::default()
    };
    let err = Simulation::new(cfg).err().unwrap();
    assert!(matches!(err, Error::InvalidConfig(_)));
}

#[test]
fn test_unknown_food_rule_is_rejected() {
    let err = EcosystemConfig::from_json(r#"{"foodRule": "desert"}"#).unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)));
}

#[test]
fn test_cancellation_between_ticks() {
    let token = CancellationToken::new();
    let mut sim = Simulation::new(config(2, FoodRule::Uniform)).unwrap();
    sim.step().unwrap();
    sim.step().unwrap();
    token.cancel();

    let seq = sim.run_until_cancelled(&token).unwrap();
    assert_eq!(seq.len(), 3);
    check_history(&seq);
}

#[test]
fn test_uncancelled_token_runs_to_completion() {
    let token = CancellationToken::new();
    let seq = Simulation::new(config(2, FoodRule::Uniform))
        .unwrap()
        .run_until_cancelled(&token)
        .unwrap();
    assert_eq!(seq.len(), 31);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_invariants_hold_for_any_seed(
        seed in any::<u64>(),
        rows in 1usize..12,
        cols in 1usize..12,
        fill in 0.0f64..1.0,
    ) {
        let cells = rows * cols;
        let organisms = (cells as f64 * fill) as usize;
        let cfg = EcosystemConfig {
            num_rows: rows,
            num_cols: cols,
            num_prey: organisms / 2,
            num_predators: organisms - organisms / 2,
            total_timesteps: 15,
            seed,
            ..Default::default()
        };
        let seq = run(cfg);
        prop_assert_eq!(seq.len(), 16);
        check_history(&seq);
    }
}
