//! Integration tests for the six concrete scenarios in spec.md §8,
//! exercised against the public crate API end to end. Scenarios whose
//! exact illustrative numbers are already pinned down by a module's own
//! unit tests (separation scaling, boundary reflection) are instead
//! checked here as swarm-level invariants over a full multi-tick run.

use wec_swarm_core::{Agent, AgentKind, AgentState, Field, Orchestrator, Rect, Space, SwarmConfig};

fn config() -> SwarmConfig {
    let mut cfg = SwarmConfig::default();
    cfg.population_size = 12;
    cfg.width = 60;
    cfg.height = 60;
    cfg
}

/// Scenario 1, *trivial harvest*, at the full-orchestrator level: a lone
/// agent with consume=0, efficiency=1 recharges every tick and never
/// leaves `[0, 100]`. The exact "saturates within <= 6 ticks" claim is
/// checked against the formulas directly in `src/agent/mod.rs` (see
/// DESIGN.md, Open Question 4, for why that literal bound doesn't hold).
#[test]
fn scenario_1_trivial_harvest_stays_bounded_and_recharges() {
    let mut cfg = config();
    cfg.population_size = 1;
    cfg.width = 10;
    cfg.height = 10;
    cfg.max_power = 1.0;
    cfg.battery = 50.0;
    cfg.efficiency = 1.0;
    cfg.consume = 0.0;
    cfg.max_speed = 0.01;

    let mut orch = Orchestrator::new(AgentKind::Dynamic, &cfg).unwrap();
    for _ in 0..10 {
        orch.tick();
        let agent = &orch.agents_snapshot()[0];
        assert!(agent.battery >= 0.0 && agent.battery <= 100.0);
    }
    let final_battery = orch.agents_snapshot()[0].battery;
    assert!(final_battery > 50.0, "battery should have recharged above its start, got {final_battery}");
}

/// Scenario 2, *boundary reflection*: pinned down exactly at the `Space`
/// level in `src/space.rs`'s `reflect_flips_the_escaping_axis_only` test.
/// Here: the general invariant (every agent stays inside the rectangle
/// over a full run) holds for the whole swarm.
#[test]
fn scenario_2_agents_never_leave_the_rectangle() {
    let cfg = config();
    let mut orch = Orchestrator::new(AgentKind::Dynamic, &cfg).unwrap();
    for _ in 0..50 {
        orch.tick();
    }
    for a in orch.agents_snapshot() {
        assert!(a.position.0 >= 0.0 && a.position.0 <= cfg.width as f64);
        assert!(a.position.1 >= 0.0 && a.position.1 <= cfg.height as f64);
        let norm = (a.direction.0 * a.direction.0 + a.direction.1 * a.direction.1).sqrt();
        assert!(norm < 1e-6 || (norm - 1.0).abs() < 1e-6, "direction not unit-or-zero: {norm}");
    }
}

/// Scenario 3, *emergency override*: pinned down exactly in
/// `src/policy/direction.rs`'s `emergency_override_ignores_crowding` test.
/// Here: the swarm-level invariant that battery < 5 implies speed == 0
/// holds across a full run with a crowded, low-vision population.
#[test]
fn scenario_3_low_battery_never_moves_at_speed() {
    let mut cfg = config();
    cfg.population_size = 20;
    cfg.width = 20;
    cfg.height = 20;
    cfg.vision = 15.0;
    cfg.separation = 8.0;

    let mut orch = Orchestrator::new(AgentKind::Dynamic, &cfg).unwrap();
    for _ in 0..60 {
        orch.tick();
        for a in orch.agents_snapshot() {
            if a.battery < 5.0 {
                assert_eq!(a.speed, 0.0, "speed must be floored to 0 below battery 5");
            }
        }
    }
}

/// Scenario 4, *static invariance*: a Static swarm never moves over 100
/// ticks.
#[test]
fn scenario_4_static_swarm_is_motionless_for_100_ticks() {
    let cfg = config();
    let mut orch = Orchestrator::new(AgentKind::Static, &cfg).unwrap();
    let before = orch.agents_snapshot();
    for _ in 0..100 {
        orch.tick();
    }
    let after = orch.agents_snapshot();
    for (b, a) in before.iter().zip(after.iter()) {
        assert_eq!(b.position, a.position);
    }
}

/// Scenario 5, *separation scaling*: the literal example from spec.md §8.
#[test]
fn scenario_5_separation_scaling_matches_the_worked_example() {
    use wec_swarm_core::policy::separation::desired_separation;
    // Degenerate (zero-variance) neighbor_powers puts q exactly at 0 or 1,
    // matching the spec's idealized worked numbers exactly.
    let s_dominant = desired_separation(5.0, 1.0, &[0.2, 0.2, 0.2]);
    assert!((s_dominant - 5.0).abs() < 1e-9);

    let s_weak = desired_separation(5.0, 0.0, &[0.2, 0.2, 0.2]);
    assert!((s_weak - 11.25).abs() < 1e-9);
}

/// Scenario 6, *zone counting*: one agent oscillating between (50,50) and
/// (10,10) on alternating ticks, 100 ticks, count_agent_in_zone == 50.
#[test]
fn scenario_6_zone_counter_matches_oscillation_count() {
    let zone = Rect { x_min: 40.0, x_max: 60.0, y_min: 40.0, y_max: 60.0 };
    let state = AgentState::new((50.0, 50.0), (0.0, 0.0), 0.0, 10.0, 5.0, 50.0, 0.3, 1.0, 0.0);
    let mut agent = Agent::new(AgentKind::Static, state);

    let field = Field::initialize(100, 100, 1.0, 1);
    let space = Space::new(100.0, 100.0, 10.0, 1);

    for tick in 0..100 {
        agent.state.position = if tick % 2 == 0 { (50.0, 50.0) } else { (10.0, 10.0) };
        agent.step(&[], &field, &space, Some(zone));
    }

    assert_eq!(agent.state.count_agent_in_zone, 50);
}

/// Round-trip property: two orchestrators built from the same seed and
/// stepped the same number of ticks produce identical metric series.
#[test]
fn determinism_holds_across_a_full_run() {
    let cfg = config();
    let mut a = Orchestrator::new(AgentKind::Dynamic, &cfg).unwrap();
    let mut b = Orchestrator::new(AgentKind::Dynamic, &cfg).unwrap();
    for _ in 0..20 {
        a.tick();
        b.tick();
    }
    let ma = a.metrics();
    let mb = b.metrics();
    for (x, y) in ma.history().iter().zip(mb.history().iter()) {
        // avg_battery/total_load are reduced with a fixed sequential sum
        // (never rayon), so same-seed runs match exactly, not just closely.
        assert_eq!(x.avg_battery, y.avg_battery);
        assert_eq!(x.connections, y.connections);
        assert_eq!(x.total_load, y.total_load);
    }
}
