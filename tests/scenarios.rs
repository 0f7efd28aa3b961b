//! Scenario tests against the public API.
//!
//! Each test pins one observable behaviour of a full simulation: spread
//! geometry, containment, fallback moves and monotone runs.

use firebreak::prelude::*;
use firebreak::strategy::{BnbParams, BranchAndBound, SearchStatus};
use std::time::Duration;

fn open_grid(n: usize, fire: Position) -> Grid {
    let mut grid = Grid::new(n);
    grid.transition(fire, Cell::Burning);
    grid
}

fn driver_for(kind: StrategyKind, scenario: Scenario) -> SimulationDriver {
    let config = FireConfig::builder().strategy(kind).seed(42).build();
    let agent = Agent::new(scenario.agent, config.build_strategy());
    SimulationDriver::new(scenario.grid, agent, config.hazard_model()).with_invariant_checks(true)
}

const OPEN_7X7: &str = "7
3 3
0 0
* * * * * * *
* * * * * * *
* * * * * * *
* * * * * * *
* * * * * * *
* * * * * * *
* * * * * * *
";

#[test]
fn one_tick_ignites_the_full_neighborhood() {
    let scenario = parse_input(
        "5\n2 2\n0 0\n* * * * *\n* * * * *\n* * * * *\n* * * * *\n* * * * *\n",
    )
    .unwrap();
    let mut driver = driver_for(StrategyKind::WallHeuristic, scenario);

    let outcome = driver.try_tick().unwrap();

    assert_eq!(outcome.ignited, 8);
    let burning = driver.grid().positions_of(Cell::Burning);
    let mut expected: CellSet = driver.grid().neighbors8(Position::new(2, 2)).collect();
    expected.insert(Position::new(2, 2));
    assert_eq!(burning, expected);
}

#[test]
fn diagonal_blocked_only_by_two_firebreaks() {
    let hazard = HazardModel::default();

    let mut both = open_grid(5, Position::new(2, 2));
    both.transition(Position::new(1, 2), Cell::Firebreak);
    both.transition(Position::new(2, 1), Cell::Firebreak);
    hazard.spread(&mut both);
    assert_eq!(both.cell(Position::new(1, 1)), Cell::Safe);
    assert_eq!(both.cell(Position::new(3, 3)), Cell::Burning);

    let mut one = open_grid(5, Position::new(2, 2));
    one.transition(Position::new(1, 2), Cell::Firebreak);
    hazard.spread(&mut one);
    assert_eq!(one.cell(Position::new(1, 1)), Cell::Burning);
}

#[test]
fn firebreak_ring_contains_the_hazard() {
    let scenario = parse_input(
        "5
2 2
0 0
* * * * *
* + + + *
* + - + *
* + + + *
* * * * *
",
    )
    .unwrap();

    assert!(scenario.grid.is_contained());
    assert!(scenario.grid.is_contained());

    let mut driver = driver_for(StrategyKind::BranchAndBound, scenario);
    assert!(driver.is_finished());
    assert_eq!(driver.run_to_fixed_point(100).unwrap(), 0);
    assert!(driver.report().contained);
}

#[test]
fn branch_and_bound_without_node_budget_still_moves() {
    let grid = open_grid(5, Position::new(2, 2));
    let hazard = HazardModel::default();
    let forbidden = hazard.pending_ignitions(&grid);
    let mut strategy = Strategy::BranchAndBound(BranchAndBound::new(
        BnbParams {
            lookahead: 5,
            node_limit: 0,
            time_limit: Duration::from_secs(5),
        },
        hazard,
    ));

    let start = Position::new(0, 0);
    let next = strategy.decide(start, &grid, &forbidden);

    assert_ne!(next, start);
    assert_eq!(start.chebyshev(next), 1);
    assert!(grid.is_safe(next));
    assert!(!forbidden.contains(&next));
    assert_eq!(strategy.stats().last_status(), SearchStatus::Fallback);
}

#[test]
fn every_strategy_runs_to_a_fixed_point() {
    for kind in StrategyKind::ALL {
        let mut driver = driver_for(kind, parse_input(OPEN_7X7).unwrap());
        let mut last = driver.grid().counts();
        let mut ticks = 0;
        while !driver.is_finished() && ticks < 200 {
            driver.try_tick().unwrap();
            let now = driver.grid().counts();
            assert!(now.burning >= last.burning, "{kind}: burned count dropped");
            assert!(now.firebreak >= last.firebreak, "{kind}: firebreak count dropped");
            last = now;
            ticks += 1;
        }
        assert!(driver.is_finished(), "{kind} did not settle");

        let report = driver.report();
        assert_eq!(report.strategy, kind.name());
        assert_eq!(report.searches, ticks as u64);
        assert!(report.counts.firebreak >= 1, "{kind} never sealed its start cell");
    }
}

#[test]
fn search_budgets_hold_per_decision() {
    let yaml = "
strategy:
  branch_and_bound:
    node_limit: 40
  iterated_local_search:
    max_evaluations: 15
  variable_neighborhood_search:
    max_evaluations: 20
";
    let base = FireConfig::from_yaml(yaml).unwrap();
    let limits = [
        (StrategyKind::BranchAndBound, 40),
        (StrategyKind::IteratedLocalSearch, 15),
        (StrategyKind::VariableNeighborhoodSearch, 20),
    ];
    for (kind, limit) in limits {
        let mut config = base.clone();
        config.strategy.kind = kind;
        let scenario = parse_input(OPEN_7X7).unwrap();
        let agent = Agent::new(scenario.agent, config.build_strategy());
        let mut driver = SimulationDriver::new(scenario.grid, agent, config.hazard_model());

        let mut previous = 0;
        for _ in 0..4 {
            if driver.is_finished() {
                break;
            }
            driver.tick();
            let stats = driver.agent().strategy().stats();
            let used = stats.evaluated - previous;
            assert!(used <= limit + 1, "{kind} used {used} of {limit}");
            previous = stats.evaluated;
        }
    }
}

#[test]
fn growth_rate_two_reaches_further() {
    let mut slow = open_grid(9, Position::new(4, 4));
    let mut fast = slow.clone();
    HazardModel::new(1).spread(&mut slow);
    HazardModel::new(2).spread(&mut fast);
    assert_eq!(slow.counts().burning, 9);
    assert_eq!(fast.counts().burning, 25);
}
