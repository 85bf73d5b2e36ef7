//! Learning engine integration tests

use grid_tactics::board::*;
use grid_tactics::core::types::{Faction, GridCoord, UnitId};
use grid_tactics::core::RewardConfig;
use grid_tactics::learning::*;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn unit(id: u32, x: i32, y: i32, faction: Faction) -> Unit {
    Unit::new(UnitId(id), GridCoord::new(x, y), faction)
}

fn faction_from(tag: bool) -> Faction {
    if tag {
        Faction::Player
    } else {
        Faction::Enemy
    }
}

proptest! {
    #[test]
    fn prop_actions_in_bounds_and_never_onto_allies(
        size in 2i32..12,
        mover in (0i32..12, 0i32..12, any::<bool>()),
        others in prop::collection::vec((0i32..12, 0i32..12, any::<bool>()), 0..20),
        include_stay in any::<bool>(),
    ) {
        let me = unit(0, mover.0 % size, mover.1 % size, faction_from(mover.2));
        let mut units = vec![me.clone()];
        for (i, (x, y, tag)) in others.into_iter().enumerate() {
            let cell = GridCoord::new(x % size, y % size);
            if units.iter().all(|u| u.position != cell) {
                units.push(unit(i as u32 + 1, cell.x, cell.y, faction_from(tag)));
            }
        }

        let actions = enumerate_actions(&me, &units, size, include_stay);
        prop_assert_eq!(actions.first() == Some(&me.position), include_stay);
        for action in &actions {
            prop_assert!(action.in_bounds(size));
            if *action == me.position {
                continue;
            }
            prop_assert!(me.position.is_adjacent(action));
            let ally = units.iter().any(|u| u.position == *action && u.faction == me.faction);
            prop_assert!(!ally);
        }
    }

    #[test]
    fn prop_ensure_initialized_is_idempotent(
        seed in any::<u64>(),
        preset in -10.0f64..10.0,
    ) {
        let units = vec![
            unit(1, 0, 0, Faction::Player),
            unit(2, 2, 1, Faction::Player),
            unit(3, 3, 3, Faction::Enemy),
        ];
        let objectives = vec![Objective::major(2, 2)];
        let state = encode_state(&units, &objectives);
        let scope = ActionScope::new(5, seed % 2 == 0, Some(Faction::Player));

        let mut table = QTable::new();
        table.set(&state, GridCoord::new(1, 1), preset);
        table.ensure_initialized(&state, &units, &scope);
        let once = table.to_snapshot();
        table.ensure_initialized(&state, &units, &scope);
        prop_assert_eq!(once, table.to_snapshot());
        prop_assert_eq!(table.get(&state, GridCoord::new(1, 1)), preset);
    }
}

#[test]
fn test_zero_reward_zero_gamma_moves_toward_zero() {
    let units = vec![unit(1, 2, 2, Faction::Player)];
    let state = encode_state(&units, &[]);
    let scope = ActionScope::new(5, true, None);
    let mut table = QTable::with_params(0.1, 0.0);
    let action = GridCoord::new(2, 3);

    table.set(&state, action, 5.0);
    let after = table.update(&state, action, 0.0, &state, &units, &scope);
    assert!((after - 4.5).abs() < 1e-12);

    table.set(&state, action, -5.0);
    let after = table.update(&state, action, 0.0, &state, &units, &scope);
    assert!((after + 4.5).abs() < 1e-12);
}

#[test]
fn test_unseen_next_state_bootstraps_zero() {
    let units = vec![unit(1, 2, 2, Faction::Player)];
    let state = encode_state(&units, &[]);
    let moved = vec![unit(1, 3, 3, Faction::Player)];
    let next = encode_state(&moved, &[]);
    let mut table = QTable::new();

    let value = table.update(
        &state,
        GridCoord::new(3, 3),
        1.0,
        &next,
        &moved,
        &ActionScope::new(5, true, None),
    );
    assert!((value - 0.1).abs() < 1e-12);
}

#[test]
fn test_major_objective_and_adjacent_enemy_reward() {
    let player = unit(1, 0, 0, Faction::Player);
    let units = vec![player.clone(), unit(2, 1, 1, Faction::Enemy)];
    let objectives = vec![Objective::major(0, 0)];
    let value = reward(&player, &objectives, &units, 5, &RewardConfig::default());
    assert_eq!(value, 13.0);
}

#[test]
fn test_knockback_scenarios() {
    // Off the board
    let mut board = Board::new(
        5,
        vec![unit(1, 1, 2, Faction::Player), unit(2, 0, 2, Faction::Enemy)],
        vec![],
    )
    .unwrap();
    let outcome = board.apply_action(UnitId(1), GridCoord::new(0, 2)).unwrap();
    assert!(matches!(
        outcome,
        ActionOutcome::Attacked {
            result: AttackOutcome::Removed(RemovalCause::PushedOffBoard),
            advanced: true,
            ..
        }
    ));
    assert_eq!(board.unit(UnitId(1)).unwrap().position, GridCoord::new(0, 2));

    // Into an occupied cell
    let mut board = Board::new(
        5,
        vec![
            unit(1, 2, 1, Faction::Player),
            unit(2, 2, 2, Faction::Enemy),
            unit(3, 2, 3, Faction::Player),
        ],
        vec![],
    )
    .unwrap();
    let outcome = board.attack(UnitId(1), UnitId(2)).unwrap();
    assert_eq!(outcome, AttackOutcome::Removed(RemovalCause::Collision));
    assert!(board.unit(UnitId(2)).is_none());

    // Clean push stuns, then a second push at minimum health defeats
    let mut target = unit(2, 2, 2, Faction::Enemy);
    target.health = 1;
    let mut board = Board::new(5, vec![unit(1, 1, 2, Faction::Player), target], vec![]).unwrap();
    let outcome = board.attack(UnitId(1), UnitId(2)).unwrap();
    assert_eq!(
        outcome,
        AttackOutcome::Pushed {
            to: GridCoord::new(3, 2),
            stunned: true
        }
    );
    assert!(board.unit(UnitId(2)).unwrap().stunned);

    board.apply_action(UnitId(1), GridCoord::new(2, 2)).unwrap();
    let outcome = board.attack(UnitId(1), UnitId(2)).unwrap();
    assert_eq!(outcome, AttackOutcome::Removed(RemovalCause::Defeated));
}

#[test]
fn test_idle_faction_gets_redirected_toward_open_objectives() {
    let mut board = Board::new(
        9,
        vec![
            unit(1, 0, 0, Faction::Player),
            unit(2, 0, 4, Faction::Player),
            unit(3, 0, 8, Faction::Player),
            unit(4, 4, 4, Faction::Enemy),
        ],
        vec![
            Objective::major(4, 4),
            Objective::minor(2, 1),
            Objective::minor(2, 7),
        ],
    )
    .unwrap();
    // Empty table and epsilon 0: every unit greedily picks "stay"
    let controller = TurnController::new(
        LayeredPolicy::tabular(),
        &Default::default(),
        RewardConfig::default(),
    );
    let mut table = QTable::new();
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let report = controller
        .take_turn(&mut table, &mut board, Faction::Player, 0.0, &mut rng)
        .unwrap();

    assert_eq!(report.redirects, 2);
    let redirected: Vec<_> = report
        .records
        .iter()
        .filter(|r| r.rule == DecisionRule::Redirect)
        .map(|r| (r.unit, r.action))
        .collect();
    assert_eq!(
        redirected,
        vec![
            (UnitId(1), GridCoord::new(1, 1)),
            (UnitId(2), GridCoord::new(1, 5)),
        ]
    );
    // Unit 3 is still idle, so the whole faction is penalized
    assert_eq!(report.idle_penalties, 3);
    assert_eq!(board.unit(UnitId(3)).unwrap().position, GridCoord::new(0, 8));
    // The enemy-held objective was never a target
    assert_eq!(board.unit(UnitId(4)).unwrap().position, GridCoord::new(4, 4));
}

#[test]
fn test_no_redirect_when_two_objectives_held() {
    let mut board = Board::new(
        7,
        vec![
            unit(1, 1, 1, Faction::Player),
            unit(2, 3, 3, Faction::Player),
            unit(3, 0, 6, Faction::Player),
        ],
        vec![
            Objective::minor(1, 1),
            Objective::major(3, 3),
            Objective::minor(5, 5),
        ],
    )
    .unwrap();
    let mut table = QTable::new();
    let mut rng = ChaCha8Rng::seed_from_u64(8);
    let report = TurnController::default()
        .take_turn(&mut table, &mut board, Faction::Player, 0.0, &mut rng)
        .unwrap();
    // Holders stay put through CaptureObjective and nobody is forced
    assert_eq!(report.redirects, 0);
    assert_eq!(board.objective_holders(Faction::Player), 2);
}
