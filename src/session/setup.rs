//! Match setup: deployment and objective placement

use rand::seq::SliceRandom;
use rand::RngCore;

use crate::board::grid::Board;
use crate::board::units::{Objective, Unit};
use crate::core::config::MatchConfig;
use crate::core::error::{Result, TacticsError};
use crate::core::types::{Faction, GridCoord, ObjectiveClass, UnitId};

/// Deploy both factions on opposite edge columns
///
/// PLAYER units go on column 0 and ENEMY units on the last column, each on
/// distinct random rows. Players come first in the returned order.
pub fn generate_units(board_size: i32, per_side: usize, rng: &mut dyn RngCore) -> Vec<Unit> {
    let rows: Vec<i32> = (0..board_size).collect();
    let mut units = Vec::with_capacity(per_side * 2);
    let mut next_id = 0;

    for (faction, column) in [(Faction::Player, 0), (Faction::Enemy, board_size - 1)] {
        for &row in rows.choose_multiple(rng, per_side) {
            units.push(Unit::new(UnitId(next_id), GridCoord::new(column, row), faction));
            next_id += 1;
        }
    }
    units
}

/// Scatter objectives over distinct cells off the deployment columns
///
/// MAJOR objectives come first in the returned order.
pub fn place_objectives(
    board_size: i32,
    majors: usize,
    minors: usize,
    rng: &mut dyn RngCore,
) -> Vec<Objective> {
    let mut cells: Vec<GridCoord> = (1..board_size - 1)
        .flat_map(|x| (0..board_size).map(move |y| GridCoord::new(x, y)))
        .collect();
    cells.shuffle(rng);

    cells
        .into_iter()
        .take(majors + minors)
        .enumerate()
        .map(|(i, cell)| {
            let class = if i < majors {
                ObjectiveClass::Major
            } else {
                ObjectiveClass::Minor
            };
            Objective::new(cell, class)
        })
        .collect()
}

/// Fresh board for one episode
pub fn new_match(rules: &MatchConfig, rng: &mut dyn RngCore) -> Result<Board> {
    if rules.units_per_side > rules.board_size.max(0) as usize {
        return Err(TacticsError::InvalidConfig(format!(
            "{} units per side do not fit on a {} row edge",
            rules.units_per_side, rules.board_size
        )));
    }
    let free_cells = (rules.board_size.max(2) as usize - 2) * rules.board_size as usize;
    let wanted = rules.major_objectives + rules.minor_objectives;
    if wanted > free_cells {
        return Err(TacticsError::InvalidConfig(format!(
            "{} objectives do not fit in {} free cells",
            wanted, free_cells
        )));
    }
    let units = generate_units(rules.board_size, rules.units_per_side, rng);
    let objectives = place_objectives(
        rules.board_size,
        rules.major_objectives,
        rules.minor_objectives,
        rng,
    );
    Board::new(rules.board_size, units, objectives)
}
