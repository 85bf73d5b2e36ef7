//! Sparse action-value table with a one-step TD update
//!
//! Unseen (state, action) pairs read as 0. Rows keep insertion order so
//! iteration, persistence and tie-breaking are deterministic.

use ahash::AHashMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{info, warn};

use crate::board::units::Unit;
use crate::core::config::LearningConfig;
use crate::core::error::{Result, TacticsError};
use crate::learning::encoding::{Action, ActionScope, StateKey};

/// Current on-disk snapshot layout
pub const SNAPSHOT_VERSION: u32 = 1;

/// Action values for one state, in first-seen order
#[derive(Debug, Clone, Default, PartialEq)]
struct ActionValues(Vec<(Action, f64)>);

impl ActionValues {
    fn get(&self, action: Action) -> Option<f64> {
        self.0.iter().find(|(a, _)| *a == action).map(|(_, v)| *v)
    }

    fn get_or_insert(&mut self, action: Action) -> &mut f64 {
        let index = match self.0.iter().position(|(a, _)| *a == action) {
            Some(i) => i,
            None => {
                self.0.push((action, 0.0));
                self.0.len() - 1
            }
        };
        &mut self.0[index].1
    }

    fn max_value(&self) -> Option<f64> {
        self.0.iter().map(|(_, v)| OrderedFloat(*v)).max().map(|v| v.0)
    }
}

/// One state's row in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRow {
    pub state: StateKey,
    pub values: Vec<(Action, f64)>,
}

/// Whole-table export, written and read as a single document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub version: u32,
    pub rows: Vec<SnapshotRow>,
}

/// State → action → value store owned by a training session
#[derive(Debug, Clone)]
pub struct QTable {
    rows: AHashMap<StateKey, ActionValues>,
    alpha: f64,
    gamma: f64,
}

impl Default for QTable {
    fn default() -> Self {
        Self::from_config(&LearningConfig::default())
    }
}

impl QTable {
    /// Empty table with the default step size (0.1) and discount (0.9)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(alpha: f64, gamma: f64) -> Self {
        Self {
            rows: AHashMap::new(),
            alpha,
            gamma,
        }
    }

    pub fn from_config(config: &LearningConfig) -> Self {
        Self::with_params(config.alpha, config.gamma)
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Number of states with a row
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Total (state, action) entries across all rows
    pub fn entry_count(&self) -> usize {
        self.rows.values().map(|r| r.0.len()).sum()
    }

    pub fn contains_state(&self, state: &StateKey) -> bool {
        self.rows.contains_key(state)
    }

    /// Value of an action, 0 when never seen
    pub fn get(&self, state: &StateKey, action: Action) -> f64 {
        self.rows
            .get(state)
            .and_then(|row| row.get(action))
            .unwrap_or(0.0)
    }

    /// Overwrite a single value
    pub fn set(&mut self, state: &StateKey, action: Action, value: f64) {
        *self.row_mut(state).get_or_insert(action) = value;
    }

    /// Actions recorded for a state, in first-seen order
    pub fn actions(&self, state: &StateKey) -> Vec<(Action, f64)> {
        self.rows
            .get(state)
            .map(|row| row.0.clone())
            .unwrap_or_default()
    }

    /// Highest value recorded for a state; 0 when the state has no entries
    pub fn best_value(&self, state: &StateKey) -> f64 {
        self.rows
            .get(state)
            .and_then(ActionValues::max_value)
            .unwrap_or(0.0)
    }

    fn row_mut(&mut self, state: &StateKey) -> &mut ActionValues {
        self.rows.entry(state.clone()).or_default()
    }

    /// Seed every legal action of every learning unit at 0
    ///
    /// Only a state's first visit creates entries. A row that already
    /// exists is left alone, so later layouts never leak into it.
    pub fn ensure_initialized(&mut self, state: &StateKey, units: &[Unit], scope: &ActionScope) {
        if self.rows.contains_key(state) {
            return;
        }
        let row = self.row_mut(state);
        for unit in units.iter().filter(|u| scope.learns(u)) {
            for action in scope.actions_for(unit, units) {
                row.get_or_insert(action);
            }
        }
    }

    /// One-step TD update, returns the new value
    ///
    /// `Q(s,a) += alpha * (r + gamma * max_a' Q(s',a') - Q(s,a))`
    pub fn update(
        &mut self,
        state: &StateKey,
        action: Action,
        reward: f64,
        next_state: &StateKey,
        units: &[Unit],
        scope: &ActionScope,
    ) -> f64 {
        self.ensure_initialized(state, units, scope);
        self.ensure_initialized(next_state, units, scope);

        let target = reward + self.gamma * self.best_value(next_state);
        let alpha = self.alpha;
        let value = self.row_mut(state).get_or_insert(action);
        let current = *value;
        *value = current + alpha * (target - current);
        *value
    }

    /// Export the table; rows are sorted by state for stable output
    pub fn to_snapshot(&self) -> TableSnapshot {
        let mut rows: Vec<SnapshotRow> = self
            .rows
            .iter()
            .map(|(state, values)| SnapshotRow {
                state: state.clone(),
                values: values.0.clone(),
            })
            .collect();
        rows.sort_by(|a, b| a.state.cmp(&b.state));
        TableSnapshot {
            version: SNAPSHOT_VERSION,
            rows,
        }
    }

    /// Replace every value with the snapshot's contents
    pub fn restore(&mut self, snapshot: TableSnapshot) -> Result<()> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(TacticsError::SnapshotVersion(snapshot.version));
        }
        let mut rows = AHashMap::with_capacity(snapshot.rows.len());
        for row in snapshot.rows {
            rows.insert(row.state, ActionValues(row.values));
        }
        self.rows = rows;
        Ok(())
    }

    /// Write the table as JSON, replacing `path` atomically
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let tmp = path.with_extension("tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            serde_json::to_writer(&mut writer, &self.to_snapshot())?;
            writer.flush()?;
        }
        fs::rename(&tmp, path)?;
        info!(path = %path.display(), states = self.len(), "saved Q-table");
        Ok(())
    }

    /// Replace the table with the snapshot stored at `path`
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let snapshot: TableSnapshot = serde_json::from_reader(reader)?;
        self.restore(snapshot)?;
        info!(path = %path.display(), states = self.len(), "loaded Q-table");
        Ok(())
    }

    /// Load when the file exists; a missing file leaves the table empty
    ///
    /// Any other failure is returned so a session never starts from a
    /// partial table.
    pub fn load_if_exists(&mut self, path: impl AsRef<Path>) -> Result<bool> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "no Q-table snapshot, starting empty");
            return Ok(false);
        }
        self.load(path)?;
        Ok(true)
    }
}
