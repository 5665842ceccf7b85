use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use super::GameMode;
use crate::wheel::SpinResult;

/// Points for a category not among the recent spins (challenge mode)
pub const NEW_CATEGORY_BONUS: u32 = 10;
/// Points for any other spin
pub const BASE_POINTS: u32 = 1;
/// How many previous spins count as "recent"
pub const RECENT_WINDOW: usize = 5;
/// History entries kept before the oldest is evicted
pub const HISTORY_CAPACITY: usize = 100;

/// One settled spin as remembered by the score keeper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub spin_id: u64,
    pub item_id: String,
    pub display_name: String,
    pub category: String,
    pub points: u32,
    /// Seconds since the Unix epoch when the spin was scored
    #[serde(default)]
    pub recorded_at: u64,
}

impl HistoryEntry {
    /// `HH:MM:SS` (UTC) of `recorded_at`
    pub fn clock(&self) -> String {
        let secs = self.recorded_at;
        format!(
            "{:02}:{:02}:{:02}",
            (secs / 3600) % 24,
            (secs / 60) % 60,
            secs % 60
        )
    }
}

/// Points granted for one spin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Award {
    pub points: u32,
    pub new_category: bool,
}

/// Running score and spin history.
pub struct ScoreKeeper {
    mode: GameMode,
    score: u32,
    spins: u32,
    history: VecDeque<HistoryEntry>,
}

impl ScoreKeeper {
    pub fn new(mode: GameMode) -> Self {
        Self {
            mode,
            score: 0,
            spins: 0,
            history: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Switch modes; score and history carry over.
    pub fn set_mode(&mut self, mode: GameMode) {
        self.mode = mode;
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn spins(&self) -> u32 {
        self.spins
    }

    /// Oldest first
    pub fn history(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.history.iter()
    }

    /// Score a settled spin.
    pub fn record(&mut self, result: &SpinResult) -> Award {
        let category = &result.item.category;
        let award = match self.mode {
            GameMode::Challenge if !self.seen_recently(category) => Award {
                points: NEW_CATEGORY_BONUS,
                new_category: true,
            },
            _ => Award {
                points: BASE_POINTS,
                new_category: false,
            },
        };

        self.score = self.score.saturating_add(award.points);
        self.spins = self.spins.saturating_add(1);

        if self.history.len() == HISTORY_CAPACITY {
            self.history.pop_front();
        }
        self.history.push_back(HistoryEntry {
            spin_id: result.spin_id,
            item_id: result.item.id.clone(),
            display_name: result.item.display_name.clone(),
            category: category.clone(),
            points: award.points,
            recorded_at: unix_seconds(),
        });

        if award.new_category {
            log::info!("New category! +{} points for {}", award.points, category);
        }
        award
    }

    /// Clear score, spin count and history.
    pub fn reset(&mut self) {
        self.score = 0;
        self.spins = 0;
        self.history.clear();
    }

    fn seen_recently(&self, category: &str) -> bool {
        self.history
            .iter()
            .rev()
            .take(RECENT_WINDOW)
            .any(|entry| entry.category == category)
    }
}

fn unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl Default for ScoreKeeper {
    fn default() -> Self {
        Self::new(GameMode::default())
    }
}
