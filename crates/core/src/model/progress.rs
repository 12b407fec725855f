use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Points needed to fill one level of the progress bar.
pub const POINTS_PER_LEVEL: u64 = 100;

/// Cumulative learner progress: reward points and earned badges.
///
/// Progress only ever grows. The zero value is what a learner starts with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    points: u64,
    badges: BTreeSet<String>,
}

impl Progress {
    #[must_use]
    pub fn new(points: u64, badges: impl IntoIterator<Item = String>) -> Self {
        Self {
            points,
            badges: badges.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn points(&self) -> u64 {
        self.points
    }

    #[must_use]
    pub fn badges(&self) -> &BTreeSet<String> {
        &self.badges
    }

    #[must_use]
    pub fn has_badge(&self, name: &str) -> bool {
        self.badges.contains(name)
    }

    #[must_use]
    pub fn badge_count(&self) -> usize {
        self.badges.len()
    }

    /// Completed levels (every 100 points).
    #[must_use]
    pub fn level(&self) -> u64 {
        self.points / POINTS_PER_LEVEL
    }

    /// Points into the current level, which doubles as a percentage.
    #[must_use]
    pub fn level_progress(&self) -> u64 {
        self.points % POINTS_PER_LEVEL
    }

    pub fn add_points(&mut self, delta: u64) {
        self.points = self.points.saturating_add(delta);
    }

    /// Returns `false` when the badge was already held.
    pub fn insert_badge(&mut self, name: impl Into<String>) -> bool {
        self.badges.insert(name.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_progress_wraps_every_hundred_points() {
        let progress = Progress::new(245, Vec::new());
        assert_eq!(progress.level(), 2);
        assert_eq!(progress.level_progress(), 45);
        assert_eq!(Progress::default().level_progress(), 0);
    }

    #[test]
    fn badges_are_unique() {
        let mut progress = Progress::default();
        assert!(progress.insert_badge("Perfect Score"));
        assert!(!progress.insert_badge("Perfect Score"));
        assert_eq!(progress.badge_count(), 1);
    }
}
