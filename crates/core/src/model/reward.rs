use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::progress::Progress;
use crate::model::session::QuizSummary;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RewardPolicyError {
    #[error("badge name cannot be empty")]
    EmptyBadgeName,

    #[error("badge `{0}` is registered more than once")]
    DuplicateBadge(String),

    #[error("score percentage must be between 0 and 100, got {0}")]
    InvalidPercent(u32),
}

//
// ─── BADGE RULES ───────────────────────────────────────────────────────────────
//

/// Unlock condition for a badge, evaluated against progress and the last
/// completed quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BadgeCondition {
    /// Every question of the last quiz was answered correctly.
    PerfectScore,
    /// Cumulative reward points reached a threshold.
    PointsAtLeast { threshold: u64 },
    /// The learner holds at least `count` badges.
    BadgesAtLeast { count: usize },
    /// The last quiz scored at least `percent` percent.
    ScoreAtLeast { percent: u32 },
}

impl BadgeCondition {
    #[must_use]
    pub fn is_met(&self, progress: &Progress, summary: &QuizSummary) -> bool {
        match *self {
            Self::PerfectScore => summary.is_perfect(),
            Self::PointsAtLeast { threshold } => progress.points() >= threshold,
            Self::BadgesAtLeast { count } => progress.badge_count() >= count,
            Self::ScoreAtLeast { percent } => summary.percent() >= percent,
        }
    }
}

/// A named badge, its unlock condition and the one-time point bonus it grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeRule {
    pub name: String,
    pub condition: BadgeCondition,
    pub bonus: u64,
}

impl BadgeRule {
    #[must_use]
    pub fn new(name: impl Into<String>, condition: BadgeCondition, bonus: u64) -> Self {
        Self {
            name: name.into(),
            condition,
            bonus,
        }
    }
}

//
// ─── POLICY ────────────────────────────────────────────────────────────────────
//

/// When points for correct answers reach the progress store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Crediting {
    /// Each correct answer is credited as soon as it is scored; abandoning
    /// a quiz keeps what was earned.
    #[default]
    Immediate,
    /// Answer points are held until the quiz completes; abandoned quizzes
    /// credit nothing.
    OnCompletion,
}

/// Scoring and badge configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardPolicy {
    points_per_correct: u64,
    crediting: Crediting,
    rules: Vec<BadgeRule>,
}

impl RewardPolicy {
    pub const DEFAULT_POINTS_PER_CORRECT: u64 = 10;
    pub const PERFECT_SCORE: &'static str = "Perfect Score";
    pub const ECO_WARRIOR: &'static str = "Eco Warrior";

    /// Creates a policy with custom rules, evaluated in the given order.
    ///
    /// # Errors
    ///
    /// Returns `RewardPolicyError` if a badge name is blank or repeated, or a
    /// score percentage exceeds 100.
    pub fn new(
        points_per_correct: u64,
        crediting: Crediting,
        rules: Vec<BadgeRule>,
    ) -> Result<Self, RewardPolicyError> {
        let mut seen = HashSet::with_capacity(rules.len());
        for rule in &rules {
            if rule.name.trim().is_empty() {
                return Err(RewardPolicyError::EmptyBadgeName);
            }
            if !seen.insert(rule.name.as_str()) {
                return Err(RewardPolicyError::DuplicateBadge(rule.name.clone()));
            }
            if let BadgeCondition::ScoreAtLeast { percent } = rule.condition {
                if percent > 100 {
                    return Err(RewardPolicyError::InvalidPercent(percent));
                }
            }
        }

        Ok(Self {
            points_per_correct,
            crediting,
            rules,
        })
    }

    /// The built-in badges: a perfect quiz and reaching 100 points, 50 each.
    #[must_use]
    pub fn default_rules() -> Vec<BadgeRule> {
        vec![
            BadgeRule::new(Self::PERFECT_SCORE, BadgeCondition::PerfectScore, 50),
            BadgeRule::new(
                Self::ECO_WARRIOR,
                BadgeCondition::PointsAtLeast { threshold: 100 },
                50,
            ),
        ]
    }

    #[must_use]
    pub fn points_per_correct(&self) -> u64 {
        self.points_per_correct
    }

    #[must_use]
    pub fn crediting(&self) -> Crediting {
        self.crediting
    }

    #[must_use]
    pub fn rules(&self) -> &[BadgeRule] {
        &self.rules
    }

    #[must_use]
    pub fn with_points_per_correct(mut self, points: u64) -> Self {
        self.points_per_correct = points;
        self
    }

    #[must_use]
    pub fn with_crediting(mut self, crediting: Crediting) -> Self {
        self.crediting = crediting;
        self
    }
}

impl Default for RewardPolicy {
    fn default() -> Self {
        Self {
            points_per_correct: Self::DEFAULT_POINTS_PER_CORRECT,
            crediting: Crediting::default(),
            rules: Self::default_rules(),
        }
    }
}
