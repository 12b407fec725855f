//! Badge unlocking.
//!
//! Rules are evaluated in registration order until a full pass grants
//! nothing, so a bonus from one badge can unlock another within the same
//! evaluation.

use crate::model::{BadgeRule, Progress, QuizSummary, RewardPolicy};

/// A badge unlocked during one evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantedBadge {
    pub name: String,
    pub bonus: u64,
}

/// Everything a single evaluation unlocked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BadgeAward {
    /// Badges in the order they were granted.
    pub granted: Vec<GrantedBadge>,
    /// Sum of the granted bonuses.
    pub bonus_points: u64,
    /// Number of passes run, including the final empty one.
    pub passes: usize,
}

impl BadgeAward {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.granted.is_empty()
    }

    #[must_use]
    pub fn badge_names(&self) -> Vec<String> {
        self.granted.iter().map(|b| b.name.clone()).collect()
    }
}

/// Pure evaluator over an ordered rule list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeEngine {
    rules: Vec<BadgeRule>,
}

impl BadgeEngine {
    #[must_use]
    pub fn new(rules: Vec<BadgeRule>) -> Self {
        Self { rules }
    }

    #[must_use]
    pub fn from_policy(policy: &RewardPolicy) -> Self {
        Self::new(policy.rules().to_vec())
    }

    #[must_use]
    pub fn rules(&self) -> &[BadgeRule] {
        &self.rules
    }

    /// Decide which badges `progress` unlocks after `summary`.
    ///
    /// Badges already in `progress` are never granted again. The input is not
    /// modified; apply the returned award to the store.
    #[must_use]
    pub fn evaluate(&self, progress: &Progress, summary: &QuizSummary) -> BadgeAward {
        let mut working = progress.clone();
        let mut award = BadgeAward::default();

        // Every productive pass grants at least one badge, so this loop runs
        // at most `rules.len() + 1` times.
        loop {
            award.passes += 1;
            let mut granted_this_pass = false;

            for rule in &self.rules {
                if working.has_badge(&rule.name) || !rule.condition.is_met(&working, summary) {
                    continue;
                }
                working.insert_badge(rule.name.clone());
                working.add_points(rule.bonus);
                award.bonus_points = award.bonus_points.saturating_add(rule.bonus);
                award.granted.push(GrantedBadge {
                    name: rule.name.clone(),
                    bonus: rule.bonus,
                });
                granted_this_pass = true;
            }

            if !granted_this_pass {
                break;
            }
        }

        award
    }
}

impl Default for BadgeEngine {
    fn default() -> Self {
        Self::from_policy(&RewardPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BadgeCondition, summary_for_tests};

    #[test]
    fn perfect_score_grants_bonus() {
        let engine = BadgeEngine::default();
        let award = engine.evaluate(&Progress::new(20, Vec::new()), &summary_for_tests(2, 2));
        assert_eq!(award.badge_names(), vec!["Perfect Score".to_string()]);
        assert_eq!(award.bonus_points, 50);
    }

    #[test]
    fn nothing_granted_for_zero_score() {
        let engine = BadgeEngine::default();
        let award = engine.evaluate(&Progress::default(), &summary_for_tests(0, 3));
        assert!(award.is_empty());
        assert_eq!(award.bonus_points, 0);
        assert_eq!(award.passes, 1);
    }

    #[test]
    fn held_badges_are_not_granted_again() {
        let engine = BadgeEngine::default();
        let progress = Progress::new(
            300,
            vec!["Perfect Score".to_string(), "Eco Warrior".to_string()],
        );
        let award = engine.evaluate(&progress, &summary_for_tests(5, 5));
        assert!(award.is_empty());
    }

    #[test]
    fn bonus_crosses_threshold_in_same_evaluation() {
        // 60 points + 50 perfect-score bonus reaches the 100 point badge.
        let engine = BadgeEngine::default();
        let award = engine.evaluate(&Progress::new(60, Vec::new()), &summary_for_tests(1, 1));
        assert_eq!(
            award.badge_names(),
            vec!["Perfect Score".to_string(), "Eco Warrior".to_string()]
        );
        assert_eq!(award.bonus_points, 100);
    }

    #[test]
    fn later_rules_can_unlock_earlier_ones_on_next_pass() {
        // "Collector" is registered first but only unlocks after "Centurion"
        // grants a badge, which needs a second pass.
        let engine = BadgeEngine::new(vec![
            BadgeRule::new("Collector", BadgeCondition::BadgesAtLeast { count: 1 }, 5),
            BadgeRule::new("Centurion", BadgeCondition::PointsAtLeast { threshold: 100 }, 0),
        ]);
        let award = engine.evaluate(&Progress::new(100, Vec::new()), &summary_for_tests(0, 1));
        assert_eq!(
            award.badge_names(),
            vec!["Centurion".to_string(), "Collector".to_string()]
        );
        assert_eq!(award.bonus_points, 5);
        assert_eq!(award.passes, 3);
    }

    #[test]
    fn mutually_triggering_rules_are_deterministic() {
        let rules = vec![
            BadgeRule::new("Bronze", BadgeCondition::PointsAtLeast { threshold: 90 }, 20),
            BadgeRule::new("Silver", BadgeCondition::PointsAtLeast { threshold: 110 }, 20),
            BadgeRule::new("Gold", BadgeCondition::PointsAtLeast { threshold: 130 }, 20),
            BadgeRule::new("Hoarder", BadgeCondition::BadgesAtLeast { count: 3 }, 0),
        ];
        let engine = BadgeEngine::new(rules);
        let progress = Progress::new(95, Vec::new());
        let summary = summary_for_tests(1, 2);

        let first = engine.evaluate(&progress, &summary);
        let second = engine.evaluate(&progress, &summary);
        assert_eq!(first, second);
        assert_eq!(
            first.badge_names(),
            vec![
                "Bronze".to_string(),
                "Silver".to_string(),
                "Gold".to_string(),
                "Hoarder".to_string()
            ]
        );
        assert_eq!(first.bonus_points, 60);
        assert!(first.passes <= engine.rules().len() + 1);
    }
}
