//! `LearningEngine` — reinforcement propagation, decay, and related-
//! experience discovery across stored [`Experience`]s.

use std::collections::HashSet;

use chrono::Utc;

use crate::types::Experience;

/// Tuning knobs for [`LearningEngine`].
#[derive(Debug, Clone)]
pub struct LearningOptions {
    pub similarity_threshold: f64,
    pub top_n: usize,
    pub decay_period_days: i64,
    pub reinforcement_decay_rate: f64,
    pub min_reinforcement: f64,
    pub context_factor: f64,
}

impl Default for LearningOptions {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.3,
            top_n: 20,
            decay_period_days: 30,
            reinforcement_decay_rate: 0.05,
            min_reinforcement: 0.0,
            context_factor: 1.0,
        }
    }
}

fn lcs_len(a: &[String], b: &[String]) -> usize {
    let mut table = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    for i in 0..a.len() {
        for j in 0..b.len() {
            table[i + 1][j + 1] = if a[i] == b[j] {
                table[i][j] + 1
            } else {
                table[i][j + 1].max(table[i + 1][j])
            };
        }
    }
    table[a.len()][b.len()]
}

/// Path similarity: `0.6·jaccard + 0.4·(lcs/max(|a|,|b|))`. Identical
/// paths score 1.0; disjoint paths score 0.
pub fn path_similarity(a: &[String], b: &[String]) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let set_a: HashSet<&String> = a.iter().collect();
    let set_b: HashSet<&String> = b.iter().collect();
    let union = set_a.union(&set_b).count();
    let jaccard = if union == 0 {
        0.0
    } else {
        set_a.intersection(&set_b).count() as f64 / union as f64
    };
    let max_len = a.len().max(b.len());
    let lcs_term = if max_len == 0 { 0.0 } else { lcs_len(a, b) as f64 / max_len as f64 };
    0.6 * jaccard + 0.4 * lcs_term
}

/// Token-set Jaccard similarity between two lowercased, whitespace-split
/// context strings.
pub fn context_similarity(a: &str, b: &str) -> f64 {
    let tokens = |s: &str| -> HashSet<String> {
        s.to_lowercase().split_whitespace().map(str::to_string).collect()
    };
    let set_a = tokens(a);
    let set_b = tokens(b);
    if set_a.is_empty() && set_b.is_empty() {
        return 1.0;
    }
    let union = set_a.union(&set_b).count();
    if union == 0 {
        0.0
    } else {
        set_a.intersection(&set_b).count() as f64 / union as f64
    }
}

/// Reinforcement propagation, decay, and relatedness scoring over a set of
/// experiences. Stateless: callers own the `Vec<Experience>` and pass a
/// mutable slice/reference in.
pub struct LearningEngine {
    options: LearningOptions,
}

impl LearningEngine {
    pub fn new(options: LearningOptions) -> Self {
        Self { options }
    }

    /// Reinforce experiences similar to `target_path` by `weight`
    /// (clamped to `[0, 1]`), limited to the top-N most similar matches
    /// above `similarity_threshold`. `context` is used for an optional
    /// contextual-match gate when `Some`.
    pub fn reinforce_similar(
        &self,
        experiences: &mut [Experience],
        target_path: &[String],
        target_context: Option<&str>,
        weight: f64,
    ) -> usize {
        let weight = weight.min(1.0).max(0.0);

        let mut scored: Vec<(usize, f64)> = experiences
            .iter()
            .enumerate()
            .map(|(i, exp)| (i, path_similarity(&exp.path, target_path)))
            .filter(|(_, sim)| *sim >= self.options.similarity_threshold)
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(self.options.top_n);

        let mut updated = 0;
        for (i, sim) in scored {
            let context_factor = match target_context {
                Some(ctx) => context_similarity(ctx, &experiences[i].context).max(0.01),
                None => self.options.context_factor,
            };
            let delta = weight * sim * context_factor;
            let exp = &mut experiences[i];
            exp.reinforcement = (exp.reinforcement + delta).clamp(0.0, 1.0);
            updated += 1;
        }
        updated
    }

    /// Apply time-based decay: experiences older than `decay_period_days`
    /// lose `reinforcement_decay_rate * age_factor`, floored at
    /// `min_reinforcement`.
    pub fn apply_reinforcement_decay(&self, experiences: &mut [Experience]) {
        let now = Utc::now();
        for exp in experiences.iter_mut() {
            let age_days = (now - exp.timestamp).num_days();
            if age_days <= self.options.decay_period_days {
                continue;
            }
            let age_factor = (age_days - self.options.decay_period_days) as f64
                / self.options.decay_period_days.max(1) as f64;
            let decay = self.options.reinforcement_decay_rate * age_factor.max(0.0);
            exp.reinforcement = (exp.reinforcement - decay).max(self.options.min_reinforcement);
        }
    }

    /// Top-10 experiences most related to `experiences[target_index]`,
    /// ranked by `0.6*pathSim + 0.4*contextSim`, excluding itself.
    pub fn related_experiences(&self, experiences: &[Experience], target_index: usize) -> Vec<String> {
        let Some(target) = experiences.get(target_index) else {
            return Vec::new();
        };
        let mut scored: Vec<(String, f64)> = experiences
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != target_index)
            .map(|(_, exp)| {
                let score = 0.6 * path_similarity(&exp.path, &target.path)
                    + 0.4 * context_similarity(&exp.context, &target.context);
                (exp.id.clone(), score)
            })
            .filter(|(_, score)| *score > 0.0)
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.into_iter().take(10).map(|(id, _)| id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Outcome;

    fn experience(id: &str, path: &[&str], context: &str, reinforcement: f64) -> Experience {
        Experience {
            id: id.to_string(),
            path: path.iter().map(|s| s.to_string()).collect(),
            context: context.to_string(),
            outcome: Outcome::Success,
            feedback: None,
            timestamp: Utc::now(),
            traversal_time_ms: 100,
            reinforcement,
            confidence: 0.7,
            patterns: Vec::new(),
            insights: Vec::new(),
            related_experiences: Vec::new(),
            metadata: None,
        }
    }

    #[test]
    fn identical_paths_score_one() {
        let path = vec!["a".to_string(), "b".to_string()];
        assert!((path_similarity(&path, &path) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn disjoint_paths_score_zero() {
        let a = vec!["a".to_string()];
        let b = vec!["z".to_string()];
        assert_eq!(path_similarity(&a, &b), 0.0);
    }

    #[test]
    fn reinforcement_stays_within_unit_range() {
        let engine = LearningEngine::new(LearningOptions::default());
        let mut experiences = vec![experience("e1", &["a", "b"], "ctx", 0.9)];
        engine.reinforce_similar(&mut experiences, &["a".to_string(), "b".to_string()], None, 2.0);
        assert!(experiences[0].reinforcement <= 1.0);
    }

    #[test]
    fn decay_floors_at_min_reinforcement() {
        let engine = LearningEngine::new(LearningOptions {
            min_reinforcement: 0.1,
            ..LearningOptions::default()
        });
        let mut experiences = vec![experience("e1", &["a"], "ctx", 0.15)];
        experiences[0].timestamp = Utc::now() - chrono::Duration::days(400);
        engine.apply_reinforcement_decay(&mut experiences);
        assert!(experiences[0].reinforcement >= 0.1);
    }

    #[test]
    fn related_experiences_excludes_self() {
        let engine = LearningEngine::new(LearningOptions::default());
        let experiences = vec![
            experience("e1", &["a", "b"], "ctx", 0.5),
            experience("e2", &["a", "b"], "ctx", 0.5),
        ];
        let related = engine.related_experiences(&experiences, 0);
        assert_eq!(related, vec!["e2".to_string()]);
    }
}
