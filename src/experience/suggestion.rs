//! `SuggestionEngine` — recommends next nodes from past experiences: base,
//! contextual, path-completion, and alternative-path suggestions.

use std::collections::HashMap;

use chrono::Utc;

use crate::graph::GraphStore;
use crate::types::{Experience, Outcome};

use super::learning::context_similarity;

/// A single recommended next node.
#[derive(Debug, Clone)]
pub struct Suggestion {
    pub node_id: String,
    pub confidence: f64,
    pub reasoning: Option<String>,
}

/// Tuning knobs for [`SuggestionEngine`].
#[derive(Debug, Clone)]
pub struct SuggestionOptions {
    pub max_days_for_recency: i64,
    pub recency_floor: f64,
    pub context_match_bonus: f64,
    pub min_confidence: f64,
    pub limit: usize,
}

impl Default for SuggestionOptions {
    fn default() -> Self {
        Self {
            max_days_for_recency: 30,
            recency_floor: 0.1,
            context_match_bonus: 0.5,
            min_confidence: 0.05,
            limit: 10,
        }
    }
}

fn recency_factor(exp: &Experience, options: &SuggestionOptions) -> f64 {
    let age_days = (Utc::now() - exp.timestamp).num_days().max(0) as f64;
    let t = (age_days / options.max_days_for_recency.max(1) as f64).min(1.0);
    1.0 - t * (1.0 - options.recency_floor)
}

/// Recommends next nodes drawn from recorded experiences.
pub struct SuggestionEngine {
    options: SuggestionOptions,
}

impl SuggestionEngine {
    pub fn new(options: SuggestionOptions) -> Self {
        Self { options }
    }

    fn score_successors(
        &self,
        experiences: &[Experience],
        current_node: &str,
        context: Option<&str>,
    ) -> HashMap<String, f64> {
        let mut scores: HashMap<String, f64> = HashMap::new();
        for exp in experiences {
            let Some(position) = exp.path.iter().position(|n| n == current_node) else {
                continue;
            };
            let Some(next) = exp.path.get(position + 1) else {
                continue;
            };
            let context_sim = context.map(|c| context_similarity(c, &exp.context)).unwrap_or(0.0);
            let recency = recency_factor(exp, &self.options);
            let score = exp.reinforcement * recency * (1.0 + self.options.context_match_bonus * context_sim);
            *scores.entry(next.clone()).or_insert(0.0) += score;
        }
        scores
    }

    fn rank(&self, store: &GraphStore, scores: HashMap<String, f64>, reasoning: Option<&str>) -> Vec<Suggestion> {
        let mut ranked: Vec<Suggestion> = scores
            .into_iter()
            .filter(|(_, score)| *score >= self.options.min_confidence)
            .filter(|(node_id, _)| store.get_node(node_id).is_some())
            .map(|(node_id, confidence)| Suggestion {
                node_id,
                confidence,
                reasoning: reasoning.map(str::to_string),
            })
            .collect();
        ranked.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        ranked.truncate(self.options.limit);
        ranked
    }

    /// Suggestions for the node to visit after `current_node`, based on
    /// every experience whose path contains it.
    pub fn base_suggestions(
        &self,
        store: &GraphStore,
        experiences: &[Experience],
        current_node: &str,
    ) -> Vec<Suggestion> {
        let scores = self.score_successors(experiences, current_node, None);
        self.rank(store, scores, None)
    }

    /// Like [`Self::base_suggestions`], but scored with a context-match
    /// bonus and annotated with the matched context.
    pub fn contextual_suggestions(
        &self,
        store: &GraphStore,
        experiences: &[Experience],
        current_node: &str,
        context: &str,
    ) -> Vec<Suggestion> {
        let scores = self.score_successors(experiences, current_node, Some(context));
        let reasoning = format!("matched context {context:?}");
        self.rank(store, scores, Some(&reasoning))
    }

    /// For a partial path, propose the next node drawn from experiences
    /// whose prefix matches exactly; earlier-step completions weighted
    /// higher.
    pub fn path_completion_suggestions(&self, experiences: &[Experience], partial_path: &[String]) -> Vec<Suggestion> {
        let k = partial_path.len();
        let mut scores: HashMap<String, f64> = HashMap::new();
        for exp in experiences {
            if exp.path.len() <= k {
                continue;
            }
            if exp.path[..k] != *partial_path {
                continue;
            }
            let next = &exp.path[k];
            let step_weight = 1.0 / (k as f64 + 1.0);
            *scores.entry(next.clone()).or_insert(0.0) += exp.reinforcement * step_weight;
        }
        let mut ranked: Vec<Suggestion> = scores
            .into_iter()
            .map(|(node_id, confidence)| Suggestion {
                node_id,
                confidence,
                reasoning: Some("exact prefix match".to_string()),
            })
            .collect();
        ranked.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        ranked.truncate(self.options.limit);
        ranked
    }

    /// Given a failed path, find successful experiences sharing the
    /// longest common prefix and propose their divergence node.
    pub fn alternative_suggestions(&self, experiences: &[Experience], failed_path: &[String]) -> Vec<Suggestion> {
        let mut best_prefix_len = 0usize;
        let mut candidates: Vec<(&Experience, usize)> = Vec::new();

        for exp in experiences {
            if exp.outcome != Outcome::Success {
                continue;
            }
            let prefix_len = exp
                .path
                .iter()
                .zip(failed_path.iter())
                .take_while(|(a, b)| a == b)
                .count();
            if prefix_len == 0 || prefix_len >= exp.path.len() {
                continue;
            }
            if prefix_len > best_prefix_len {
                best_prefix_len = prefix_len;
                candidates.clear();
            }
            if prefix_len == best_prefix_len {
                candidates.push((exp, prefix_len));
            }
        }

        let mut scores: HashMap<String, f64> = HashMap::new();
        for (exp, prefix_len) in candidates {
            if let Some(divergence) = exp.path.get(prefix_len) {
                *scores.entry(divergence.clone()).or_insert(0.0) += exp.reinforcement;
            }
        }

        let mut ranked: Vec<Suggestion> = scores
            .into_iter()
            .map(|(node_id, confidence)| Suggestion {
                node_id,
                confidence,
                reasoning: Some("divergence from a successful alternative".to_string()),
            })
            .collect();
        ranked.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        ranked.truncate(self.options.limit);
        ranked
    }
}
