//! `PatternDetector` — groups similar traversal paths into sequential
//! [`Pattern`]s, independent of the structural motifs `analysis::patterns`
//! mines from the graph's topology.

use std::collections::HashSet;

use chrono::Utc;

use crate::types::{IdGen, Pattern};

/// Tuning knobs for [`PatternDetector`].
#[derive(Debug, Clone)]
pub struct PatternDetectorOptions {
    pub similarity_threshold: f64,
    pub min_path_length: usize,
}

impl Default for PatternDetectorOptions {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.6,
            min_path_length: 3,
        }
    }
}

/// Longest common subsequence length between two slices.
fn lcs_len<T: PartialEq>(a: &[T], b: &[T]) -> usize {
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

fn jaccard_sets(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Similarity between a candidate path and a known pattern's node set,
/// per the spec's `0.6·jaccard + 0.4·normalizedLCS` weighting.
pub fn path_pattern_similarity(path: &[String], pattern_nodes: &[String]) -> f64 {
    let path_set: HashSet<String> = path.iter().cloned().collect();
    let pattern_set: HashSet<String> = pattern_nodes.iter().cloned().collect();
    let jaccard = jaccard_sets(&path_set, &pattern_set);
    let lcs = lcs_len(path, pattern_nodes);
    let denom = (path.len() + pattern_nodes.len()) as f64;
    let lcs_term = if denom > 0.0 { 2.0 * lcs as f64 / denom } else { 0.0 };
    0.6 * jaccard + 0.4 * lcs_term
}

/// Detects and maintains sequential patterns across observed paths.
pub struct PatternDetector {
    id_gen: IdGen,
    options: PatternDetectorOptions,
    patterns: Vec<Pattern>,
}

impl PatternDetector {
    pub fn new(options: PatternDetectorOptions) -> Self {
        Self {
            id_gen: IdGen::new(),
            options,
            patterns: Vec::new(),
        }
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Observe a new (path, context) pair: update the most similar known
    /// pattern if above threshold, otherwise create a new one once the
    /// path meets `min_path_length`. Returns the affected pattern's id, if
    /// any.
    pub fn observe(&mut self, path: &[String], context: &str) -> Option<String> {
        let best = self
            .patterns
            .iter()
            .enumerate()
            .map(|(i, p)| (i, path_pattern_similarity(path, &p.nodes)))
            .max_by(|a, b| a.1.total_cmp(&b.1));

        if let Some((i, similarity)) = best {
            if similarity > self.options.similarity_threshold {
                let pattern = &mut self.patterns[i];
                pattern.frequency += 1;
                if !pattern.contexts.contains(&context.to_string()) {
                    pattern.contexts.push(context.to_string());
                }
                pattern.last_seen = Utc::now();
                return Some(pattern.id.clone());
            }
        }

        if path.len() >= self.options.min_path_length {
            let id = self.id_gen.next("sequential_pattern");
            self.patterns.push(Pattern {
                id: id.clone(),
                description: format!("sequence of {} nodes", path.len()),
                frequency: 1,
                confidence: 0.6,
                nodes: path.to_vec(),
                contexts: vec![context.to_string()],
                success_rate: 1.0,
                avg_traversal_time_ms: 0.0,
                last_seen: Utc::now(),
            });
            return Some(id);
        }
        None
    }

    /// Update running averages for a pattern after an additional
    /// observation of traversal time and success.
    pub fn update_pattern_stats(&mut self, pattern_id: &str, traversal_time_ms: f64, success: bool) {
        if let Some(pattern) = self.patterns.iter_mut().find(|p| p.id == pattern_id) {
            let n = pattern.frequency.max(1) as f64;
            pattern.avg_traversal_time_ms =
                (pattern.avg_traversal_time_ms * (n - 1.0) + traversal_time_ms) / n;
            let successes = pattern.success_rate * (n - 1.0) + if success { 1.0 } else { 0.0 };
            pattern.success_rate = successes / n;
        }
    }

    /// Remove patterns below `min_confidence` or older than `max_age_days`.
    pub fn prune_patterns(&mut self, min_confidence: f64, max_age_days: i64) {
        let cutoff = Utc::now() - chrono::Duration::days(max_age_days);
        self.patterns
            .retain(|p| p.confidence >= min_confidence && p.last_seen >= cutoff);
    }
}
