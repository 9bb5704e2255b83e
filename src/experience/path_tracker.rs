//! `PathTracker` — the state machine for an in-progress traversal, turned
//! into a recorded [`Experience`] on completion.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::types::{Clock, Experience, GraphError, GraphResult, IdGen, Metadata, Outcome, SystemClock};

const COMPLETION_KEYWORDS: &[&str] = &["complete", "finish", "success", "done", "end", "achieve"];

/// Tuning knobs for a [`PathTracker`].
#[derive(Debug, Clone)]
pub struct PathTrackerOptions {
    pub max_concurrent_paths: usize,
    pub auto_complete_timeout: std::time::Duration,
    /// When set, `startPath`/`addNode` reject node ids this predicate
    /// reports as unknown.
    pub validate_nodes: bool,
}

impl Default for PathTrackerOptions {
    fn default() -> Self {
        Self {
            max_concurrent_paths: 10,
            auto_complete_timeout: std::time::Duration::from_secs(300),
            validate_nodes: false,
        }
    }
}

#[derive(Debug, Clone)]
struct ActivePath {
    id: String,
    context: String,
    nodes: Vec<String>,
    start_time: DateTime<Utc>,
    last_node_time: DateTime<Utc>,
    paused: bool,
    paused_duration: std::time::Duration,
    pause_start_time: Option<DateTime<Utc>>,
    metadata: Option<Metadata>,
    goal: Option<String>,
    expected_outcome: Option<Outcome>,
}

/// Tracks active traversals and turns completed ones into [`Experience`]s.
pub struct PathTracker {
    clock: Arc<dyn Clock>,
    id_gen: IdGen,
    options: PathTrackerOptions,
    active: HashMap<String, ActivePath>,
}

impl PathTracker {
    pub fn new(options: PathTrackerOptions) -> Self {
        Self::with_clock(Arc::new(SystemClock), options)
    }

    pub fn with_clock(clock: Arc<dyn Clock>, options: PathTrackerOptions) -> Self {
        Self {
            clock,
            id_gen: IdGen::new(),
            options,
            active: HashMap::new(),
        }
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Begin tracking a new path. Rejects a blank context or an
    /// active-path count already at the configured cap.
    pub fn start_path(
        &mut self,
        context: &str,
        initial_node: Option<&str>,
        metadata: Option<Metadata>,
        has_node: impl Fn(&str) -> bool,
    ) -> GraphResult<String> {
        if context.trim().is_empty() {
            return Err(GraphError::InvalidData("path context must be non-empty".into()));
        }
        if self.active.len() >= self.options.max_concurrent_paths {
            return Err(GraphError::ConstraintViolation(
                "max concurrent paths reached".into(),
            ));
        }
        if let Some(node) = initial_node {
            if self.options.validate_nodes && !has_node(node) {
                return Err(GraphError::NotFound(format!("unknown initial node {node:?}")));
            }
        }

        let now = self.clock.now();
        let id = self.id_gen.next("path");
        self.active.insert(
            id.clone(),
            ActivePath {
                id: id.clone(),
                context: context.to_string(),
                nodes: initial_node.map(|n| vec![n.to_string()]).unwrap_or_default(),
                start_time: now,
                last_node_time: now,
                paused: false,
                paused_duration: std::time::Duration::ZERO,
                pause_start_time: None,
                metadata,
                goal: None,
                expected_outcome: None,
            },
        );
        Ok(id)
    }

    /// Set the goal string for a tracked path; used to infer
    /// `expectedOutcome` as nodes are added.
    pub fn set_goal(&mut self, path_id: &str, goal: &str) -> GraphResult<()> {
        let path = self
            .active
            .get_mut(path_id)
            .ok_or_else(|| GraphError::NotFound(path_id.to_string()))?;
        path.goal = Some(goal.to_string());
        Ok(())
    }

    /// Append a node to a tracked path. Fails if the path is unknown,
    /// paused, or `node_id` is blank.
    pub fn add_node(&mut self, path_id: &str, node_id: &str, _step_meta: Option<Metadata>) -> GraphResult<()> {
        let now = self.clock.now();
        let path = self
            .active
            .get_mut(path_id)
            .ok_or_else(|| GraphError::NotFound(path_id.to_string()))?;
        if path.paused {
            return Err(GraphError::ConstraintViolation(format!("path {path_id:?} is paused")));
        }
        let node_id = node_id.trim();
        if node_id.is_empty() {
            return Err(GraphError::InvalidData("node id must be non-empty".into()));
        }
        path.nodes.push(node_id.to_string());
        path.last_node_time = now;

        if let Some(goal) = &path.goal {
            let lowered_node = node_id.to_lowercase();
            let lowered_goal = goal.to_lowercase();
            let has_keyword = COMPLETION_KEYWORDS.iter().any(|kw| lowered_node.contains(kw));
            let shares_tokens = {
                let goal_tokens: std::collections::HashSet<&str> = lowered_goal.split_whitespace().collect();
                let node_tokens: std::collections::HashSet<&str> = lowered_node.split_whitespace().collect();
                goal_tokens.intersection(&node_tokens).count() >= 2
            };
            if has_keyword || shares_tokens {
                path.expected_outcome = Some(Outcome::Success);
            }
        }
        Ok(())
    }

    /// Pause a running path; idempotent.
    pub fn pause_path(&mut self, path_id: &str) -> GraphResult<()> {
        let now = self.clock.now();
        let path = self
            .active
            .get_mut(path_id)
            .ok_or_else(|| GraphError::NotFound(path_id.to_string()))?;
        if !path.paused {
            path.paused = true;
            path.pause_start_time = Some(now);
        }
        Ok(())
    }

    /// Resume a paused path, accumulating the elapsed pause duration;
    /// idempotent.
    pub fn resume_path(&mut self, path_id: &str) -> GraphResult<()> {
        let now = self.clock.now();
        let path = self
            .active
            .get_mut(path_id)
            .ok_or_else(|| GraphError::NotFound(path_id.to_string()))?;
        if path.paused {
            if let Some(paused_at) = path.pause_start_time.take() {
                if let Ok(elapsed) = (now - paused_at).to_std() {
                    path.paused_duration += elapsed;
                }
            }
            path.paused = false;
        }
        Ok(())
    }

    /// Complete a path, producing its [`Experience`]. Requires at least one
    /// node.
    pub fn complete_path(
        &mut self,
        path_id: &str,
        outcome: Outcome,
        feedback: Option<String>,
    ) -> GraphResult<Experience> {
        let now = self.clock.now();
        let path = self
            .active
            .remove(path_id)
            .ok_or_else(|| GraphError::NotFound(path_id.to_string()))?;
        if path.nodes.is_empty() {
            self.active.insert(path_id.to_string(), path);
            return Err(GraphError::ConstraintViolation(
                "cannot complete a path with no nodes".into(),
            ));
        }

        let elapsed = (now - path.start_time).to_std().unwrap_or_default();
        let traversal_time_ms = elapsed
            .checked_sub(path.paused_duration)
            .unwrap_or_default()
            .as_millis() as u64;

        let reinforcement = compute_reinforcement(outcome, traversal_time_ms, path.nodes.len());
        let confidence = compute_confidence(
            path.nodes.len(),
            path.expected_outcome,
            outcome,
            path.paused_duration,
        );

        Ok(Experience {
            id: self.id_gen.next("experience"),
            path: path.nodes,
            context: path.context,
            outcome,
            feedback,
            timestamp: now,
            traversal_time_ms,
            reinforcement,
            confidence,
            patterns: Vec::new(),
            insights: Vec::new(),
            related_experiences: Vec::new(),
            metadata: path.metadata,
        })
    }

    /// Discard a path without producing an Experience.
    pub fn cancel_path(&mut self, path_id: &str) -> GraphResult<()> {
        self.active
            .remove(path_id)
            .map(|_| ())
            .ok_or_else(|| GraphError::NotFound(path_id.to_string()))
    }

    /// Auto-complete (with `neutral` outcome) any path idle longer than the
    /// configured `auto_complete_timeout`.
    pub fn cleanup_inactive_paths(&mut self) -> Vec<Experience> {
        let now = self.clock.now();
        let timeout = self.options.auto_complete_timeout;
        let stale: Vec<String> = self
            .active
            .values()
            .filter(|p| {
                (now - p.last_node_time)
                    .to_std()
                    .map(|age| age > timeout)
                    .unwrap_or(false)
            })
            .map(|p| p.id.clone())
            .collect();

        stale
            .into_iter()
            .filter_map(|id| self.complete_path(&id, Outcome::Neutral, None).ok())
            .collect()
    }
}

fn compute_reinforcement(outcome: Outcome, traversal_time_ms: u64, node_count: usize) -> f64 {
    let base = match outcome {
        Outcome::Success => 0.8,
        Outcome::Neutral => 0.5,
        Outcome::Failure => 0.2,
    };
    let efficiency_bonus = if outcome == Outcome::Success {
        let normalized = (traversal_time_ms as f64 / 10_000.0).min(1.0);
        0.2 * (1.0 - normalized)
    } else {
        0.0
    };
    let length_penalty = 0.1 * (node_count as f64 / 10.0).min(1.0);
    (base + efficiency_bonus - length_penalty).clamp(0.0, 1.0)
}

fn compute_confidence(
    node_count: usize,
    expected_outcome: Option<Outcome>,
    outcome: Outcome,
    paused_duration: std::time::Duration,
) -> f64 {
    let mut confidence = 0.7;
    confidence += (0.02 * node_count as f64).min(0.2);
    if expected_outcome == Some(outcome) {
        confidence += 0.1;
    }
    if node_count < 2 {
        confidence -= 0.2;
    }
    if node_count > 20 {
        confidence -= 0.1;
    }
    if paused_duration > std::time::Duration::ZERO {
        confidence -= 0.05;
    }
    confidence.clamp(0.0, 1.0)
}
