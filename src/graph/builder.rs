use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, trace};

use crate::core::project::ProjectId;
use crate::graph::{DependencyIndex, Edge, GraphError, Result};

/// What to do when a root or a requirement names a project the index lacks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownPolicy {
    /// Abort the whole build with `GraphError::UnknownProject`.
    #[default]
    Fail,
    /// Leave the reference out of the graph and record it.
    Skip,
}

impl FromStr for UnknownPolicy {
    type Err = String;

    fn from_str(input: &str) -> std::result::Result<Self, Self::Err> {
        match input.to_ascii_lowercase().as_str() {
            "fail" => Ok(Self::Fail),
            "skip" => Ok(Self::Skip),
            _ => Err(format!("unknown reference policy '{input}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingReference {
    /// `None` when the missing id was given as a root.
    pub from: Option<ProjectId>,
    pub id: ProjectId,
}

#[derive(Debug, Clone, Default)]
pub struct Traversal {
    pub edges: Vec<Edge>,
    /// Projects in the order they were first popped.
    pub visited: Vec<ProjectId>,
    pub missing: Vec<MissingReference>,
}

type CancelCheck = Arc<dyn Fn() -> bool + Send + Sync>;

/// Depth-first, stack-based walk over a [`DependencyIndex`] that processes
/// every reachable project once and emits one edge per direct requirement.
#[derive(Clone, Default)]
pub struct GraphBuilder {
    policy: UnknownPolicy,
    cancel: Option<CancelCheck>,
}

impl fmt::Debug for GraphBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphBuilder")
            .field("policy", &self.policy)
            .field("cancellable", &self.cancel.is_some())
            .finish()
    }
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(mut self, policy: UnknownPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Cancels through a shared flag, e.g. one flipped by a Ctrl-C handler.
    pub fn with_cancel(self, flag: Arc<AtomicBool>) -> Self {
        self.with_cancel_check(move || flag.load(Ordering::Relaxed))
    }

    /// `check` is called after each successful pop, before the project is
    /// processed; returning true fails the build with `GraphError::Cancelled`.
    /// A traversal whose stack has already drained is never cancelled.
    pub fn with_cancel_check(
        mut self,
        check: impl Fn() -> bool + Send + Sync + 'static,
    ) -> Self {
        self.cancel = Some(Arc::new(check));
        self
    }

    pub fn build(&self, index: &DependencyIndex, roots: &[ProjectId]) -> Result<Vec<Edge>> {
        self.traverse(index, roots).map(|traversal| traversal.edges)
    }

    pub fn traverse(&self, index: &DependencyIndex, roots: &[ProjectId]) -> Result<Traversal> {
        let mut traversal = Traversal::default();
        let mut seen: HashSet<ProjectId> = HashSet::new();
        let mut stack: Vec<ProjectId> = Vec::with_capacity(roots.len());

        for root in roots {
            if index.contains(root) {
                stack.push(root.clone());
                continue;
            }
            match self.policy {
                UnknownPolicy::Fail => {
                    return Err(GraphError::UnknownProject { id: root.clone() });
                }
                UnknownPolicy::Skip => traversal.missing.push(MissingReference {
                    from: None,
                    id: root.clone(),
                }),
            }
        }

        let mut revisits = 0usize;
        while let Some(current) = stack.pop() {
            if self.is_cancelled() {
                return Err(GraphError::Cancelled);
            }
            if !seen.insert(current.clone()) {
                revisits += 1;
                trace!(project = %current, "already visited");
                continue;
            }

            let record = index.lookup(&current)?;
            debug!(
                project = %current,
                requires = record.required_ids.len(),
                "processing project"
            );
            for required_id in &record.required_ids {
                let required = match index.lookup(required_id) {
                    Ok(required) => required,
                    Err(err) => match self.policy {
                        UnknownPolicy::Fail => return Err(err),
                        UnknownPolicy::Skip => {
                            traversal.missing.push(MissingReference {
                                from: Some(current.clone()),
                                id: required_id.clone(),
                            });
                            continue;
                        }
                    },
                };
                stack.push(required_id.clone());
                traversal.edges.push(Edge::new(
                    record.display_name.clone(),
                    required.display_name.clone(),
                ));
            }
            traversal.visited.push(current);
        }

        debug!(
            edges = traversal.edges.len(),
            visited = traversal.visited.len(),
            revisits,
            missing = traversal.missing.len(),
            "graph build finished"
        );
        Ok(traversal)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().map(|check| check()).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::core::project::{ProjectId, ProjectRecord};
    use crate::graph::builder::{GraphBuilder, MissingReference, UnknownPolicy};
    use crate::graph::{DependencyIndex, Edge, GraphError};

    fn index(entries: &[(&str, &[&str])]) -> DependencyIndex {
        entries
            .iter()
            .map(|(id, deps)| ProjectRecord::new(*id, *id, deps.iter().copied()))
            .collect()
    }

    fn roots(ids: &[&str]) -> Vec<ProjectId> {
        ids.iter().copied().map(ProjectId::new).collect()
    }

    fn pairs(edges: &[Edge]) -> Vec<(&str, &str)> {
        edges
            .iter()
            .map(|edge| (edge.from_name.as_str(), edge.to_name.as_str()))
            .collect()
    }

    #[test]
    fn emits_edges_in_first_pop_order() {
        let idx = index(&[("A", &["B", "C"]), ("B", &["C"]), ("C", &[])]);
        let edges = GraphBuilder::new()
            .build(&idx, &roots(&["A"]))
            .expect("build graph");

        assert_eq!(pairs(&edges), vec![("A", "B"), ("A", "C"), ("B", "C")]);
    }

    #[test]
    fn descends_into_last_pushed_requirement_first() {
        let idx = index(&[
            ("A", &["B", "C"]),
            ("B", &["D"]),
            ("C", &["E"]),
            ("D", &[]),
            ("E", &[]),
        ]);
        let traversal = GraphBuilder::new()
            .traverse(&idx, &roots(&["A"]))
            .expect("traverse graph");

        assert_eq!(
            pairs(&traversal.edges),
            vec![("A", "B"), ("A", "C"), ("C", "E"), ("B", "D")]
        );
        assert_eq!(traversal.visited, roots(&["A", "C", "E", "B", "D"]));
    }

    #[test]
    fn last_root_is_processed_first() {
        let idx = index(&[("X", &["Z"]), ("Y", &["Z"]), ("Z", &[])]);
        let edges = GraphBuilder::new()
            .build(&idx, &roots(&["X", "Y"]))
            .expect("build graph");

        assert_eq!(pairs(&edges), vec![("Y", "Z"), ("X", "Z")]);
    }

    #[test]
    fn uses_display_names_not_ids() {
        let idx = DependencyIndex::from_records([
            ProjectRecord::new("src/app/app.csproj", "App", ["src/core/core.csproj"]),
            ProjectRecord::new("src/core/core.csproj", "Core", Vec::<String>::new()),
        ]);
        let edges = GraphBuilder::new()
            .build(&idx, &roots(&["src/app/app.csproj"]))
            .expect("build graph");

        assert_eq!(edges, vec![Edge::new("App", "Core")]);
    }

    #[test]
    fn cycle_terminates_with_each_edge_once() {
        let idx = index(&[("A", &["B"]), ("B", &["A"])]);
        let edges = GraphBuilder::new()
            .build(&idx, &roots(&["A"]))
            .expect("build graph");

        assert_eq!(pairs(&edges), vec![("A", "B"), ("B", "A")]);
    }

    #[test]
    fn self_dependency_yields_single_self_edge() {
        let idx = index(&[("A", &["A"])]);
        let edges = GraphBuilder::new()
            .build(&idx, &roots(&["A"]))
            .expect("build graph");

        assert_eq!(pairs(&edges), vec![("A", "A")]);
    }

    #[test]
    fn shared_dependency_keeps_one_edge_per_dependent() {
        let idx = index(&[("R", &["C", "D"]), ("C", &["E"]), ("D", &["E"]), ("E", &[])]);
        let edges = GraphBuilder::new()
            .build(&idx, &roots(&["R"]))
            .expect("build graph");

        let into_e: Vec<_> = pairs(&edges)
            .into_iter()
            .filter(|(_, to)| *to == "E")
            .collect();
        assert_eq!(into_e, vec![("D", "E"), ("C", "E")]);
    }

    #[test]
    fn duplicate_requirement_entries_are_not_collapsed() {
        let idx = index(&[("A", &["B", "B"]), ("B", &[])]);
        let edges = GraphBuilder::new()
            .build(&idx, &roots(&["A"]))
            .expect("build graph");

        assert_eq!(pairs(&edges), vec![("A", "B"), ("A", "B")]);
    }

    #[test]
    fn repeated_builds_are_identical() {
        let idx = index(&[
            ("A", &["B", "C", "D"]),
            ("B", &["D", "C"]),
            ("C", &["D"]),
            ("D", &["A"]),
        ]);
        let builder = GraphBuilder::new();
        let first = builder.build(&idx, &roots(&["A", "C"])).expect("first");
        for _ in 0..10 {
            let again = builder.build(&idx, &roots(&["A", "C"])).expect("again");
            assert_eq!(again, first);
        }
    }

    #[test]
    fn every_reachable_project_is_visited_once() {
        let idx = index(&[
            ("A", &["B", "C"]),
            ("B", &["C", "D"]),
            ("C", &["D", "A"]),
            ("D", &[]),
            ("unreachable", &["A"]),
        ]);
        let traversal = GraphBuilder::new()
            .traverse(&idx, &roots(&["A", "A"]))
            .expect("traverse graph");

        let mut visited = traversal.visited.clone();
        visited.sort();
        assert_eq!(visited, roots(&["A", "B", "C", "D"]));
        assert_eq!(traversal.edges.len(), 6);
    }

    #[test]
    fn empty_roots_produce_no_edges() {
        let idx = index(&[("A", &["B"]), ("B", &[])]);
        let edges = GraphBuilder::new().build(&idx, &[]).expect("build graph");
        assert!(edges.is_empty());
    }

    #[test]
    fn unknown_root_fails_the_build() {
        let idx = index(&[("A", &["B"]), ("B", &[])]);
        let err = GraphBuilder::new()
            .build(&idx, &roots(&["ghost", "A"]))
            .expect_err("unknown root should fail");

        match err {
            GraphError::UnknownProject { id } => assert_eq!(id.as_str(), "ghost"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_requirement_fails_the_build() {
        let idx = index(&[("A", &["B", "ghost"]), ("B", &[])]);
        let err = GraphBuilder::new()
            .build(&idx, &roots(&["A"]))
            .expect_err("unknown requirement should fail");

        assert!(matches!(
            err,
            GraphError::UnknownProject { ref id } if id.as_str() == "ghost"
        ));
    }

    #[test]
    fn skip_policy_records_missing_references() {
        let idx = index(&[("A", &["ghost", "B"]), ("B", &[])]);
        let traversal = GraphBuilder::new()
            .with_policy(UnknownPolicy::Skip)
            .traverse(&idx, &roots(&["phantom", "A"]))
            .expect("skip policy should not fail");

        assert_eq!(pairs(&traversal.edges), vec![("A", "B")]);
        assert_eq!(
            traversal.missing,
            vec![
                MissingReference {
                    from: None,
                    id: ProjectId::new("phantom"),
                },
                MissingReference {
                    from: Some(ProjectId::new("A")),
                    id: ProjectId::new("ghost"),
                },
            ]
        );
    }

    #[test]
    fn cancelled_flag_aborts_build() {
        let idx = index(&[("A", &["B"]), ("B", &[])]);
        let flag = Arc::new(AtomicBool::new(true));
        let err = GraphBuilder::new()
            .with_cancel(flag)
            .build(&idx, &roots(&["A"]))
            .expect_err("cancelled build should fail");

        assert!(matches!(err, GraphError::Cancelled));
    }

    fn cancel_after(pops: usize) -> (Arc<AtomicUsize>, impl Fn() -> bool + Send + Sync) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let check = move || counter.fetch_add(1, Ordering::SeqCst) + 1 > pops;
        (calls, check)
    }

    #[test]
    fn cancellation_midway_stops_before_next_project() {
        let idx = index(&[("A", &["B"]), ("B", &["C"]), ("C", &[])]);
        let (calls, check) = cancel_after(1);

        let err = GraphBuilder::new()
            .with_cancel_check(check)
            .build(&idx, &roots(&["A"]))
            .expect_err("build should be cancelled at the second pop");

        assert!(matches!(err, GraphError::Cancelled));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn cancellation_requested_after_last_pop_is_ignored() {
        let idx = index(&[("A", &["B"]), ("B", &[])]);
        let (calls, check) = cancel_after(2);

        let edges = GraphBuilder::new()
            .with_cancel_check(check)
            .build(&idx, &roots(&["A"]))
            .expect("drained traversal should complete");

        assert_eq!(pairs(&edges), vec![("A", "B")]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn unknown_policy_parses_case_insensitively() {
        assert_eq!("SKIP".parse::<UnknownPolicy>(), Ok(UnknownPolicy::Skip));
        assert_eq!("fail".parse::<UnknownPolicy>(), Ok(UnknownPolicy::Fail));
        assert!("ignore".parse::<UnknownPolicy>().is_err());
    }
}
