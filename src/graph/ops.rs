use rayon::prelude::*;
use tracing::{info, warn};

use crate::core::project::ProjectId;
use crate::error::Result;
use crate::graph::{DependencyIndex, EdgeSink, GraphBuilder, Traversal};
use crate::source::DependencySource;

/// Loads a snapshot, builds its graph from the source's own roots and hands
/// the edges to `sink`. Returns the number of edges rendered.
pub fn build_from_source(
    source: &dyn DependencySource,
    builder: &GraphBuilder,
    sink: &mut dyn EdgeSink,
) -> Result<usize> {
    let (index, roots) = source.load()?;
    let edges = builder.build(&index, &roots)?;
    sink.render(&edges)?;
    info!(
        projects = index.len(),
        roots = roots.len(),
        edges = edges.len(),
        "rendered dependency graph"
    );
    Ok(edges.len())
}

#[derive(Debug)]
pub struct RootBuild {
    pub root: ProjectId,
    pub result: crate::graph::Result<Traversal>,
}

/// One independent build per root over the shared index. Results come back
/// in root order regardless of `jobs`; `None` or `Some(1)` stays on the
/// calling thread.
pub fn build_per_root(
    index: &DependencyIndex,
    roots: &[ProjectId],
    builder: &GraphBuilder,
    jobs: Option<usize>,
) -> Vec<RootBuild> {
    let build_one = |root: &ProjectId| RootBuild {
        root: root.clone(),
        result: builder.traverse(index, std::slice::from_ref(root)),
    };

    match jobs {
        Some(count) if count > 1 => {
            match rayon::ThreadPoolBuilder::new().num_threads(count).build() {
                Ok(pool) => pool.install(|| roots.par_iter().map(build_one).collect()),
                Err(err) => {
                    warn!("falling back to sequential builds: {err}");
                    roots.iter().map(build_one).collect()
                }
            }
        }
        _ => roots.iter().map(build_one).collect(),
    }
}
