use crate::core::project::ProjectId;
use crate::error::Result;
use crate::graph::DependencyIndex;

/// Supplies the snapshot a graph build runs over: every known project and
/// the roots to start from, in the order they should be pushed.
pub trait DependencySource {
    fn load(&self) -> Result<(DependencyIndex, Vec<ProjectId>)>;
}
