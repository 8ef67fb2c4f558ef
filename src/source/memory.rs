use crate::core::project::ProjectId;
use crate::error::Result;
use crate::graph::DependencyIndex;
use crate::source::DependencySource;

#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    pub index: DependencyIndex,
    pub roots: Vec<ProjectId>,
}

impl StaticSource {
    pub fn new(index: DependencyIndex, roots: Vec<ProjectId>) -> Self {
        Self { index, roots }
    }
}

impl DependencySource for StaticSource {
    fn load(&self) -> Result<(DependencyIndex, Vec<ProjectId>)> {
        Ok((self.index.clone(), self.roots.clone()))
    }
}
