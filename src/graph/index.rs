use std::collections::HashMap;

use crate::core::project::{ProjectId, ProjectRecord};
use crate::graph::{GraphError, Result};

/// Read-only snapshot of every known project keyed by id.
#[derive(Debug, Clone, Default)]
pub struct DependencyIndex {
    records: HashMap<ProjectId, ProjectRecord>,
}

impl DependencyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later records replace earlier ones that share an id.
    pub fn from_records(records: impl IntoIterator<Item = ProjectRecord>) -> Self {
        records.into_iter().collect()
    }

    pub fn lookup(&self, id: &ProjectId) -> Result<&ProjectRecord> {
        self.records
            .get(id)
            .ok_or_else(|| GraphError::UnknownProject { id: id.clone() })
    }

    pub fn contains(&self, id: &ProjectId) -> bool {
        self.records.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &ProjectRecord> {
        self.records.values()
    }
}

impl FromIterator<ProjectRecord> for DependencyIndex {
    fn from_iter<I: IntoIterator<Item = ProjectRecord>>(iter: I) -> Self {
        let records = iter
            .into_iter()
            .map(|record| (record.id.clone(), record))
            .collect();
        Self { records }
    }
}

#[cfg(test)]
mod tests {
    use crate::core::project::{ProjectId, ProjectRecord};
    use crate::graph::{DependencyIndex, GraphError};

    #[test]
    fn lookup_returns_record_for_known_id() {
        let index = DependencyIndex::from_records([
            ProjectRecord::new("app.csproj", "App", ["lib.csproj"]),
            ProjectRecord::new("lib.csproj", "Lib", Vec::<String>::new()),
        ]);

        let record = index
            .lookup(&ProjectId::new("app.csproj"))
            .expect("app record");
        assert_eq!(record.display_name, "App");
        assert_eq!(record.required_ids, vec![ProjectId::new("lib.csproj")]);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn lookup_reports_missing_id() {
        let index = DependencyIndex::new();
        let err = index
            .lookup(&ProjectId::new("ghost"))
            .expect_err("lookup should fail");
        match err {
            GraphError::UnknownProject { id } => assert_eq!(id.as_str(), "ghost"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(index.is_empty());
    }

    #[test]
    fn later_record_with_same_id_wins() {
        let index = DependencyIndex::from_records([
            ProjectRecord::new("a", "First", Vec::<String>::new()),
            ProjectRecord::new("a", "Second", ["b"]),
        ]);

        assert_eq!(index.len(), 1);
        let record = index.lookup(&ProjectId::new("a")).expect("a record");
        assert_eq!(record.display_name, "Second");
    }
}
