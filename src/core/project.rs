use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProjectId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A project as handed over by the loader: names and direct requirements
/// are already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRecord {
    pub id: ProjectId,
    pub display_name: String,
    /// Direct requirements in declaration order. May repeat ids or name
    /// projects the index does not know about.
    pub required_ids: Vec<ProjectId>,
}

impl ProjectRecord {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        required_ids: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            id: ProjectId::new(id),
            display_name: display_name.into(),
            required_ids: required_ids.into_iter().map(ProjectId::new).collect(),
        }
    }
}
