pub mod project;

pub use project::{ProjectId, ProjectRecord};
