pub mod manifest;
pub mod memory;
pub mod traits;

pub use manifest::ManifestSource;
pub use memory::StaticSource;
pub use traits::DependencySource;
