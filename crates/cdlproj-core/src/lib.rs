// Analysis engine modules
pub mod project;

// Re-exports
pub use project::{AnalysisOptions, analyze};

pub use project::bankaddr::AddressPolicy;
pub use project::error::ProjectError;
pub use project::labels::LabelTable;
pub use project::model::{Bank, ChrWindow, ProjectModel};
