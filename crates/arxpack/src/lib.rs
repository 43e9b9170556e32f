pub mod export;
pub mod package;

pub use export::ArtifactKind;
pub use export::Error;
pub use export::ExportGroups;
pub use export::ExportItem;
pub use export::ExportProvider;
pub use export::NativeBinaryExporter;
pub use export::Result;
pub use export::discover;

pub use package::ExecutionEnvironment;
pub use package::Package;
pub use package::PackageId;

#[cfg(test)]
mod tests;
