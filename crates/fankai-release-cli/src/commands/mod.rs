//! CLI command implementations

mod images;
mod init;
mod plan;
mod release;

pub use images::ImagesCommand;
pub use init::InitCommand;
pub use plan::PlanCommand;
pub use release::ReleaseCommand;
