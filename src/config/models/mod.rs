//! Configuration model structs

pub mod server;
pub mod upload;
pub mod vision;

pub use server::ServerConfig;
pub use upload::UploadConfig;
pub use vision::VisionConfig;
