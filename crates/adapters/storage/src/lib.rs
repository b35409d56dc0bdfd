//! obra-adapter-storage - S3-compatible object storage
//!
//! Documents live in an S3-compatible bucket (MinIO in development). Reads
//! are served to clients through presigned GET URLs so object bytes never
//! pass through the API after upload.

mod client;
mod sigv4;

pub use client::S3Storage;
pub use sigv4::Presigner;

pub use obra_config::StorageConfig;
