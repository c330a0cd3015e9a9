//! # Camera Test Upload
//!
//! Multipart clip upload client and the upload test server it talks to.
//! Both sides share the wire types in [`protocol`].

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod protocol;
pub mod server;

// Re-export main types
pub use client::{HttpUploadClient, UploadClient, DEFAULT_UPLOAD_URL};
pub use protocol::{ServerAck, UploadMetadata, UploadReceipt};
pub use server::{ServerConfig, UploadServer};
