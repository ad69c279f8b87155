// Engine library root
// Stock shortage reports, document drafting and the gRPC service over them.

pub mod config;
pub mod data;
pub mod documents;
pub mod error;
pub mod reports;
pub mod services;
