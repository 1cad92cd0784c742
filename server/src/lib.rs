//! Painpoint Server Library
//!
//! CLI and MCP front ends for the painpoint feature matcher. The ranking
//! itself lives in `painpoint-core`; this crate wires files, encoders and
//! transports around it.

pub mod encoder;
pub mod error;
pub mod mcp;
pub mod service;

pub use encoder::{build_encoder, EncoderConfig, EncoderKind};
pub use error::{ServerError, ServerResult};
pub use service::{generate_embeddings, ServiceConfig, SolutionService};
