//! JSON-RPC API Layer
//!
//! Exposes the FleetSure job and runner-task lifecycles as JSON-RPC 2.0
//! methods (`job.*.v1`, `runner.task.*.v1`).

pub mod error;
pub mod handler;
pub mod server;
pub mod types;

pub use server::{RpcServer, RpcServerConfig, ServerError};
