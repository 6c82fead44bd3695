#![doc = include_str!("../README.md")]

mod clients;
pub mod harness;
mod network;
pub mod tracing;

pub use clients::RecordingClients;
pub use harness::{Harness, ORIGIN, TestGateway, test_config};
pub use network::{MockNetwork, Unreachable};
