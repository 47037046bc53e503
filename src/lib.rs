//! Together AI image generation node.
//!
//! [`ImageRequestAdapter`] is the node's single operation: it turns a prompt
//! and generation parameters into an [`ImageArtifact`], calling the hosted
//! API through an [`HttpTransport`] and substituting a red fallback image
//! whenever generation cannot complete. [`node::descriptor`] describes the
//! input schema the host registers.

pub mod adapters;
pub mod artifact;
pub mod cassette;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod generator;
pub mod imaging;
pub mod lora;
pub mod node;
pub mod output;
pub mod params;
pub mod ports;

pub use artifact::ImageArtifact;
pub use error::NodeError;
pub use generator::ImageRequestAdapter;
pub use node::{NodeInputs, NormalizedInputs};
pub use ports::HttpTransport;
