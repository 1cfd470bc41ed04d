//! JMRI Client Library
//!
//! Talks to a JMRI web server over both of its JSON interfaces: a persistent
//! WebSocket session for stateful objects such as throttles, and plain HTTP
//! for catalog data such as reporter listings. Callers use one facade,
//! [`JmriClient`], and the client picks the transport per object type and
//! operation.
//!
//! # Example
//!
//! ```rust,no_run
//! use jmri_client::{ClientConfig, JmriClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = JmriClient::connect(ClientConfig::new("localhost", 12080)).await?;
//!
//!     // Catalog listing over HTTP
//!     let reporters = client.list_reporters().await?;
//!
//!     // Reporter state over the session
//!     let state = client.get_reporter_state("MR001").await?;
//!
//!     // Bind a throttle to address 138 and run it forward at half speed
//!     client.run_train(138, 0.5, "forward").await?;
//!
//!     client.close().await;
//!     Ok(())
//! }
//! ```
//!
//! # Testing
//!
//! The `testing` module provides a mock JMRI server:
//!
//! ```rust,ignore
//! use jmri_client::testing::MockJmriServer;
//!
//! let server = MockJmriServer::start().await?;
//! let client = JmriClient::connect(server.client_config()).await?;
//! ```

mod client;
pub mod config;
pub mod envelope;
mod error;
pub mod http;
pub mod registry;
pub mod session;
pub mod testing;
pub mod throttle;
mod types;

pub use client::JmriClient;
pub use config::ClientConfig;
pub use envelope::{Payload, Reply};
pub use error::{JmriError, Result};
pub use registry::{Intent, ObjectTypeDescriptor, Transport};
pub use session::{Session, SessionState};
pub use throttle::TrainRun;
pub use types::*;
