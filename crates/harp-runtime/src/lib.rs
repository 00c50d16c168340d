//! harp runtime.
//!
//! Assembles the SDK crates into addressable, message-driven components.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                       Embedder                            │
//! │   builds Arc<Directory>, drives each Component::run()     │
//! └───────────────────────────────────────────────────────────┘
//!            │ build(&dir)                    │ push_message
//!            ▼                                ▼
//! ┌───────────────────────┐        ┌───────────────────────┐
//! │   Component "cpu"     │──msg──▶│   Component "mem"     │
//! │   queue ▸ dispatch    │        │   queue ▸ dispatch    │
//! └───────────────────────┘        └───────────────────────┘
//!            │                                │
//!            └────────── Arc<Directory> ──────┘
//! ```
//!
//! # Modules
//!
//! - [`queue`]: priority-ordered inbox with async wake-up
//! - [`directory`]: process-wide name → handle registry
//! - [`connection`]: per-component outbound edges and criteria
//! - [`dispatch`]: operation table, argument binding, execution
//! - [`component`]: the component and its builder
//! - [`config`]: layered runtime configuration
//! - [`testing`]: fixtures for tests and benches
//!
//! The runtime has no scheduler. Who calls `run()` and when is up to the
//! embedder.

pub mod component;
pub mod config;
pub mod connection;
pub mod directory;
pub mod dispatch;
pub mod queue;
pub mod testing;

pub use component::{Component, ComponentBuilder};
pub use config::{ConfigError, ConfigLoader, RuntimeConfig};
pub use connection::ConnectionSet;
pub use directory::{ComponentHandle, Directory};
pub use dispatch::{Bindings, BUILTIN_OPERATIONS, Handler, Operation, OperationTable};
pub use queue::{timestamp_priority, MessageQueue, PriorityFn};

pub use harp_component::{ComponentError, Outcome, Status};
