// Copyright 2025 MindShow contributors
// SPDX-License-Identifier: Apache-2.0

//! # mindshow-link
//!
//! Controller connection management: one persistent websocket per lighting
//! controller, each owned by its own async task with independent throttle
//! and reconnect/backoff state. A stalled or dead controller never blocks
//! delivery to the healthy ones.
//!
//! Updates fan out from the tick loop through a latest-wins channel; a
//! task still busy with the previous tick simply sees the newest value
//! next time it looks. There is no cross-controller ordering guarantee and
//! none is needed - controllers converge on the current state, possibly a
//! tick or two apart.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod backoff;
pub mod controller;
pub mod error;
pub mod manager;
pub mod protocol;

pub use backoff::ReconnectPolicy;
pub use controller::{ConnectionState, ControllerSpec};
pub use error::{LinkError, LinkResult};
pub use manager::{ConnectionManager, LinkConfig};
