//! # Core Runtime Module
//!
//! Foundational runtime infrastructure shared by every MusicPod core crate:
//! - Logging and tracing setup
//! - Configuration and bridge validation
//! - The event bus that carries state changes to views
//!
//! ## Overview
//!
//! Nothing in here knows about tracks or users. Domain crates build on the
//! [`config::CoreConfig`] they are handed and publish through
//! [`events::EventBus`].

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
