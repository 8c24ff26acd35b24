//! Resultview library crate.
//!
//! The stable, supported API surface is exposed via [`crate::api`] and
//! [`crate::prelude`]. These modules are intended for embedding resultview
//! in report viewers and tooling and follow SemVer.
//!
//! Other modules back the CLI implementation and may change more frequently.

pub mod api;
pub mod prelude;

pub mod alert;
pub mod cli;
pub mod clock;
pub mod commands;
pub mod config;
pub mod display;
pub mod duration;
pub mod error;
pub mod fetch;
pub mod model;
pub mod query;
pub mod router;
pub mod toggle;
pub mod transport;
