//! Core types and trait definitions for C-Meter.
//!
//! No HTTP or database dependencies live here. The crate holds the catalog
//! path model, ledger and nutrition records, the [`store::IntakeStore`] trait,
//! the navigation engine and the report builder.

// Store futures spell out their `Send` bounds; the lint does not apply.
#![allow(async_fn_in_trait)]

pub mod catalog;
pub mod error;
pub mod identity;
pub mod ledger;
pub mod nav;
pub mod nutrition;
pub mod path;
pub mod prefs;
pub mod report;
pub mod store;

pub use error::{Error, ErrorKind, Result};
