//! Title resolution service.
//!
//! Ties the catalog index, variant classification and mirror translation
//! together into the flow a front end needs:
//!
//! 1. [`open`] a [`Resolver`], from the snapshot when possible
//! 2. [`Resolver::resolve`] a title to a catalog entry
//! 3. [`Resolver::list_variants`] of that entry
//! 4. [`Resolver::select_variant`] to get a mirror path
//!
//! [`Resolver::query`] offers the same flow as a typestate, so that a variant
//! can only be selected from a list that was actually produced.

pub mod error;
pub mod fetch;
mod open;
mod resolve;

pub use crate::open::{IndexOrigin, Opened, open};
pub use crate::resolve::{FileVariant, Listed, Matched, Query, QueryState, Resolution, Resolver};
