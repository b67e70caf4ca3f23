//! Implementation of the `#[derive(Listable)]` macro.
//!
//! Generates field constants, default search fields and the value accessor
//! from `#[list(...)]` struct annotations.

mod attrs;
mod derive;

pub use derive::listable_derive_impl;
