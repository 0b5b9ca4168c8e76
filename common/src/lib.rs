//! Shelf-life model for perishable dairy products.
//!
//! The catalog fixes per-type storage parameters, the decay model turns a
//! product's intake time and latest storage conditions into a freshness tier,
//! and the alert scan applies it across a set of products.

pub mod alert;
pub mod catalog;
pub mod decay;
pub mod error;
pub mod product;
pub mod reading;
pub mod simulator;
