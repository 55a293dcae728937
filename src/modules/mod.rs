//! Modules layer - Infrastructure components backing the features
//!
//! Contains the catalog stores and the demo seed routine.

pub mod catalog;
