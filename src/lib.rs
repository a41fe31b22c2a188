//! Liftfit: accelerometer exercise-quality study library
//!
//! Loads a labeled accelerometer dataset, prunes uninformative columns,
//! makes a stratified split and compares a decision tree, a random forest and
//! a random forest on importance-selected features.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
