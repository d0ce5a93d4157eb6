//! taxotree: weighted taxonomy trees
//!
//! A taxonomy is an ordered tree of named, weighted items living in an
//! arena. Leaves carry raw scores; internal items receive aggregated
//! scores on demand. Trees load from CSV or JSON records and export as
//! flat records or a nested projection.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
