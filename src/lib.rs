//! SnoopR: wireless sighting analysis for Kismet captures
//!
//! Normalizes device and alert records, flags devices that move with the
//! observer, and places alerts that lack a position.

pub mod config;
pub mod database;
pub mod errors;
pub mod geodesy;
pub mod locator;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod report;
pub mod sanitize;
pub mod snooper;
pub mod tracks;
