// Core data models for Cosboard
// These structs represent the domain entities

pub mod contestant;
pub mod access_key;

pub use contestant::*;
pub use access_key::*;
