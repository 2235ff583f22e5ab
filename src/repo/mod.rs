pub mod contestant;
pub mod access_key;

pub use contestant::*;
pub use access_key::*;
