//! Type definitions

pub mod case;
pub mod import;
pub mod lookup;
pub mod messages;

pub use case::*;
pub use import::*;
pub use lookup::*;
pub use messages::*;
