//! Database queries

pub mod case;
pub mod lookup;
