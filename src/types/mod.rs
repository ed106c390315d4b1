//! Type lattice

mod type_system;

pub use type_system::{unify, Type};
