//! Reference environments for the CLI and tests.

pub mod corridor;

pub use corridor::{Corridor, corridor_actions};
