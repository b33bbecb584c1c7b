//! Subcommands of the `tabular-q` binary

pub mod inspect;
pub mod train;
