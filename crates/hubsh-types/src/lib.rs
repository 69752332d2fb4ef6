//! Shared types for the hubsh interactive shell.

mod command;
mod result;
mod wizard;

pub use command::*;
pub use result::*;
pub use wizard::*;
