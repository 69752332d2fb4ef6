//! hubsh library: configuration, dispatch policy, rendering and the
//! interactive loop. Split from main.rs so the loop can be driven in tests.

pub mod config;
pub mod dispatch;
pub mod logging;
pub mod render;
pub mod repl;
pub mod state;
