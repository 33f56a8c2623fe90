pub mod commands;
pub mod config;
pub mod export;
pub mod host;
pub mod math;
pub mod rig;
pub mod scene;
mod session;
#[cfg(test)] pub(crate) mod test_rig;

pub use config::*;
pub use session::*;
