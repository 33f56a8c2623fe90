mod classify;
mod edit;
mod freeze;
mod ik_map;
mod kinematics;
mod reconcile;
mod reference;

pub use classify::*;
pub use edit::*;
pub use freeze::*;
pub use ik_map::*;
pub use kinematics::*;
pub use reconcile::*;
pub use reference::*;
