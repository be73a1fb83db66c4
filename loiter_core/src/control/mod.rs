// loiter_core/src/control/mod.rs

//! Feedback control: the generic axis PID, the yaw PI loop, position hold and
//! the operator-command dispatcher.

pub mod dispatch;
pub mod hold;
pub mod pid;
pub mod yaw;

pub use dispatch::{Dispatch, ModeDispatcher};
pub use hold::{HoldController, HoldStep};
pub use pid::AxisController;
pub use yaw::YawController;
