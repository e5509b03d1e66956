//! TaskMatrix -- registers tasks and drives one timer per task.
//!
//! Split into focused submodules:
//! - `core`: TaskMatrix struct, builder, registration, and accessor methods
//! - `lifecycle`: start/stop and timer arming

mod core;
mod lifecycle;

pub use self::core::{TaskMatrix, TaskMatrixBuilder};
