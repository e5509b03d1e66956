//! AthenaCore host: the capability modules (Lilith, Dreamscape, memory and
//! trading) and the periodic tasks the `athenacore` binary schedules on a
//! [`athena_taskmatrix::TaskMatrix`].

pub mod dreamscape;
pub mod lilith;
pub mod memory;
pub mod tasks;
pub mod trading;

pub use dreamscape::{Dreamscape, PlaceholderDreamscape};
pub use lilith::{Lilith, PlaceholderLilith};
pub use memory::{Memory, PlaceholderMemory};
pub use tasks::{register_all, TaskContext};
pub use trading::{PlaceholderTrading, Trading};
