pub mod amount;
pub mod ranking;
pub mod timestamp;
pub mod trade;
pub mod volume;

pub use ranking::*;
pub use trade::*;
pub use volume::*;
