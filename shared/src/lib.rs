pub mod protocol;
pub mod song;

pub use protocol::*;
pub use song::*;
