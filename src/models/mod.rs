mod message;
mod range;

pub use message::Message;
pub use range::{LoadDirection, LoadPurpose, LoadRange, PageBounds};
