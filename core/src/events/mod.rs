//! Typed battle events, one closed sum type per record stream.

mod extension;
mod message;

pub use extension::{CardSpec, ExEvent, ExEventKind, TriggerRoll};
pub use message::MsgEvent;
