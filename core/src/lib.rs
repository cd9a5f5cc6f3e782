//! skald-core reconstructs a battle event timeline from a captured
//! session log.
//!
//! A captured log interleaves two views of the same battle: structured
//! extension records from the networking layer and human-oriented message
//! lines. [`load_battle`] cuts the log at the last joinbattle marker,
//! builds the battle model from the initial object dump, extracts typed
//! events from each stream, and merges them into one canonical timeline.

pub mod battle;
pub mod error;
pub mod events;
pub mod extract;
pub mod session_log;
pub mod timeline;

pub use battle::Battle;
pub use error::ReconstructError;
pub use events::{ExEvent, ExEventKind, MsgEvent};
pub use session_log::{ExtensionRecord, MessageRecord};
pub use timeline::{CanonicalEvent, Provenance};

use serde_json::Value;
use std::path::Path;

/// The reconstructed battle: the canonical timeline plus the populated
/// battle model the downstream viewer needs to interpret it.
#[derive(Debug, serde::Serialize)]
pub struct Reconstruction {
    pub timeline: Vec<CanonicalEvent>,
    pub battle: Battle,
}

/// Reconstruct from already-parsed record streams.
///
/// The object dump is taken from `objects` when supplied, otherwise from
/// the joinbattle record at the head of the extension stream; having
/// neither is the "no data" case.
pub fn reconstruct(
    extensions: &[ExtensionRecord],
    messages: &[MessageRecord],
    objects: Option<&[Value]>,
) -> Result<Reconstruction, ReconstructError> {
    let objects = match objects {
        Some(objects) => objects,
        None => extensions
            .first()
            .and_then(ExtensionRecord::objects)
            .map(Vec::as_slice)
            .ok_or(ReconstructError::MissingObjects)?,
    };

    let mut battle = battle::build_battle(objects);
    if !battle.is_described() {
        tracing::warn!("battle not completely described by object dump");
    }

    // Extension first: it performs the single sanctioned battle mutation
    // (user identity); the message extractor reads the model immutably.
    let ex_events = extract::extension_events(&mut battle, extensions);
    let msg_events = extract::message_events(&battle, messages)?;
    let timeline = timeline::refine_events(&battle, ex_events, msg_events);

    Ok(Reconstruction { timeline, battle })
}

/// Reconstruct from raw captured log text.
pub fn load_battle(log: &str) -> Result<Reconstruction, ReconstructError> {
    let session = session_log::split_session(log)?;
    reconstruct(&session.extensions, &session.messages, None)
}

/// Reconstruct from a captured log file on disk.
pub fn load_battle_file(path: impl AsRef<Path>) -> Result<Reconstruction, ReconstructError> {
    let text = session_log::read_log_file(path.as_ref())?;
    load_battle(&text)
}
