//! Timeline refinement: merge the two event sequences into one canonical,
//! deduplicated, fully-resolved timeline.
//!
//! The extension stream is the backbone (denser and index-accurate). Both
//! sequences are segmented at anchor events the streams share (turn
//! changes and passes) and aligned segment by segment. Within a segment,
//! each message event either corroborates the first unclaimed extension
//! event describing the same occurrence, or is inserted as a
//! message-stream-only entry right after the extension event its nearest
//! corroborated predecessor matched. Tie-break: when both streams claim a
//! position the extension stream wins; message-only entries follow the
//! extension event they anchor to.

mod display;

use serde::Serialize;

use crate::battle::Battle;
use crate::events::{ExEvent, ExEventKind, MsgEvent};

/// Which stream(s) vouch for a timeline entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Provenance {
    Extension,
    Message,
    Corroborated,
}

/// Index/name identity annotation. Events stay immutable; the refiner
/// records the mapping between display names and index identities here.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Resolution {
    pub player_index: Option<usize>,
    pub player_name: Option<String>,
    /// (player_index, group_index) of the group the event speaks about.
    pub group: Option<(usize, usize)>,
    pub group_name: Option<String>,
}

/// One entry of the canonical timeline.
#[derive(Debug, Clone, Serialize)]
pub struct CanonicalEvent {
    pub provenance: Provenance,
    pub extension: Option<ExEvent>,
    pub message: Option<MsgEvent>,
    pub resolution: Option<Resolution>,
}

/// Merge both event sequences into the canonical timeline.
pub fn refine_events(
    battle: &Battle,
    ex_events: Vec<ExEvent>,
    msg_events: Vec<MsgEvent>,
) -> Vec<CanonicalEvent> {
    let ex_segments = segment(ex_events, ex_anchor);
    let mut msg_segments: Vec<Option<Segment<MsgEvent>>> =
        segment(msg_events, |e| msg_anchor(battle, e))
            .into_iter()
            .map(Some)
            .collect();

    let mut out = Vec::new();
    let mut cursor = 0;

    for ex_seg in ex_segments {
        let partner = match ex_seg.anchor {
            None => {
                // The preamble segment pairs with the message preamble.
                match msg_segments.get_mut(cursor) {
                    Some(slot) if slot.as_ref().is_some_and(|s| s.anchor.is_none()) => {
                        cursor += 1;
                        slot.take()
                    }
                    _ => None,
                }
            }
            Some(anchor) => {
                match msg_segments[cursor..]
                    .iter()
                    .position(|s| s.as_ref().is_some_and(|s| s.anchor == Some(anchor)))
                {
                    Some(offset) => {
                        // Message segments with no extension counterpart sit
                        // between the last pairing and this anchor.
                        for slot in &mut msg_segments[cursor..cursor + offset] {
                            if let Some(seg) = slot.take() {
                                flush_message_only(battle, seg.events, &mut out);
                            }
                        }
                        cursor += offset + 1;
                        msg_segments[cursor - 1].take()
                    }
                    None => None,
                }
            }
        };
        merge_segment(battle, ex_seg, partner, &mut out);
    }

    // Whatever the message stream still holds goes at the tail, in order.
    for slot in msg_segments.into_iter().skip(cursor) {
        if let Some(seg) = slot {
            flush_message_only(battle, seg.events, &mut out);
        }
    }

    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Segmentation
// ─────────────────────────────────────────────────────────────────────────────

/// Event kinds shared by both streams, used to align them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    /// A player's turn begins.
    Turn(usize),
    /// A pass, keyed by the passing player when known.
    Pass(Option<usize>),
}

struct Segment<T> {
    anchor: Option<Anchor>,
    /// The anchor event itself is the first element when `anchor` is set.
    events: Vec<T>,
}

fn segment<T>(events: Vec<T>, anchor_of: impl Fn(&T) -> Option<Anchor>) -> Vec<Segment<T>> {
    let mut segments = vec![Segment {
        anchor: None,
        events: Vec::new(),
    }];
    for event in events {
        if let Some(anchor) = anchor_of(&event) {
            segments.push(Segment {
                anchor: Some(anchor),
                events: vec![event],
            });
        } else if let Some(current) = segments.last_mut() {
            current.events.push(event);
        }
    }
    segments
}

fn ex_anchor(event: &ExEvent) -> Option<Anchor> {
    match &event.kind {
        ExEventKind::StartTimer { player_index, .. } => Some(Anchor::Turn(*player_index)),
        ExEventKind::Pass => Some(Anchor::Pass(event.turn)),
        _ => None,
    }
}

fn msg_anchor(battle: &Battle, event: &MsgEvent) -> Option<Anchor> {
    match event {
        MsgEvent::ActivePlayer { player } | MsgEvent::StartTimer { player, .. } => {
            battle.player_index_by_name(player).map(Anchor::Turn)
        }
        MsgEvent::Pass { player } | MsgEvent::EndedRound { player } => battle
            .player_index_by_name(player)
            .map(|i| Anchor::Pass(Some(i))),
        _ => None,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Merging
// ─────────────────────────────────────────────────────────────────────────────

fn merge_segment(
    battle: &Battle,
    ex_seg: Segment<ExEvent>,
    msg_seg: Option<Segment<MsgEvent>>,
    out: &mut Vec<CanonicalEvent>,
) {
    let ex_events = ex_seg.events;
    let msgs = msg_seg.map(|s| s.events).unwrap_or_default();

    // ex index -> claiming message index
    let mut claimed_by: Vec<Option<usize>> = vec![None; ex_events.len()];
    // message index -> placement (matched ex index, or insertion point)
    enum Placement {
        Matched(usize),
        After(Option<usize>),
    }
    let mut placements: Vec<Placement> = Vec::with_capacity(msgs.len());
    let mut last_matched: Option<usize> = None;

    for (i, msg) in msgs.iter().enumerate() {
        // Paired segments open with the same anchor occurrence.
        if i == 0 && ex_seg.anchor.is_some() && !ex_events.is_empty() {
            claimed_by[0] = Some(0);
            placements.push(Placement::Matched(0));
            last_matched = Some(0);
            continue;
        }
        let matched = ex_events
            .iter()
            .enumerate()
            .position(|(j, ex)| claimed_by[j].is_none() && corresponds(battle, ex, msg));
        match matched {
            Some(j) => {
                claimed_by[j] = Some(i);
                placements.push(Placement::Matched(j));
                last_matched = Some(j);
            }
            None => placements.push(Placement::After(last_matched)),
        }
    }

    let mut msg_slots: Vec<Option<MsgEvent>> = msgs.into_iter().map(Some).collect();

    // Message-only entries with no preceding match open the segment.
    for (i, placement) in placements.iter().enumerate() {
        if matches!(placement, Placement::After(None)) {
            if let Some(msg) = msg_slots[i].take() {
                push_message_only(battle, msg, out);
            }
        }
    }

    for (j, ex) in ex_events.into_iter().enumerate() {
        let message = claimed_by[j].and_then(|i| msg_slots[i].take());
        let resolution = resolve_ex(battle, &ex);
        out.push(CanonicalEvent {
            provenance: if message.is_some() {
                Provenance::Corroborated
            } else {
                Provenance::Extension
            },
            extension: Some(ex),
            message,
            resolution,
        });
        for (i, placement) in placements.iter().enumerate() {
            if matches!(placement, Placement::After(Some(pos)) if *pos == j) {
                if let Some(msg) = msg_slots[i].take() {
                    push_message_only(battle, msg, out);
                }
            }
        }
    }
}

fn flush_message_only(battle: &Battle, events: Vec<MsgEvent>, out: &mut Vec<CanonicalEvent>) {
    for msg in events {
        push_message_only(battle, msg, out);
    }
}

fn push_message_only(battle: &Battle, msg: MsgEvent, out: &mut Vec<CanonicalEvent>) {
    match resolve_msg(battle, &msg) {
        Ok(resolution) => out.push(CanonicalEvent {
            provenance: Provenance::Message,
            extension: None,
            message: Some(msg),
            resolution,
        }),
        // Resolution failure drops the event rather than emitting partial
        // identity.
        Err(name) => tracing::debug!(%name, "dropped message event with unresolvable name"),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Correspondence and resolution
// ─────────────────────────────────────────────────────────────────────────────

/// Do an extension event and a message event describe the same occurrence?
fn corresponds(battle: &Battle, ex: &ExEvent, msg: &MsgEvent) -> bool {
    let player_is = |name: &str, index: usize| battle.player_index_by_name(name) == Some(index);
    let group_is = |name: &str, pi: usize, gi: usize| {
        battle.group_index_by_name(name) == Some((pi, gi))
    };

    match (&ex.kind, msg) {
        (
            ExEventKind::CardDraw(spec),
            MsgEvent::CardDraw {
                player,
                group,
                card,
            },
        ) => {
            player_is(player, spec.player_index)
                && group_is(group, spec.player_index, spec.group_index)
                // A hidden draw corroborates any draw for the same group.
                && card.as_ref().is_none_or(|c| *c == spec.card_name)
        }
        (ExEventKind::CardPlay(spec), MsgEvent::CardPlay { group, card, .. }) => {
            group_is(group, spec.player_index, spec.group_index) && *card == spec.card_name
        }
        (ExEventKind::CardDiscard(spec), MsgEvent::Discard { group, card }) => {
            group_is(group, spec.player_index, spec.group_index) && *card == spec.card_name
        }
        (
            ExEventKind::MustDiscard {
                player_index,
                group_index,
            },
            MsgEvent::MustDiscard { group },
        ) => group_is(group, *player_index, *group_index),
        (ExEventKind::MustPlayTrait { player_index }, MsgEvent::MustPlayTrait { player }) => {
            player_is(player, *player_index)
        }
        (
            ExEventKind::TriggerInHand {
                player_index,
                group_index,
                ..
            },
            MsgEvent::TriggerInHand { group, .. },
        )
        | (
            ExEventKind::TriggerTrait {
                player_index,
                group_index,
                ..
            },
            MsgEvent::TriggerTrait { group, .. },
        ) => group_is(group, *player_index, *group_index),
        (
            ExEventKind::TriggerTerrain { x, y, .. },
            MsgEvent::TriggerTerrain { x: mx, y: my, .. },
        ) => x == mx && y == my,
        (ExEventKind::SelectSquare { x, y, fx, fy }, MsgEvent::Move { to, facing, .. }) => {
            *to == (*x, *y) && *facing == (*fx, *fy)
        }
        (
            ExEventKind::StartTimer { player_index, .. },
            MsgEvent::ActivePlayer { player } | MsgEvent::StartTimer { player, .. },
        ) => player_is(player, *player_index),
        (ExEventKind::PauseTimer { player_index, .. }, MsgEvent::PauseTimer { player }) => {
            player_is(player, *player_index)
        }
        (ExEventKind::Pass, MsgEvent::Pass { player } | MsgEvent::EndedRound { player }) => {
            match ex.turn {
                Some(turn) => player_is(player, turn),
                None => true,
            }
        }
        _ => false,
    }
}

/// Annotate an extension event with the display names behind its indices.
fn resolve_ex(battle: &Battle, ex: &ExEvent) -> Option<Resolution> {
    let (player_index, group) = match &ex.kind {
        ExEventKind::CardDraw(spec)
        | ExEventKind::CardReveal(spec)
        | ExEventKind::CardPlay(spec)
        | ExEventKind::CardDiscard(spec) => (
            Some(spec.player_index),
            Some((spec.player_index, spec.group_index)),
        ),
        ExEventKind::MustDiscard {
            player_index,
            group_index,
        }
        | ExEventKind::TriggerInHand {
            player_index,
            group_index,
            ..
        }
        | ExEventKind::TriggerTrait {
            player_index,
            group_index,
            ..
        } => (Some(*player_index), Some((*player_index, *group_index))),
        ExEventKind::StartTimer { player_index, .. }
        | ExEventKind::PauseTimer { player_index, .. }
        | ExEventKind::MustPlayTrait { player_index } => (Some(*player_index), None),
        _ => (None, None),
    };

    if player_index.is_none() && group.is_none() {
        return None;
    }

    Some(Resolution {
        player_index,
        player_name: player_index
            .and_then(|i| battle.players.get(i))
            .and_then(|p| p.name.clone()),
        group,
        group_name: group
            .and_then(|(pi, gi)| battle.group(pi, gi))
            .and_then(|g| g.name.clone()),
    })
}

/// Resolve a message event's display names to index identities.
/// A name the battle model does not know is a resolution failure.
fn resolve_msg(battle: &Battle, msg: &MsgEvent) -> Result<Option<Resolution>, String> {
    let mut resolution = Resolution::default();
    let mut resolved_any = false;

    if let Some(name) = msg.player_name() {
        match battle.player_index_by_name(name) {
            Some(index) => {
                resolution.player_index = Some(index);
                resolution.player_name = Some(name.to_string());
                resolved_any = true;
            }
            None => return Err(name.to_string()),
        }
    }
    if let Some(name) = msg.group_name() {
        match battle.group_index_by_name(name) {
            Some(pair) => {
                resolution.group = Some(pair);
                resolution.group_name = Some(name.to_string());
                resolved_any = true;
            }
            None => return Err(name.to_string()),
        }
    }

    Ok(resolved_any.then_some(resolution))
}

#[cfg(test)]
mod tests;
