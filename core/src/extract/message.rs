//! Message-record event extraction.
//!
//! One forward pass over the message stream. Keyed records map directly
//! from their `Event` tag; free-text lines run through the name-aware
//! pattern battery. The battle model is read (for the name tables) but
//! never mutated here.

use regex::Regex;
use serde_json::Value;

use crate::battle::Battle;
use crate::error::ReconstructError;
use crate::events::MsgEvent;
use crate::extract::MessagePatterns;
use crate::session_log::{Fields, MessageRecord};

/// Extract typed events from the message stream, in stream order.
///
/// Requires the battle's display names to be resolved already (run after
/// the domain model builder).
pub fn message_events(
    battle: &Battle,
    records: &[MessageRecord],
) -> Result<Vec<MsgEvent>, ReconstructError> {
    let patterns = MessagePatterns::build(battle)?;
    let mut events = Vec::new();

    for record in records {
        match record {
            MessageRecord::Keyed { event, fields } => {
                if let Some(parsed) = keyed_event(event, fields) {
                    events.push(parsed);
                }
            }
            MessageRecord::Text(line) => text_events(&patterns, line, &mut events),
        }
    }

    Ok(events)
}

/// Direct one-to-one mapping from event-kind tag to event. Unknown tags
/// are ignored; a recognized tag with missing fields skips the record.
fn keyed_event(event: &str, fields: &Fields) -> Option<MsgEvent> {
    let get_str = |key: &str| -> Option<String> {
        fields.get(key).and_then(Value::as_str).map(str::to_string)
    };
    let get_i64 = |key: &str| fields.get(key).and_then(Value::as_i64);
    let missing = || {
        tracing::warn!(event, "keyed message record missing fields, skipping");
        None
    };

    match event {
        "startGame" => Some(MsgEvent::StartGame),
        "endGame" => Some(MsgEvent::EndGame),
        "scoringPhase" => Some(MsgEvent::ScoringPhase),
        "discardPhase" => Some(MsgEvent::DiscardPhase),
        "cardPlay" => {
            let (Some(player), Some(group), Some(card)) =
                (get_str("p"), get_str("g"), get_str("card"))
            else {
                return missing();
            };
            let targets = fields
                .get("targets")
                .and_then(Value::as_array)
                .map(|list| {
                    list.iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            Some(MsgEvent::CardPlay {
                player,
                group,
                card,
                targets,
            })
        }
        "move" => {
            let group = get_str("g")?;
            let (Some(sx), Some(sy), Some(ex), Some(ey), Some(fx), Some(fy)) = (
                get_i64("sx"),
                get_i64("sy"),
                get_i64("ex"),
                get_i64("ey"),
                get_i64("fx"),
                get_i64("fy"),
            ) else {
                return missing();
            };
            Some(MsgEvent::Move {
                group,
                from: (sx, sy),
                to: (ex, ey),
                facing: (fx, fy),
            })
        }
        "trigger" => {
            // Variant is selected by the trigger-location tag, mirroring
            // the extension stream's location codes.
            let success = fields
                .get("success")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            match get_i64("loc") {
                Some(0) => {
                    let (Some(group), Some(card)) = (get_str("g"), get_str("card")) else {
                        return missing();
                    };
                    Some(MsgEvent::TriggerInHand {
                        group,
                        card,
                        success,
                    })
                }
                Some(1) => {
                    let (Some(group), Some(card)) = (get_str("g"), get_str("card")) else {
                        return missing();
                    };
                    Some(MsgEvent::TriggerTrait {
                        group,
                        card,
                        success,
                    })
                }
                Some(2) => {
                    let (Some(x), Some(y), Some(card)) =
                        (get_i64("x"), get_i64("y"), get_str("card"))
                    else {
                        return missing();
                    };
                    Some(MsgEvent::TriggerTerrain {
                        x,
                        y,
                        card,
                        success,
                    })
                }
                _ => missing(),
            }
        }
        "mustDiscard" => Some(MsgEvent::MustDiscard { group: get_str("g")? }),
        "discard" => {
            let (Some(group), Some(card)) = (get_str("g"), get_str("card")) else {
                return missing();
            };
            Some(MsgEvent::Discard { group, card })
        }
        "mustSelect" => Some(MsgEvent::MustSelect { player: get_str("p")? }),
        "select" => {
            let (Some(group), Some(card)) = (get_str("g"), get_str("card")) else {
                return missing();
            };
            Some(MsgEvent::Select { group, card })
        }
        "attachmentExpired" => {
            // Attached to an actor or to a square; the field present decides.
            let card = get_str("card")?;
            if let Some(group) = get_str("actor") {
                return Some(MsgEvent::AttachmentExpired { group, card });
            }
            let square = fields.get("square").and_then(Value::as_array)?;
            let (Some(x), Some(y)) = (
                square.first().and_then(Value::as_i64),
                square.get(1).and_then(Value::as_i64),
            ) else {
                return missing();
            };
            Some(MsgEvent::TerrainExpired { x, y, card })
        }
        "startTimer" => Some(MsgEvent::StartTimer {
            player: get_str("p")?,
            remaining: get_i64("remaining"),
        }),
        "stopTimer" => Some(MsgEvent::PauseTimer { player: get_str("p")? }),
        other => {
            tracing::debug!(event = other, "ignored keyed message tag");
            None
        }
    }
}

/// Run a free-text line through the battery. Most lines yield one event;
/// the compound block line yields a Block and a Health event. Unmatched
/// lines are ignored.
fn text_events(patterns: &MessagePatterns, line: &str, out: &mut Vec<MsgEvent>) {
    // Compound line first: it both identifies the block card and snapshots
    // the blocker's health.
    if let Some(caps) = captures(&patterns.block, line) {
        let group = caps["g"].to_string();
        out.push(MsgEvent::Block {
            group: group.clone(),
            card: caps["card"].to_string(),
        });
        if let Ok(value) = caps["hp"].parse() {
            out.push(MsgEvent::Health { group, value });
        }
        return;
    }

    if let Some(event) = single_text_event(patterns, line) {
        out.push(event);
    } else {
        tracing::debug!(line, "unmatched message line");
    }
}

fn single_text_event(patterns: &MessagePatterns, line: &str) -> Option<MsgEvent> {
    if let Some(caps) = patterns.round_start.captures(line) {
        return Some(MsgEvent::StartRound {
            round: caps["round"].parse().ok()?,
        });
    }
    if let Some(caps) = patterns.round_end.captures(line) {
        return Some(MsgEvent::EndRound {
            round: caps["round"].parse().ok()?,
        });
    }
    if patterns.scoring_phase.is_match(line) {
        return Some(MsgEvent::ScoringPhase);
    }
    if patterns.discard_phase.is_match(line) {
        return Some(MsgEvent::DiscardPhase);
    }
    if let Some(caps) = captures(&patterns.defeat, line) {
        return Some(MsgEvent::Defeat {
            player: caps["p"].to_string(),
        });
    }
    // Hidden draw before the general draw: "a card" is a valid card name
    // to the general pattern.
    if let Some(caps) = captures(&patterns.hidden_draw, line) {
        return Some(MsgEvent::CardDraw {
            player: caps["p"].to_string(),
            group: caps["g"].to_string(),
            card: None,
        });
    }
    if let Some(caps) = captures(&patterns.draw, line) {
        return Some(MsgEvent::CardDraw {
            player: caps["p"].to_string(),
            group: caps["g"].to_string(),
            card: Some(caps["card"].to_string()),
        });
    }
    if let Some(caps) = captures(&patterns.must_trait, line) {
        return Some(MsgEvent::MustPlayTrait {
            player: caps["p"].to_string(),
        });
    }
    if let Some(caps) = captures(&patterns.must_target, line) {
        return Some(MsgEvent::MustSelectTarget {
            player: caps["p"].to_string(),
        });
    }
    // Terrain attach before trait attach: both start "<card> attached to".
    if let Some(caps) = patterns.attach_terrain.captures(line) {
        return Some(MsgEvent::AttachTerrain {
            x: caps["x"].parse().ok()?,
            y: caps["y"].parse().ok()?,
            card: caps["card"].to_string(),
        });
    }
    if let Some(caps) = captures(&patterns.attach_trait, line) {
        return Some(MsgEvent::AttachTrait {
            group: caps["g"].to_string(),
            card: caps["card"].to_string(),
        });
    }
    if let Some(caps) = captures(&patterns.detach_trait, line) {
        return Some(MsgEvent::DetachTrait {
            group: caps["g"].to_string(),
            card: caps["card"].to_string(),
        });
    }
    if let Some(caps) = captures(&patterns.active_player, line) {
        return Some(MsgEvent::ActivePlayer {
            player: caps["p"].to_string(),
        });
    }
    if let Some(caps) = captures(&patterns.pass, line) {
        return Some(MsgEvent::Pass {
            player: caps["p"].to_string(),
        });
    }
    if let Some(caps) = captures(&patterns.ended_round, line) {
        return Some(MsgEvent::EndedRound {
            player: caps["p"].to_string(),
        });
    }
    if let Some(caps) = captures(&patterns.cancel_pre, line) {
        return Some(MsgEvent::CancelAction {
            player: caps["p"].to_string(),
            card: caps["card"].to_string(),
        });
    }
    if let Some(caps) = patterns.cancel_post.captures(line) {
        return Some(MsgEvent::ActionCancelled {
            card: caps["card"].to_string(),
        });
    }
    if let Some(caps) = captures(&patterns.damage, line) {
        return Some(MsgEvent::Damage {
            group: caps["g"].to_string(),
            amount: caps["amount"].parse().ok()?,
        });
    }
    if let Some(caps) = captures(&patterns.heal, line) {
        return Some(MsgEvent::Heal {
            group: caps["g"].to_string(),
            amount: caps["amount"].parse().ok()?,
        });
    }
    if let Some(caps) = captures(&patterns.death, line) {
        return Some(MsgEvent::Death {
            group: caps["g"].to_string(),
        });
    }
    if let Some(caps) = patterns.auto_select.captures(line) {
        return Some(MsgEvent::AutoSelect {
            card: caps["card"].to_string(),
        });
    }
    None
}

fn captures<'a>(pattern: &Option<Regex>, line: &'a str) -> Option<regex::Captures<'a>> {
    pattern.as_ref()?.captures(line)
}
