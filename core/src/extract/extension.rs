//! Extension-record event extraction.
//!
//! One forward pass over the extension stream. Two pieces of state are
//! threaded left-to-right: the last-seen active player (`player_turn`,
//! attached to every emitted event) and the last (player, group) owing a
//! discard (`must_discard`, needed because the end-of-round `selectCard`
//! record names the discarded card only by hand index).

use serde_json::Value;

use crate::battle::{Battle, Card};
use crate::events::{CardSpec, ExEvent, ExEventKind, TriggerRoll};
use crate::session_log::{ExtensionRecord, field_str, field_usize};

/// Extract typed events from the extension stream, in stream order.
///
/// The only battle mutations performed here are the one-shot `user`
/// assignment and remembering peeked cards in hand slots.
pub fn extension_events(battle: &mut Battle, records: &[ExtensionRecord]) -> Vec<ExEvent> {
    let mut extractor = Extractor::default();
    for record in records {
        extractor.process(battle, record);
    }
    extractor.events
}

#[derive(Default)]
struct Extractor {
    player_turn: Option<usize>,
    must_discard: Option<(usize, usize)>,
    events: Vec<ExEvent>,
}

impl Extractor {
    fn emit(&mut self, kind: ExEventKind) {
        self.events.push(ExEvent::new(self.player_turn, kind));
    }

    fn process(&mut self, battle: &mut Battle, record: &ExtensionRecord) {
        let name = record.name().unwrap_or_default();
        let event_type = record.event_type().unwrap_or_default();

        if name == "battleTimer" {
            self.handle_timer(record);
            return;
        }
        // Everything else of interest is a battle record; the terminal
        // "done" marker and foreign families (joinbattle itself) are noise.
        if name != "battle" || event_type == "done" {
            tracing::debug!(name, event_type, "skipped extension record");
            return;
        }

        match event_type {
            "deckPeeksSent" => self.emit(ExEventKind::DeckPeek),
            "handPeeksSent" => self.emit(ExEventKind::HandPeek),
            "deckPeeks" => self.handle_deck_peeks(battle, record),
            "handPeeks" => self.handle_hand_peeks(battle, record),
            "action" => self.handle_action(record),
            "selectCard" => self.handle_select_card(battle, record),
            "mustDiscard" => self.handle_must_discard(record),
            "noMoreDiscards" => self.emit(ExEventKind::NoDiscards),
            "hasTrait" => self.handle_has_trait(record),
            "noMoreTraits" => self.emit(ExEventKind::NoTraits),
            "triggerFail" | "triggerSucceed" => self.handle_trigger(record),
            "target" => self.handle_target(record),
            "selectSquare" => self.handle_select_square(record),
            "genRand" => self.handle_gen_rand(record),
            "pass" => self.emit(ExEventKind::Pass),
            "forceLoss" => self.emit(ExEventKind::Resign),
            other => tracing::debug!(event_type = other, "ignored extension event type"),
        }
    }

    fn handle_timer(&mut self, record: &ExtensionRecord) {
        let (Some(player_index), Some(start), Some(remaining)) = (
            record.get_usize("playerIndex"),
            record.get_bool("start"),
            record.get_i64("timeRemaining"),
        ) else {
            tracing::warn!("battleTimer record missing fields, skipping");
            return;
        };

        if start {
            self.player_turn = Some(player_index);
            self.emit(ExEventKind::StartTimer {
                player_index,
                remaining,
            });
        } else {
            self.player_turn = Some(player_index);
            self.emit(ExEventKind::PauseTimer {
                player_index,
                remaining,
            });
            self.player_turn = None;
        }
    }

    fn handle_deck_peeks(&mut self, battle: &mut Battle, record: &ExtensionRecord) {
        // The first deck peek identifies which player this client is:
        // the sender id list names the user. First writer wins.
        if battle.user().is_none()
            && let Some(ids) = record.get_i64_list("SENDID")
            && let Some(&first) = ids.first()
        {
            battle.set_user(first);
        }

        for spec in peeked_cards(record, "DP") {
            remember_card(battle, &spec);
            self.emit(ExEventKind::CardDraw(spec));
        }
    }

    fn handle_hand_peeks(&mut self, battle: &mut Battle, record: &ExtensionRecord) {
        for spec in peeked_cards(record, "HP") {
            remember_card(battle, &spec);
            self.emit(ExEventKind::CardReveal(spec));
        }
    }

    fn handle_action(&mut self, record: &ExtensionRecord) {
        for spec in peeked_cards(record, "HP") {
            self.emit(ExEventKind::CardPlay(spec));
        }
        if record.get("TARP").is_some() {
            self.handle_target(record);
        }
    }

    fn handle_select_card(&mut self, battle: &Battle, record: &ExtensionRecord) {
        // Mid-round discards disclose the card; end-of-round discards only
        // carry a hand index and lean on the remembered must-discard target.
        if record.get("HP").is_some() {
            for spec in peeked_cards(record, "HP") {
                self.emit(ExEventKind::CardDiscard(spec));
            }
            return;
        }

        let Some((player_index, group_index)) = self.must_discard else {
            tracing::debug!("selectCard with no pending must-discard, dropping");
            return;
        };
        let Some(card_index) = record.get_usize("sel") else {
            tracing::warn!("selectCard record missing sel index, skipping");
            return;
        };

        // Soft miss: stale indices or an empty slot drop the event, not the run.
        let Some(card) = battle
            .group(player_index, group_index)
            .and_then(|g| g.hand_card(card_index))
        else {
            tracing::debug!(
                player_index,
                group_index,
                card_index,
                "discarded card not in remembered hand, dropping"
            );
            return;
        };

        self.emit(ExEventKind::CardDiscard(CardSpec {
            player_index,
            group_index,
            card_index,
            original_player_index: card.original_player_index,
            original_group_index: card.original_group_index,
            item_name: card.item_name.clone(),
            card_name: card.card_name.clone(),
        }));
    }

    fn handle_must_discard(&mut self, record: &ExtensionRecord) {
        let (Some(player_index), Some(group_index)) =
            (record.get_usize("PUI"), record.get_usize("ACTG"))
        else {
            tracing::warn!("mustDiscard record missing actor fields, skipping");
            return;
        };
        self.must_discard = Some((player_index, group_index));
        self.emit(ExEventKind::MustDiscard {
            player_index,
            group_index,
        });
    }

    fn handle_has_trait(&mut self, record: &ExtensionRecord) {
        let Some(player_index) = record.get_usize("PUI") else {
            tracing::warn!("hasTrait record missing PUI, skipping");
            return;
        };
        self.emit(ExEventKind::MustPlayTrait { player_index });
    }

    fn handle_trigger(&mut self, record: &ExtensionRecord) {
        // Trigger records without a location are bookkeeping noise.
        let Some(location) = record.get_i64("TCLOC") else {
            return;
        };
        let (Some(die_roll), Some(required_roll), Some(hard_to_block), Some(easy_to_block)) = (
            record.get_i64("TROLL"),
            record.get_i64("TTHRESH"),
            record.get_i64("TPEN"),
            record.get_i64("TBON"),
        ) else {
            tracing::warn!("trigger record missing roll fields, skipping");
            return;
        };
        let roll = TriggerRoll {
            die_roll,
            required_roll,
            hard_to_block,
            easy_to_block,
        };

        match location {
            0 => {
                let (Some(player_index), Some(group_index), Some(card_index)) = (
                    record.get_usize("PUI"),
                    record.get_usize("ACTG"),
                    record.get_usize("ACTC"),
                ) else {
                    tracing::warn!("hand trigger missing actor fields, skipping");
                    return;
                };
                self.emit(ExEventKind::TriggerInHand {
                    roll,
                    player_index,
                    group_index,
                    card_index,
                });
            }
            1 => {
                let (Some(player_index), Some(group_index)) =
                    (record.get_usize("PUI"), record.get_usize("ACTG"))
                else {
                    tracing::warn!("attachment trigger missing actor fields, skipping");
                    return;
                };
                self.emit(ExEventKind::TriggerTrait {
                    roll,
                    player_index,
                    group_index,
                });
            }
            2 => {
                let (Some(x), Some(y)) = (record.get_i64("TARX"), record.get_i64("TARY")) else {
                    tracing::warn!("terrain trigger missing square fields, skipping");
                    return;
                };
                self.emit(ExEventKind::TriggerTerrain { roll, x, y });
            }
            other => tracing::warn!(location = other, "unknown trigger location, skipping"),
        }
    }

    fn handle_target(&mut self, record: &ExtensionRecord) {
        let (Some(player_indices), Some(group_indices)) = (
            record.get_usize_list("TARP"),
            record.get_usize_list("TARG"),
        ) else {
            tracing::warn!("target record missing index lists, skipping");
            return;
        };
        self.emit(ExEventKind::SelectTarget {
            player_indices,
            group_indices,
        });
    }

    fn handle_select_square(&mut self, record: &ExtensionRecord) {
        let (Some(x), Some(y), Some(fx), Some(fy)) = (
            record.get_i64("TARX"),
            record.get_i64("TARY"),
            record.get_i64("TARFX"),
            record.get_i64("TARFY"),
        ) else {
            tracing::warn!("selectSquare record missing fields, skipping");
            return;
        };
        self.emit(ExEventKind::SelectSquare { x, y, fx, fy });
    }

    fn handle_gen_rand(&mut self, record: &ExtensionRecord) {
        let Some(values) = record.get_i64_list("RAND") else {
            tracing::warn!("genRand record missing RAND, skipping");
            return;
        };
        self.emit(ExEventKind::Rng { values });
    }
}

/// Decode the per-card entries of a peek payload. Malformed entries are
/// skipped individually.
fn peeked_cards(record: &ExtensionRecord, family: &str) -> Vec<CardSpec> {
    let Some(peeks) = record.peeks(family) else {
        tracing::warn!(family, "peek record missing peeks list, skipping");
        return Vec::new();
    };
    peeks
        .iter()
        .filter_map(|info| {
            let spec = decode_peek(info);
            if spec.is_none() {
                tracing::warn!(family, "malformed peek entry, skipping");
            }
            spec
        })
        .collect()
}

fn decode_peek(info: &Value) -> Option<CardSpec> {
    Some(CardSpec {
        original_player_index: field_usize(info, "cownerp")?,
        original_group_index: field_usize(info, "cownerg")?,
        card_index: field_usize(info, "card")?,
        item_name: field_str(info, "origin")?.to_string(),
        card_name: field_str(info, "type")?.to_string(),
        player_index: field_usize(info, "owner")?,
        group_index: field_usize(info, "group")?,
    })
}

/// Write an observed card into its current holder's hand slot so later
/// index-only references can be resolved.
fn remember_card(battle: &mut Battle, spec: &CardSpec) {
    let Some(group) = battle.group_mut(spec.player_index, spec.group_index) else {
        tracing::warn!(
            player_index = spec.player_index,
            group_index = spec.group_index,
            "peeked card addresses unknown group"
        );
        return;
    };
    group.set_hand_card(
        spec.card_index,
        Card {
            item_name: spec.item_name.clone(),
            card_name: spec.card_name.clone(),
            original_player_index: spec.original_player_index,
            original_group_index: spec.original_group_index,
            player_index: spec.player_index,
            group_index: spec.group_index,
        },
    );
}
