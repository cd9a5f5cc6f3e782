//! Tests for extension-record extraction.

use serde_json::{Value, json};

use super::extension_events;
use crate::battle::Battle;
use crate::events::ExEventKind;
use crate::session_log::ExtensionRecord;

fn record(value: Value) -> ExtensionRecord {
    match value {
        Value::Object(fields) => ExtensionRecord::new(fields),
        _ => panic!("test record must be an object"),
    }
}

fn peek(owner: usize, group: usize, card: usize, name: &str) -> Value {
    json!({
        "cownerp": owner,
        "cownerg": group,
        "card": card,
        "origin": "Bejeweled Shortsword",
        "type": name,
        "owner": owner,
        "group": group,
    })
}

#[test]
fn timer_rng_peek_pass_sequence_carries_turn() {
    let mut battle = Battle::new();
    let records = vec![
        record(json!({
            "_NAME": "battleTimer", "playerIndex": 0, "start": true, "timeRemaining": 60,
        })),
        record(json!({"_NAME": "battle", "type": "genRand", "RAND": [3, 7]})),
        record(json!({"_NAME": "battle", "type": "deckPeeksSent"})),
        record(json!({"_NAME": "battle", "type": "pass"})),
    ];

    let events = extension_events(&mut battle, &records);

    assert_eq!(events.len(), 4);
    assert!(matches!(
        events[0].kind,
        ExEventKind::StartTimer {
            player_index: 0,
            remaining: 60
        }
    ));
    assert!(matches!(&events[1].kind, ExEventKind::Rng { values } if *values == vec![3, 7]));
    assert!(matches!(events[2].kind, ExEventKind::DeckPeek));
    assert!(matches!(events[3].kind, ExEventKind::Pass));
    assert!(events.iter().all(|e| e.turn == Some(0)));
}

#[test]
fn user_assignment_is_idempotent_across_deck_peeks() {
    let mut battle = Battle::new();
    let records = vec![
        record(json!({
            "_NAME": "battle", "type": "deckPeeks",
            "SENDID": [41], "DP": {"peeks": [peek(0, 0, 0, "Jab")]},
        })),
        record(json!({
            "_NAME": "battle", "type": "deckPeeks",
            "SENDID": [97], "DP": {"peeks": [peek(1, 0, 0, "Stab")]},
        })),
    ];

    extension_events(&mut battle, &records);

    assert_eq!(battle.user(), Some(41));
}

#[test]
fn deck_peeks_remember_hand_cards() {
    let mut battle = Battle::new();
    let records = vec![record(json!({
        "_NAME": "battle", "type": "deckPeeks",
        "SENDID": [41],
        "DP": {"peeks": [peek(0, 1, 2, "Lifedrinker")]},
    }))];

    let events = extension_events(&mut battle, &records);

    assert!(matches!(&events[0].kind, ExEventKind::CardDraw(spec)
        if spec.card_name == "Lifedrinker" && spec.card_index == 2));
    let remembered = battle.group(0, 1).unwrap().hand_card(2).unwrap();
    assert_eq!(remembered.card_name, "Lifedrinker");
}

#[test]
fn end_of_round_discard_resolves_through_remembered_hand() {
    let mut battle = Battle::new();
    let records = vec![
        record(json!({
            "_NAME": "battle", "type": "deckPeeks",
            "SENDID": [41],
            "DP": {"peeks": [peek(1, 2, 0, "Walk")]},
        })),
        record(json!({"_NAME": "battle", "type": "mustDiscard", "PUI": 1, "ACTG": 2})),
        record(json!({"_NAME": "battle", "type": "selectCard", "sel": 0})),
    ];

    let events = extension_events(&mut battle, &records);

    let discard = events
        .iter()
        .find_map(|e| match &e.kind {
            ExEventKind::CardDiscard(spec) => Some(spec),
            _ => None,
        })
        .expect("discard resolved from hand");
    assert_eq!(discard.card_name, "Walk");
    assert_eq!(discard.player_index, 1);
    assert_eq!(discard.group_index, 2);
}

#[test]
fn out_of_range_discard_is_dropped_quietly() {
    let mut battle = Battle::new();
    let records = vec![
        record(json!({"_NAME": "battle", "type": "mustDiscard", "PUI": 1, "ACTG": 2})),
        // nothing was ever peeked for p1/g2, so index 5 cannot resolve
        record(json!({"_NAME": "battle", "type": "selectCard", "sel": 5})),
        record(json!({"_NAME": "battle", "type": "pass"})),
    ];

    let events = extension_events(&mut battle, &records);

    assert!(events
        .iter()
        .all(|e| !matches!(e.kind, ExEventKind::CardDiscard(_))));
    // extraction continued past the soft miss
    assert!(matches!(events.last().unwrap().kind, ExEventKind::Pass));
}

#[test]
fn action_emits_plays_then_target() {
    let mut battle = Battle::new();
    let records = vec![record(json!({
        "_NAME": "battle", "type": "action",
        "HP": {"peeks": [peek(0, 0, 3, "Fireball")]},
        "TARP": [1], "TARG": [2],
    }))];

    let events = extension_events(&mut battle, &records);

    assert_eq!(events.len(), 2);
    assert!(matches!(&events[0].kind, ExEventKind::CardPlay(spec)
        if spec.card_name == "Fireball"));
    assert!(matches!(&events[1].kind, ExEventKind::SelectTarget { player_indices, group_indices }
        if *player_indices == vec![1] && *group_indices == vec![2]));
}

#[test]
fn trigger_location_selects_variant() {
    let mut battle = Battle::new();
    let roll = json!({"TROLL": 4, "TTHRESH": 3, "TPEN": 1, "TBON": 0});
    let mut hand = roll.clone();
    hand["TCLOC"] = json!(0);
    hand["PUI"] = json!(0);
    hand["ACTG"] = json!(1);
    hand["ACTC"] = json!(2);
    let mut terrain = roll.clone();
    terrain["TCLOC"] = json!(2);
    terrain["TARX"] = json!(4);
    terrain["TARY"] = json!(-1);
    let records = vec![
        record(merge(json!({"_NAME": "battle", "type": "triggerSucceed"}), hand)),
        record(merge(json!({"_NAME": "battle", "type": "triggerFail"}), terrain)),
        // no TCLOC: bookkeeping record, ignored
        record(merge(json!({"_NAME": "battle", "type": "triggerFail"}), roll)),
    ];

    let events = extension_events(&mut battle, &records);

    assert_eq!(events.len(), 2);
    assert!(matches!(
        events[0].kind,
        ExEventKind::TriggerInHand {
            player_index: 0,
            group_index: 1,
            card_index: 2,
            ..
        }
    ));
    assert!(matches!(
        events[1].kind,
        ExEventKind::TriggerTerrain { x: 4, y: -1, .. }
    ));
}

#[test]
fn unknown_event_types_are_ignored() {
    let mut battle = Battle::new();
    let records = vec![
        record(json!({"_NAME": "battle", "type": "someFutureThing"})),
        record(json!({"_NAME": "battle", "type": "done"})),
        record(json!({"_NAME": "chat", "type": "pass"})),
        record(json!({"_NAME": "battle", "type": "forceLoss"})),
    ];

    let events = extension_events(&mut battle, &records);

    assert_eq!(events.len(), 1);
    assert!(matches!(events[0].kind, ExEventKind::Resign));
}

fn merge(mut base: Value, extra: Value) -> Value {
    if let (Value::Object(base_map), Value::Object(extra_map)) = (&mut base, extra) {
        base_map.extend(extra_map);
    }
    base
}
