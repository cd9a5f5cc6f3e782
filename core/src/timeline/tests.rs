use super::*;
use crate::events::CardSpec;

fn battle() -> Battle {
    let mut battle = Battle::new();
    battle.players[0].name = Some("Alice".to_string());
    battle.players[1].name = Some("Bob".to_string());
    let names = [
        ["Scouts", "Wardens", "Raiders"],
        ["Maulers", "Casters", "Lancers"],
    ];
    for (pi, row) in names.iter().enumerate() {
        for (gi, name) in row.iter().enumerate() {
            battle.players[pi].groups[gi].name = Some(name.to_string());
        }
    }
    battle
}

fn draw_spec() -> CardSpec {
    CardSpec {
        player_index: 0,
        group_index: 0,
        card_index: 1,
        original_player_index: 0,
        original_group_index: 0,
        item_name: "Vampire's Blade".to_string(),
        card_name: "Lifedrinker".to_string(),
    }
}

fn start_timer(player_index: usize) -> ExEvent {
    ExEvent::new(
        Some(player_index),
        ExEventKind::StartTimer {
            player_index,
            remaining: 60,
        },
    )
}

#[test]
fn corroborated_occurrence_appears_once() {
    let battle = battle();
    let ex = vec![
        start_timer(0),
        ExEvent::new(Some(0), ExEventKind::CardDraw(draw_spec())),
    ];
    let msg = vec![
        MsgEvent::ActivePlayer {
            player: "Alice".to_string(),
        },
        MsgEvent::CardDraw {
            player: "Alice".to_string(),
            group: "Scouts".to_string(),
            card: Some("Lifedrinker".to_string()),
        },
    ];

    let timeline = refine_events(&battle, ex, msg);

    assert_eq!(timeline.len(), 2);
    assert!(timeline
        .iter()
        .all(|e| e.provenance == Provenance::Corroborated));
    let draw = &timeline[1];
    assert!(matches!(
        draw.message,
        Some(MsgEvent::CardDraw { .. })
    ));
    assert_eq!(
        draw.resolution.as_ref().unwrap().group_name.as_deref(),
        Some("Scouts")
    );
}

#[test]
fn hidden_draw_corroborates_any_draw_for_the_group() {
    let battle = battle();
    let ex = vec![ExEvent::new(
        Some(0),
        ExEventKind::CardDraw(draw_spec()),
    )];
    let msg = vec![MsgEvent::CardDraw {
        player: "Alice".to_string(),
        group: "Scouts".to_string(),
        card: None,
    }];

    let timeline = refine_events(&battle, ex, msg);

    assert_eq!(timeline.len(), 1);
    assert_eq!(timeline[0].provenance, Provenance::Corroborated);
}

#[test]
fn message_only_event_lands_after_its_anchored_neighbor() {
    let battle = battle();
    let play = CardSpec {
        card_name: "Fireball".to_string(),
        ..draw_spec()
    };
    let ex = vec![
        start_timer(0),
        ExEvent::new(Some(0), ExEventKind::CardPlay(play)),
        ExEvent::new(Some(0), ExEventKind::DeckPeek),
    ];
    let msg = vec![
        MsgEvent::ActivePlayer {
            player: "Alice".to_string(),
        },
        MsgEvent::CardPlay {
            player: "Alice".to_string(),
            group: "Scouts".to_string(),
            card: "Fireball".to_string(),
            targets: vec!["Maulers".to_string()],
        },
        MsgEvent::Damage {
            group: "Maulers".to_string(),
            amount: 4,
        },
    ];

    let timeline = refine_events(&battle, ex, msg);

    assert_eq!(timeline.len(), 4);
    // the damage entry follows the play it belongs to, before the deck peek
    assert!(matches!(
        timeline[2].message,
        Some(MsgEvent::Damage { .. })
    ));
    assert_eq!(timeline[2].provenance, Provenance::Message);
    assert_eq!(timeline[2].resolution.as_ref().unwrap().group, Some((1, 0)));
    assert!(matches!(
        timeline[3].extension.as_ref().unwrap().kind,
        ExEventKind::DeckPeek
    ));
}

#[test]
fn unresolvable_message_name_is_dropped() {
    let battle = battle();
    let msg = vec![MsgEvent::Damage {
        group: "Nobody's Crew".to_string(),
        amount: 9,
    }];

    let timeline = refine_events(&battle, Vec::new(), msg);

    assert!(timeline.is_empty());
}

#[test]
fn trailing_message_segments_are_kept_in_order() {
    let battle = battle();
    let msg = vec![
        MsgEvent::Pass {
            player: "Bob".to_string(),
        },
        MsgEvent::Death {
            group: "Scouts".to_string(),
        },
    ];

    let timeline = refine_events(&battle, Vec::new(), msg);

    assert_eq!(timeline.len(), 2);
    assert!(matches!(timeline[0].message, Some(MsgEvent::Pass { .. })));
    assert!(matches!(timeline[1].message, Some(MsgEvent::Death { .. })));
    assert!(timeline
        .iter()
        .all(|e| e.provenance == Provenance::Message));
}

#[test]
fn extension_events_without_counterpart_keep_backbone_order() {
    let battle = battle();
    let ex = vec![
        start_timer(1),
        ExEvent::new(Some(1), ExEventKind::Rng { values: vec![3, 7] }),
        ExEvent::new(Some(1), ExEventKind::Pass),
    ];

    let timeline = refine_events(&battle, ex, Vec::new());

    assert_eq!(timeline.len(), 3);
    assert!(timeline
        .iter()
        .all(|e| e.provenance == Provenance::Extension));
}
