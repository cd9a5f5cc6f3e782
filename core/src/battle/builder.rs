//! Domain model builder.
//!
//! Folds the joinbattle object dump into a [`Battle`]. Each dump record is
//! dispatched on the suffix of its `_class_` tag. Battle and Player records
//! address their targets directly; ActorGroup and ActorInstance records
//! carry no group index and are assigned positionally to the next
//! not-yet-described slot (player0's three groups, then player1's).

use serde_json::Value;

use crate::battle::{Battle, Doodad, Square};
use crate::session_log::{field_bool, field_f64, field_i64, field_str, field_usize};

const GROUP_SLOTS: usize = super::PLAYER_COUNT * super::GROUPS_PER_PLAYER;

/// Fill positions into the flattened 6-slot group sequence. Name
/// description and instance description arrive in separate record kinds
/// and advance independently.
#[derive(Debug, Default)]
struct FillCursors {
    name: usize,
    instance: usize,
}

impl FillCursors {
    /// Map a flat slot index to (player_index, group_index).
    fn slot(index: usize) -> (usize, usize) {
        (
            index / super::GROUPS_PER_PLAYER,
            index % super::GROUPS_PER_PLAYER,
        )
    }
}

/// Build a battle model from an object dump.
///
/// A partial dump (fewer than two players or six group/instance pairs)
/// yields a partially described battle; that is a reportable state, not an
/// error.
pub fn build_battle(objects: &[Value]) -> Battle {
    let mut battle = Battle::new();
    let mut cursors = FillCursors::default();

    for obj in objects {
        let Some(class) = field_str(obj, "_class_") else {
            tracing::warn!("dump object carries no _class_ tag, skipping");
            continue;
        };
        let suffix = class.rsplit('.').next().unwrap_or(class);

        match suffix {
            "Battle" => apply_battle(&mut battle, obj),
            "Player" => apply_player(&mut battle, obj),
            "Square" => apply_square(&mut battle, obj),
            "Doodad" => apply_doodad(&mut battle, obj),
            "ActorGroup" => apply_group(&mut battle, &mut cursors, obj),
            "ActorInstance" => apply_instance(&mut battle, &mut cursors, obj),
            other => tracing::debug!(class = other, "ignored dump object class"),
        }
    }

    battle
}

fn apply_battle(battle: &mut Battle, obj: &Value) {
    if let Some(v) = field_str(obj, "scenarioName") {
        battle.scenario_name = v.to_string();
    }
    if let Some(v) = field_str(obj, "scenarioDisplayName") {
        battle.display_name = v.to_string();
    }
    if let Some(v) = field_str(obj, "roomName") {
        battle.room_name = v.to_string();
    }
    if let Some(v) = field_i64(obj, "roomID") {
        battle.room_id = v;
    }
    if let Some(v) = field_i64(obj, "timeLimit") {
        battle.time_limit = v;
    }
    if let Some(v) = field_bool(obj, "enforceDrawLimit") {
        battle.enforce_draw_limit = v;
    }
    if let Some(v) = field_str(obj, "gameType") {
        battle.game_type = v.to_string();
    }
    if let Some(v) = field_str(obj, "audioTag") {
        battle.audio_tag = v.to_string();
    }
    // currentTurn is -1 between turns
    battle.current_turn = field_i64(obj, "currentTurn")
        .filter(|&n| n >= 0)
        .map(|n| n as usize);
    if let Some(v) = field_i64(obj, "currentRound") {
        battle.current_round = v;
    }
    if let Some(v) = field_bool(obj, "gameOver") {
        battle.game_over = v;
    }
}

fn apply_player(battle: &mut Battle, obj: &Value) {
    let Some(index) = field_usize(obj, "playerIndex") else {
        tracing::warn!("player object carries no playerIndex, skipping");
        return;
    };
    let Some(player) = battle.players.get_mut(index) else {
        tracing::warn!(index, "player index out of range, skipping");
        return;
    };

    if let Some(v) = field_str(obj, "playerName") {
        player.name = Some(v.to_string());
    }
    player.player_id = field_i64(obj, "playerID").or(player.player_id);
    player.user_id = field_i64(obj, "userID").or(player.user_id);
    player.rating = field_i64(obj, "rating").or(player.rating);
    if let Some(v) = field_bool(obj, "isNPC") {
        player.is_npc = v;
    }
    if let Some(v) = field_i64(obj, "stars") {
        player.stars = v;
    }
    if let Some(v) = field_i64(obj, "starsNeeded") {
        player.stars_needed = v;
    }
    if let Some(v) = field_i64(obj, "cardsDrawnThisRound") {
        player.cards_drawn_this_round = v;
    }
    if let Some(v) = field_i64(obj, "drawLimit") {
        player.draw_limit = v;
    }
}

fn apply_square(battle: &mut Battle, obj: &Value) {
    let (Some(x), Some(y)) = (field_i64(obj, "location.x"), field_i64(obj, "location.y")) else {
        tracing::warn!("square object missing location, skipping");
        return;
    };
    battle.map.add_square(Square {
        x,
        y,
        flip_x: field_bool(obj, "imageFlipX").unwrap_or(false),
        flip_y: field_bool(obj, "imageFlipY").unwrap_or(false),
        image_name: field_str(obj, "imageName").unwrap_or_default().to_string(),
        terrain: field_str(obj, "terrain").unwrap_or_default().to_string(),
    });
}

fn apply_doodad(battle: &mut Battle, obj: &Value) {
    let (Some(x), Some(y)) = (
        field_f64(obj, "displayPosition.x"),
        field_f64(obj, "displayPosition.y"),
    ) else {
        tracing::warn!("doodad object missing position, skipping");
        return;
    };
    battle.map.add_doodad(Doodad {
        x,
        y,
        flip_x: field_bool(obj, "imageFlipX").unwrap_or(false),
        flip_y: field_bool(obj, "imageFlipY").unwrap_or(false),
        image_name: field_str(obj, "imageName").unwrap_or_default().to_string(),
        marker: field_str(obj, "marker").unwrap_or_default().to_string(),
    });
}

fn apply_group(battle: &mut Battle, cursors: &mut FillCursors, obj: &Value) {
    if cursors.name >= GROUP_SLOTS {
        tracing::warn!("more than {GROUP_SLOTS} group records in dump, skipping");
        return;
    }
    let (Some(name), Some(race), Some(class)) = (
        field_str(obj, "name"),
        field_str(obj, "race"),
        field_str(obj, "characterClass"),
    ) else {
        tracing::warn!("group object missing identity fields, skipping");
        return;
    };

    let (pi, gi) = FillCursors::slot(cursors.name);
    cursors.name += 1;
    // group() can't miss here: slot() stays within the fixed 2x3 layout
    if let Some(group) = battle.group_mut(pi, gi) {
        group.name = Some(name.to_string());
        group.archetype = Some(format!("{} {}", race, class));
    }
}

fn apply_instance(battle: &mut Battle, cursors: &mut FillCursors, obj: &Value) {
    if cursors.instance >= GROUP_SLOTS {
        tracing::warn!("more than {GROUP_SLOTS} instance records in dump, skipping");
        return;
    }
    let Some(depiction) = field_str(obj, "depiction") else {
        tracing::warn!("instance object missing depiction, skipping");
        return;
    };

    let (pi, gi) = FillCursors::slot(cursors.instance);
    cursors.instance += 1;
    if let Some(group) = battle.group_mut(pi, gi) {
        group.figure = Some(depiction.to_string());
        group.audio_key = field_str(obj, "audioKey").map(str::to_string);
        group.x = field_i64(obj, "location.x").unwrap_or(0);
        group.y = field_i64(obj, "location.y").unwrap_or(0);
        group.fx = field_i64(obj, "facing.x").unwrap_or(0);
        group.fy = field_i64(obj, "facing.y").unwrap_or(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn group_obj(name: &str) -> Value {
        json!({
            "_class_": "com.cardhunter.battle.ActorGroup",
            "name": name,
            "race": "Dwarf",
            "characterClass": "Warrior",
        })
    }

    fn instance_obj(depiction: &str) -> Value {
        json!({
            "_class_": "com.cardhunter.battle.ActorInstance",
            "depiction": depiction,
            "audioKey": "dwarf",
            "location.x": 1,
            "location.y": 2,
            "facing.x": 0,
            "facing.y": 1,
        })
    }

    #[test]
    fn canonical_dump_fills_groups_positionally() {
        let mut objects = vec![
            json!({
                "_class_": "com.cardhunter.battle.Battle",
                "scenarioName": "attack of the war monkeys",
                "scenarioDisplayName": "Attack of the War Monkeys",
                "gameType": "multiplayer",
                "audioTag": "forest",
                "roomName": "battle-77",
                "roomID": 77,
                "timeLimit": 60,
                "enforceDrawLimit": true,
                "currentTurn": -1,
                "currentRound": 0,
                "gameOver": false,
            }),
            json!({
                "_class_": "com.cardhunter.battle.Player",
                "playerIndex": 0,
                "playerName": "Alice",
                "playerID": 1,
                "userID": 41,
                "rating": 1200,
                "isNPC": false,
                "stars": 0,
                "starsNeeded": 6,
                "cardsDrawnThisRound": 0,
                "drawLimit": 2,
            }),
            json!({
                "_class_": "com.cardhunter.battle.Player",
                "playerIndex": 1,
                "playerName": "Bob",
                "playerID": 2,
                "userID": 97,
                "rating": 1300,
                "isNPC": false,
            }),
        ];
        for name in ["G1", "G2", "G3", "G4", "G5", "G6"] {
            objects.push(group_obj(name));
            objects.push(instance_obj(&format!("fig-{name}")));
        }
        // interleave an unrelated class to prove it has no effect
        objects.insert(4, json!({"_class_": "com.cardhunter.battle.Wall"}));

        let battle = build_battle(&objects);

        assert!(battle.is_described());
        assert_eq!(battle.display_name, "Attack of the War Monkeys");
        assert_eq!(battle.current_turn, None);
        let names: Vec<_> = battle.group_names().collect();
        assert_eq!(names, ["G1", "G2", "G3", "G4", "G5", "G6"]);
        assert_eq!(battle.players[0].groups[0].name.as_deref(), Some("G1"));
        assert_eq!(battle.players[1].groups[0].name.as_deref(), Some("G4"));
        assert_eq!(battle.players[1].groups[2].figure.as_deref(), Some("fig-G6"));
        assert_eq!(
            battle.players[0].groups[1].archetype.as_deref(),
            Some("Dwarf Warrior")
        );
    }

    #[test]
    fn partial_dump_is_reported_not_fatal() {
        let objects = vec![
            json!({
                "_class_": "com.cardhunter.battle.Player",
                "playerIndex": 0,
                "playerName": "Alice",
            }),
            group_obj("Lonely Group"),
        ];
        let battle = build_battle(&objects);
        assert!(!battle.is_described());
        assert_eq!(battle.players[0].groups[0].name.as_deref(), Some("Lonely Group"));
        assert!(!battle.players[0].groups[0].is_described());
    }

    #[test]
    fn overflow_group_records_are_skipped() {
        let mut objects: Vec<Value> = (0..7).map(|i| group_obj(&format!("G{i}"))).collect();
        objects.push(instance_obj("only"));
        let battle = build_battle(&objects);
        // seventh group record has nowhere to go; first six land in order
        assert_eq!(battle.players[1].groups[2].name.as_deref(), Some("G5"));
        assert_eq!(battle.players[0].groups[0].figure.as_deref(), Some("only"));
    }
}
