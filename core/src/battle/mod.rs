//! Accumulated static battle state.
//!
//! The model is created empty, filled field-by-field by the builder as dump
//! records arrive, and treated as read-only by everything downstream except
//! the extension extractor's single `user` assignment.

mod builder;
mod group;
mod map;

pub use builder::build_battle;
pub use group::{ActorGroup, Card};
pub use map::{BattleMap, Doodad, Square};

use serde::Serialize;

pub const PLAYER_COUNT: usize = 2;
pub const GROUPS_PER_PLAYER: usize = 3;

/// One of the battle's two players. The index is positional and permanent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Player {
    pub name: Option<String>,
    pub player_id: Option<i64>,
    pub user_id: Option<i64>,
    pub rating: Option<i64>,
    pub is_npc: bool,
    pub stars: i64,
    pub stars_needed: i64,
    pub cards_drawn_this_round: i64,
    pub draw_limit: i64,
    pub groups: [ActorGroup; GROUPS_PER_PLAYER],
}

impl Player {
    pub fn is_described(&self) -> bool {
        self.name.is_some()
    }
}

/// The battle model: scenario identity, both players, the board, and the
/// semi-static session state the record streams need to be interpretable.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Battle {
    pub scenario_name: String,
    pub display_name: String,
    pub room_name: String,
    pub room_id: i64,
    pub time_limit: i64,
    pub enforce_draw_limit: bool,
    pub game_type: String,
    pub audio_tag: String,
    /// Active player index, None between turns.
    pub current_turn: Option<usize>,
    pub current_round: i64,
    pub game_over: bool,
    user: Option<i64>,
    pub map: BattleMap,
    pub players: [Player; PLAYER_COUNT],
}

impl Battle {
    pub fn new() -> Self {
        Self::default()
    }

    /// The user identity resolved from the first qualifying deck peek.
    pub fn user(&self) -> Option<i64> {
        self.user
    }

    /// Set the user identity. First writer wins; later calls are no-ops.
    pub fn set_user(&mut self, id: i64) {
        if self.user.is_none() {
            self.user = Some(id);
        }
    }

    /// Fully initialized: every player and every group is described.
    pub fn is_described(&self) -> bool {
        self.players.iter().all(|p| p.is_described())
            && self.groups().all(|(_, _, g)| g.is_described())
    }

    pub fn group(&self, player_index: usize, group_index: usize) -> Option<&ActorGroup> {
        self.players.get(player_index)?.groups.get(group_index)
    }

    pub fn group_mut(
        &mut self,
        player_index: usize,
        group_index: usize,
    ) -> Option<&mut ActorGroup> {
        self.players
            .get_mut(player_index)?
            .groups
            .get_mut(group_index)
    }

    /// All groups in positional order: player0's three, then player1's.
    pub fn groups(&self) -> impl Iterator<Item = (usize, usize, &ActorGroup)> {
        self.players.iter().enumerate().flat_map(|(pi, player)| {
            player
                .groups
                .iter()
                .enumerate()
                .map(move |(gi, group)| (pi, gi, group))
        })
    }

    pub fn player_index_by_name(&self, name: &str) -> Option<usize> {
        self.players
            .iter()
            .position(|p| p.name.as_deref() == Some(name))
    }

    pub fn group_index_by_name(&self, name: &str) -> Option<(usize, usize)> {
        self.groups()
            .find(|(_, _, g)| g.name.as_deref() == Some(name))
            .map(|(pi, gi, _)| (pi, gi))
    }

    /// Display names of described players, in index order.
    pub fn player_names(&self) -> impl Iterator<Item = &str> {
        self.players.iter().filter_map(|p| p.name.as_deref())
    }

    /// Display names of name-described groups, in positional order.
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups().filter_map(|(_, _, g)| g.name.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_assignment_first_writer_wins() {
        let mut battle = Battle::new();
        assert_eq!(battle.user(), None);
        battle.set_user(41);
        battle.set_user(97);
        assert_eq!(battle.user(), Some(41));
    }

    #[test]
    fn name_tables_map_both_directions() {
        let mut battle = Battle::new();
        battle.players[0].name = Some("Alice".to_string());
        battle.players[1].name = Some("Bob".to_string());
        battle.players[1].groups[2].name = Some("Clan Destiny's Scouts".to_string());

        assert_eq!(battle.player_index_by_name("Bob"), Some(1));
        assert_eq!(battle.player_index_by_name("Eve"), None);
        assert_eq!(
            battle.group_index_by_name("Clan Destiny's Scouts"),
            Some((1, 2))
        );
        assert_eq!(battle.group_names().count(), 1);
    }
}
