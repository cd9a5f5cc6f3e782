use serde::Serialize;

/// A card observed through a peek.
///
/// Provenance (`original_*`) is the group whose equipment put the card in
/// the deck; the current holder can differ after game effects move cards
/// between owners.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Card {
    pub item_name: String,
    pub card_name: String,
    pub original_player_index: usize,
    pub original_group_index: usize,
    pub player_index: usize,
    pub group_index: usize,
}

/// One of a player's three controlled units.
///
/// Groups are discovered positionally: the dump's ActorGroup records carry
/// no group index, so identity fields land in the first not-yet-described
/// slot. Name description (name + archetype) and instance description
/// (figure, audio, position, facing) arrive in separate records.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ActorGroup {
    pub name: Option<String>,
    /// Race and class label, e.g. "Elf Wizard".
    pub archetype: Option<String>,
    pub figure: Option<String>,
    pub audio_key: Option<String>,
    pub x: i64,
    pub y: i64,
    pub fx: i64,
    pub fy: i64,
    hand: Vec<Option<Card>>,
}

impl ActorGroup {
    pub fn is_name_described(&self) -> bool {
        self.name.is_some()
    }

    pub fn is_instance_described(&self) -> bool {
        self.figure.is_some()
    }

    pub fn is_described(&self) -> bool {
        self.is_name_described() && self.is_instance_described()
    }

    /// Remember a card observed at a hand slot, growing the hand as needed.
    pub fn set_hand_card(&mut self, index: usize, card: Card) {
        if self.hand.len() <= index {
            self.hand.resize(index + 1, None);
        }
        self.hand[index] = Some(card);
    }

    /// Look up a remembered card. A miss (stale index or empty slot) is a
    /// soft miss, not an error.
    pub fn hand_card(&self, index: usize) -> Option<&Card> {
        self.hand.get(index).and_then(|slot| slot.as_ref())
    }

    pub fn hand_len(&self) -> usize {
        self.hand.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(name: &str) -> Card {
        Card {
            item_name: "Bejeweled Shortsword".to_string(),
            card_name: name.to_string(),
            original_player_index: 0,
            original_group_index: 0,
            player_index: 0,
            group_index: 0,
        }
    }

    #[test]
    fn hand_grows_on_demand() {
        let mut group = ActorGroup::default();
        group.set_hand_card(2, card("Jab"));
        assert!(group.hand_card(0).is_none());
        assert!(group.hand_card(1).is_none());
        assert_eq!(group.hand_card(2).unwrap().card_name, "Jab");
    }

    #[test]
    fn out_of_range_lookup_is_a_soft_miss() {
        let group = ActorGroup::default();
        assert!(group.hand_card(5).is_none());
    }

    #[test]
    fn described_needs_both_halves() {
        let mut group = ActorGroup::default();
        assert!(!group.is_described());
        group.name = Some("War Party".to_string());
        assert!(group.is_name_described());
        assert!(!group.is_described());
        group.figure = Some("dwarf_warrior_a".to_string());
        assert!(group.is_described());
    }
}
