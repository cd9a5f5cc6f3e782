use serde::Serialize;

/// Full identity of a card as disclosed by a peek: where it currently
/// lives, where it originally came from, and what it is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardSpec {
    pub player_index: usize,
    pub group_index: usize,
    pub card_index: usize,
    pub original_player_index: usize,
    pub original_group_index: usize,
    pub item_name: String,
    pub card_name: String,
}

/// The dice half of a trigger resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TriggerRoll {
    pub die_roll: i64,
    pub required_roll: i64,
    pub hard_to_block: i64,
    pub easy_to_block: i64,
}

/// Event kinds derived from the extension stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ExEventKind {
    StartTimer {
        player_index: usize,
        remaining: i64,
    },
    PauseTimer {
        player_index: usize,
        remaining: i64,
    },
    DeckPeek,
    HandPeek,
    CardDraw(CardSpec),
    CardReveal(CardSpec),
    CardPlay(CardSpec),
    CardDiscard(CardSpec),
    SelectTarget {
        player_indices: Vec<usize>,
        group_indices: Vec<usize>,
    },
    SelectSquare {
        x: i64,
        y: i64,
        fx: i64,
        fy: i64,
    },
    MustDiscard {
        player_index: usize,
        group_index: usize,
    },
    NoDiscards,
    MustPlayTrait {
        player_index: usize,
    },
    NoTraits,
    TriggerInHand {
        roll: TriggerRoll,
        player_index: usize,
        group_index: usize,
        card_index: usize,
    },
    TriggerTrait {
        roll: TriggerRoll,
        player_index: usize,
        group_index: usize,
    },
    TriggerTerrain {
        roll: TriggerRoll,
        x: i64,
        y: i64,
    },
    Rng {
        values: Vec<i64>,
    },
    Pass,
    Resign,
}

/// An extension-derived event together with the turn context it was
/// observed under (the last-seen active player, if any).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExEvent {
    pub turn: Option<usize>,
    pub kind: ExEventKind,
}

impl ExEvent {
    pub fn new(turn: Option<usize>, kind: ExEventKind) -> Self {
        Self { turn, kind }
    }

    /// The card identity carried by card-kind events.
    pub fn card(&self) -> Option<&CardSpec> {
        match &self.kind {
            ExEventKind::CardDraw(spec)
            | ExEventKind::CardReveal(spec)
            | ExEventKind::CardPlay(spec)
            | ExEventKind::CardDiscard(spec) => Some(spec),
            _ => None,
        }
    }
}
