use serde::Serialize;

/// Events derived from the message stream.
///
/// Message records speak in display names, not indices; resolution to
/// index identities happens in the timeline refiner. Variants cover both
/// keyed records (direct tag mapping) and free-text lines (pattern
/// battery).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum MsgEvent {
    // ── keyed records ────────────────────────────────────────────────────
    StartGame,
    EndGame,
    CardPlay {
        player: String,
        group: String,
        card: String,
        targets: Vec<String>,
    },
    Move {
        group: String,
        from: (i64, i64),
        to: (i64, i64),
        facing: (i64, i64),
    },
    TriggerInHand {
        group: String,
        card: String,
        success: bool,
    },
    TriggerTrait {
        group: String,
        card: String,
        success: bool,
    },
    TriggerTerrain {
        x: i64,
        y: i64,
        card: String,
        success: bool,
    },
    MustDiscard {
        group: String,
    },
    Discard {
        group: String,
        card: String,
    },
    MustSelect {
        player: String,
    },
    Select {
        group: String,
        card: String,
    },
    AttachmentExpired {
        group: String,
        card: String,
    },
    TerrainExpired {
        x: i64,
        y: i64,
        card: String,
    },
    StartTimer {
        player: String,
        remaining: Option<i64>,
    },
    PauseTimer {
        player: String,
    },
    // ── keyed or free text ───────────────────────────────────────────────
    ScoringPhase,
    DiscardPhase,
    // ── free text ────────────────────────────────────────────────────────
    StartRound {
        round: i64,
    },
    EndRound {
        round: i64,
    },
    Defeat {
        player: String,
    },
    /// `card` is None for the hidden-draw variant ("drew a card").
    CardDraw {
        player: String,
        group: String,
        card: Option<String>,
    },
    MustPlayTrait {
        player: String,
    },
    MustSelectTarget {
        player: String,
    },
    AttachTrait {
        group: String,
        card: String,
    },
    DetachTrait {
        group: String,
        card: String,
    },
    AttachTerrain {
        x: i64,
        y: i64,
        card: String,
    },
    ActivePlayer {
        player: String,
    },
    Pass {
        player: String,
    },
    EndedRound {
        player: String,
    },
    /// Action cancelled before resolution, by a player.
    CancelAction {
        player: String,
        card: String,
    },
    /// Action cancelled after resolution started.
    ActionCancelled {
        card: String,
    },
    Damage {
        group: String,
        amount: i64,
    },
    Heal {
        group: String,
        amount: i64,
    },
    Death {
        group: String,
    },
    Block {
        group: String,
        card: String,
    },
    Health {
        group: String,
        value: i64,
    },
    AutoSelect {
        card: String,
    },
}

impl MsgEvent {
    /// The player display name this event speaks about, if any.
    pub fn player_name(&self) -> Option<&str> {
        match self {
            MsgEvent::CardPlay { player, .. }
            | MsgEvent::MustSelect { player }
            | MsgEvent::StartTimer { player, .. }
            | MsgEvent::PauseTimer { player }
            | MsgEvent::Defeat { player }
            | MsgEvent::CardDraw { player, .. }
            | MsgEvent::MustPlayTrait { player }
            | MsgEvent::MustSelectTarget { player }
            | MsgEvent::ActivePlayer { player }
            | MsgEvent::Pass { player }
            | MsgEvent::EndedRound { player }
            | MsgEvent::CancelAction { player, .. } => Some(player),
            _ => None,
        }
    }

    /// The group display name this event speaks about, if any.
    pub fn group_name(&self) -> Option<&str> {
        match self {
            MsgEvent::CardPlay { group, .. }
            | MsgEvent::Move { group, .. }
            | MsgEvent::TriggerInHand { group, .. }
            | MsgEvent::TriggerTrait { group, .. }
            | MsgEvent::MustDiscard { group }
            | MsgEvent::Discard { group, .. }
            | MsgEvent::Select { group, .. }
            | MsgEvent::AttachmentExpired { group, .. }
            | MsgEvent::CardDraw { group, .. }
            | MsgEvent::AttachTrait { group, .. }
            | MsgEvent::DetachTrait { group, .. }
            | MsgEvent::Damage { group, .. }
            | MsgEvent::Heal { group, .. }
            | MsgEvent::Death { group }
            | MsgEvent::Block { group, .. }
            | MsgEvent::Health { group, .. } => Some(group),
            _ => None,
        }
    }
}
