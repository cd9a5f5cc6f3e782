//! Text rendering of timeline entries for the CLI.

use skald_types::formatting::{format_actor, format_facing, format_square, format_turn};

use super::{CanonicalEvent, Provenance};
use crate::events::{CardSpec, ExEvent, ExEventKind, MsgEvent};

impl CanonicalEvent {
    /// One-line human description, extension payload preferred.
    pub fn describe(&self) -> String {
        let source = match self.provenance {
            Provenance::Extension => "ext ",
            Provenance::Message => "msg ",
            Provenance::Corroborated => "both",
        };
        let body = match (&self.extension, &self.message) {
            (Some(ex), _) => describe_ex(ex),
            (None, Some(msg)) => describe_msg(msg),
            (None, None) => "empty entry".to_string(),
        };
        format!("[{source}] {body}")
    }
}

fn card_label(spec: &CardSpec) -> String {
    format!(
        "{} #{} ({})",
        spec.card_name,
        spec.card_index,
        format_actor(spec.player_index, spec.group_index)
    )
}

fn describe_ex(event: &ExEvent) -> String {
    let turn = format_turn(event.turn);
    let body = match &event.kind {
        ExEventKind::StartTimer {
            player_index,
            remaining,
        } => format!("timer starts for p{player_index} ({remaining}s left)"),
        ExEventKind::PauseTimer {
            player_index,
            remaining,
        } => format!("timer pauses for p{player_index} ({remaining}s left)"),
        ExEventKind::DeckPeek => "deck peek sent".to_string(),
        ExEventKind::HandPeek => "hand peek sent".to_string(),
        ExEventKind::CardDraw(spec) => format!("draw {}", card_label(spec)),
        ExEventKind::CardReveal(spec) => format!("reveal {}", card_label(spec)),
        ExEventKind::CardPlay(spec) => format!("play {}", card_label(spec)),
        ExEventKind::CardDiscard(spec) => format!("discard {}", card_label(spec)),
        ExEventKind::SelectTarget {
            player_indices,
            group_indices,
        } => {
            let targets: Vec<String> = player_indices
                .iter()
                .zip(group_indices)
                .map(|(&pi, &gi)| format_actor(pi, gi))
                .collect();
            format!("target {}", targets.join(", "))
        }
        ExEventKind::SelectSquare { x, y, fx, fy } => format!(
            "select square {} facing {}",
            format_square(*x, *y),
            format_facing(*fx, *fy)
        ),
        ExEventKind::MustDiscard {
            player_index,
            group_index,
        } => format!("{} must discard", format_actor(*player_index, *group_index)),
        ExEventKind::NoDiscards => "no more discards".to_string(),
        ExEventKind::MustPlayTrait { player_index } => {
            format!("p{player_index} must play a trait")
        }
        ExEventKind::NoTraits => "no more traits".to_string(),
        ExEventKind::TriggerInHand {
            roll,
            player_index,
            group_index,
            card_index,
        } => format!(
            "trigger in hand {} #{card_index}, rolled {} vs {}",
            format_actor(*player_index, *group_index),
            roll.die_roll,
            roll.required_roll
        ),
        ExEventKind::TriggerTrait {
            roll,
            player_index,
            group_index,
        } => format!(
            "trigger trait {}, rolled {} vs {}",
            format_actor(*player_index, *group_index),
            roll.die_roll,
            roll.required_roll
        ),
        ExEventKind::TriggerTerrain { roll, x, y } => format!(
            "trigger terrain {}, rolled {} vs {}",
            format_square(*x, *y),
            roll.die_roll,
            roll.required_roll
        ),
        ExEventKind::Rng { values } => format!("rng {:?}", values),
        ExEventKind::Pass => "pass".to_string(),
        ExEventKind::Resign => "resign".to_string(),
    };
    format!("{turn:>2} {body}")
}

fn describe_msg(event: &MsgEvent) -> String {
    match event {
        MsgEvent::StartGame => "game starts".to_string(),
        MsgEvent::EndGame => "game ends".to_string(),
        MsgEvent::ScoringPhase => "scoring phase".to_string(),
        MsgEvent::DiscardPhase => "discard phase".to_string(),
        MsgEvent::StartRound { round } => format!("round {round} begins"),
        MsgEvent::EndRound { round } => format!("round {round} ends"),
        MsgEvent::CardPlay {
            player,
            group,
            card,
            targets,
        } => {
            if targets.is_empty() {
                format!("{player}'s {group} plays {card}")
            } else {
                format!("{player}'s {group} plays {card} at {}", targets.join(", "))
            }
        }
        MsgEvent::Move {
            group,
            from,
            to,
            facing,
        } => format!(
            "{group} moves {} -> {} facing {}",
            format_square(from.0, from.1),
            format_square(to.0, to.1),
            format_facing(facing.0, facing.1)
        ),
        MsgEvent::TriggerInHand {
            group,
            card,
            success,
        } => format!(
            "{group} triggers {card} in hand ({})",
            trigger_outcome(*success)
        ),
        MsgEvent::TriggerTrait {
            group,
            card,
            success,
        } => format!("{group} triggers trait {card} ({})", trigger_outcome(*success)),
        MsgEvent::TriggerTerrain { x, y, card, success } => format!(
            "terrain {card} triggers at {} ({})",
            format_square(*x, *y),
            trigger_outcome(*success)
        ),
        MsgEvent::MustDiscard { group } => format!("{group} must discard"),
        MsgEvent::Discard { group, card } => format!("{group} discards {card}"),
        MsgEvent::MustSelect { player } => format!("{player} must select"),
        MsgEvent::Select { group, card } => format!("{group} selects {card}"),
        MsgEvent::AttachmentExpired { group, card } => {
            format!("{card} expires on {group}")
        }
        MsgEvent::TerrainExpired { x, y, card } => {
            format!("{card} expires at {}", format_square(*x, *y))
        }
        MsgEvent::StartTimer { player, .. } => format!("timer starts for {player}"),
        MsgEvent::PauseTimer { player } => format!("timer pauses for {player}"),
        MsgEvent::Defeat { player } => format!("{player} was defeated"),
        MsgEvent::CardDraw {
            player,
            group,
            card,
        } => match card {
            Some(card) => format!("{player} drew {card} for {group}"),
            None => format!("{player} drew a card for {group}"),
        },
        MsgEvent::MustPlayTrait { player } => format!("{player} must play a trait"),
        MsgEvent::MustSelectTarget { player } => format!("{player} must select a target"),
        MsgEvent::AttachTrait { group, card } => format!("{card} attached to {group}"),
        MsgEvent::DetachTrait { group, card } => format!("{card} detached from {group}"),
        MsgEvent::AttachTerrain { x, y, card } => {
            format!("{card} attached to {}", format_square(*x, *y))
        }
        MsgEvent::ActivePlayer { player } => format!("it is now {player}'s turn"),
        MsgEvent::Pass { player } => format!("{player} passed"),
        MsgEvent::EndedRound { player } => format!("{player} ended the round"),
        MsgEvent::CancelAction { player, card } => format!("{player} cancelled {card}"),
        MsgEvent::ActionCancelled { card } => format!("{card} was cancelled"),
        MsgEvent::Damage { group, amount } => format!("{group} took {amount} damage"),
        MsgEvent::Heal { group, amount } => format!("{group} healed {amount}"),
        MsgEvent::Death { group } => format!("{group} died"),
        MsgEvent::Block { group, card } => format!("{group} blocked with {card}"),
        MsgEvent::Health { group, value } => format!("{group} health now {value}"),
        MsgEvent::AutoSelect { card } => format!("auto-selecting {card}"),
    }
}

fn trigger_outcome(success: bool) -> &'static str {
    if success { "success" } else { "fail" }
}
