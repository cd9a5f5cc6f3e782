//! Free-text message patterns.
//!
//! Most battle-log lines embed player and group display names, so the
//! battery can only be assembled after the domain model builder has run.
//! Built exactly once per battle; every display name is regex-escaped
//! before substitution (names like `Clan Destiny's Scouts` or
//! `Kobold (Elite)` are syntactically significant otherwise).
//!
//! Round 3 begins
//! Alice drew Lifedrinker for Clan Destiny's Scouts
//! Sparkforce Wardens blocked with Parry, health now 11

use regex::Regex;

use crate::battle::Battle;
use crate::error::ReconstructError;

/// Name-dependent patterns are present only when the battle describes at
/// least one player (respectively group); a partially described battle
/// disables them rather than failing the run. A described-but-empty name,
/// on the other hand, is a hard precondition violation.
pub struct MessagePatterns {
    pub round_start: Regex,
    pub round_end: Regex,
    pub scoring_phase: Regex,
    pub discard_phase: Regex,
    pub cancel_post: Regex,
    pub auto_select: Regex,
    pub defeat: Option<Regex>,
    pub hidden_draw: Option<Regex>,
    pub draw: Option<Regex>,
    pub must_trait: Option<Regex>,
    pub must_target: Option<Regex>,
    pub attach_terrain: Regex,
    pub attach_trait: Option<Regex>,
    pub detach_trait: Option<Regex>,
    pub active_player: Option<Regex>,
    pub pass: Option<Regex>,
    pub ended_round: Option<Regex>,
    pub cancel_pre: Option<Regex>,
    pub damage: Option<Regex>,
    pub heal: Option<Regex>,
    pub death: Option<Regex>,
    pub block: Option<Regex>,
}

impl MessagePatterns {
    pub fn build(battle: &Battle) -> Result<Self, ReconstructError> {
        let players = alternation(battle.player_names())?;
        let groups = alternation(battle.group_names())?;

        Ok(Self {
            round_start: compile(r"^Round (?P<round>\d+) begins$")?,
            round_end: compile(r"^Round (?P<round>\d+) ends$")?,
            scoring_phase: compile(r"^Scoring phase begins$")?,
            discard_phase: compile(r"^Discard phase begins$")?,
            cancel_post: compile(r"^(?P<card>.+) was cancelled$")?,
            auto_select: compile(r"^Automatically selecting (?P<card>.+)$")?,
            attach_terrain: compile(
                r"^(?P<card>.+) attached to square \((?P<x>-?\d+), (?P<y>-?\d+)\)$",
            )?,
            defeat: named(&players, |p| format!("^(?P<p>{p}) was defeated$"))?,
            hidden_draw: named2(&players, &groups, |p, g| {
                format!("^(?P<p>{p}) drew a card for (?P<g>{g})$")
            })?,
            draw: named2(&players, &groups, |p, g| {
                format!("^(?P<p>{p}) drew (?P<card>.+) for (?P<g>{g})$")
            })?,
            must_trait: named(&players, |p| format!("^(?P<p>{p}) must play a Trait$"))?,
            must_target: named(&players, |p| format!("^(?P<p>{p}) must select a target$"))?,
            attach_trait: named(&groups, |g| {
                format!("^(?P<card>.+) attached to (?P<g>{g})$")
            })?,
            detach_trait: named(&groups, |g| {
                format!("^(?P<card>.+) detached from (?P<g>{g})$")
            })?,
            active_player: named(&players, |p| format!("^It is now (?P<p>{p})'s turn$"))?,
            pass: named(&players, |p| format!("^(?P<p>{p}) passed$"))?,
            ended_round: named(&players, |p| format!("^(?P<p>{p}) ended the round$"))?,
            cancel_pre: named(&players, |p| {
                format!("^(?P<p>{p}) cancelled (?P<card>.+)$")
            })?,
            damage: named(&groups, |g| {
                format!(r"^(?P<g>{g}) took (?P<amount>\d+) damage$")
            })?,
            heal: named(&groups, |g| {
                format!(r"^(?P<g>{g}) healed (?P<amount>\d+) damage$")
            })?,
            death: named(&groups, |g| format!("^(?P<g>{g}) died$"))?,
            block: named(&groups, |g| {
                format!(r"^(?P<g>{g}) blocked with (?P<card>.+?), health now (?P<hp>\d+)$")
            })?,
        })
    }
}

/// Escaped alternation over a set of display names, longest first so a
/// name that prefixes another cannot shadow it. None if no names exist
/// yet; an empty name is a precondition violation.
fn alternation<'a>(
    names: impl Iterator<Item = &'a str>,
) -> Result<Option<String>, ReconstructError> {
    let mut names: Vec<&str> = names.collect();
    if names.iter().any(|n| n.is_empty()) {
        return Err(ReconstructError::Pattern(
            "empty display name in battle model".to_string(),
        ));
    }
    if names.is_empty() {
        return Ok(None);
    }
    names.sort_by_key(|n| std::cmp::Reverse(n.len()));
    Ok(Some(
        names
            .iter()
            .map(|n| regex::escape(n))
            .collect::<Vec<_>>()
            .join("|"),
    ))
}

fn compile(pattern: &str) -> Result<Regex, ReconstructError> {
    Regex::new(pattern).map_err(|e| ReconstructError::Pattern(e.to_string()))
}

fn named(
    alt: &Option<String>,
    template: impl Fn(&str) -> String,
) -> Result<Option<Regex>, ReconstructError> {
    match alt {
        Some(names) => Ok(Some(compile(&template(names))?)),
        None => Ok(None),
    }
}

fn named2(
    first: &Option<String>,
    second: &Option<String>,
    template: impl Fn(&str, &str) -> String,
) -> Result<Option<Regex>, ReconstructError> {
    match (first, second) {
        (Some(a), Some(b)) => Ok(Some(compile(&template(a, b))?)),
        _ => Ok(None),
    }
}
