//! System-message interpreter.
//!
//! Turns a parsed [`ChatLine`] into zero-or-one typed [`ChatEvent`] via an
//! ordered chain of pattern matchers. Only `System` channel lines are
//! dispatched today; `Globals` has an explicit stub so extension is a
//! deliberate act, not an accident.
//!
//! Each matcher runs inside a panic boundary: an internal fault in one
//! matcher counts as "did not match" for that matcher only, and the chain
//! continues. A malformed matcher must never abort interpretation of an
//! otherwise well-formed line.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::LazyLock;

use metrics::counter;
use regex::Regex;
use tracing::warn;

use lootlog_core::events::{
    EnhancerBroke, ItemReceived, PlayerPosWaypoint, ResourceClaimed, SkillGained,
};
use lootlog_core::{ChannelKind, ChatEvent, ChatEventKind, ChatLine, Mpec};

static RE_ENHANCER_BROKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^Your enhancer (?P<enhancer_name>.+?) on your (?P<item_name>.+?) broke\. You have (?P<remaining>\d+) enhancers remaining on the item\.(?: You received (?P<value_ped>\d+(?:\.\d+)?) PED (?P<received_item>.+?)\.)?$",
    )
    .expect("enhancer regex is valid")
});

static RE_ITEM_RECEIVED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^You received (?P<item_name>.+?) x \((?P<qty>\d+)\) Value: (?P<value_ped>\d+(?:\.\d+)?) PED$",
    )
    .expect("item regex is valid")
});

static RE_RESOURCE_CLAIMED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^You have claimed a resource! \((?P<resource_name>.+?)\)$")
        .expect("claim regex is valid")
});

static RE_RESOURCE_DEPLETED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^This resource is depleted$").expect("depleted regex is valid"));

static RE_POSITION_WAYPOINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\[(?P<planet_name>[^,\]]+),\s*(?P<x>-?\d+),\s*(?P<y>-?\d+),\s*(?P<z>-?\d+),\s*Waypoint\]$",
    )
    .expect("waypoint regex is valid")
});

static RE_SKILL_GAINED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^You have gained (?P<amount>\d+(?:\.\d+)?) experience in your (?P<skill>.+?) skill$")
        .expect("skill regex is valid")
});

type Matcher = fn(&ChatLine) -> Option<ChatEventKind>;

/// Matchers in priority order; the first match wins.
const SYSTEM_MATCHERS: &[Matcher] = &[
    match_enhancer_broke,
    match_item_received,
    match_resource_claimed,
    match_resource_depleted,
    match_position_waypoint,
    match_skill_gained,
];

/// Interpret a parsed line into a typed event, or nothing.
pub fn interpret_chat_line(line: &ChatLine) -> Option<ChatEvent> {
    match line.channel_kind {
        ChannelKind::System => run_matchers(line, SYSTEM_MATCHERS),
        ChannelKind::Globals => interpret_globals(line),
        ChannelKind::Public | ChannelKind::Unknown => None,
    }
}

/// Globals currently produce no events. Extension point, kept explicit.
fn interpret_globals(_line: &ChatLine) -> Option<ChatEvent> {
    None
}

fn run_matchers(line: &ChatLine, matchers: &[Matcher]) -> Option<ChatEvent> {
    for matcher in matchers {
        match catch_unwind(AssertUnwindSafe(|| matcher(line))) {
            Ok(Some(kind)) => return Some(ChatEvent::new(line, kind)),
            Ok(None) => {}
            Err(_) => {
                warn!(message = %line.message, "matcher panicked, treating as no-match");
                counter!("chat_interpreter_matcher_panics_total").increment(1);
            }
        }
    }
    None
}

fn match_enhancer_broke(line: &ChatLine) -> Option<ChatEventKind> {
    let caps = RE_ENHANCER_BROKE.captures(&line.message)?;
    let remaining: i64 = caps["remaining"].parse().ok()?;
    Some(ChatEventKind::EnhancerBroke(EnhancerBroke {
        enhancer_name: caps["enhancer_name"].to_string(),
        item_name: caps["item_name"].to_string(),
        remaining,
    }))
}

fn match_item_received(line: &ChatLine) -> Option<ChatEventKind> {
    let caps = RE_ITEM_RECEIVED.captures(&line.message)?;
    let qty: i64 = caps["qty"].parse().ok()?;
    // Inexact PED text (off the mpec grid) refuses the whole event.
    let value_mpec = Mpec::from_ped_str(&caps["value_ped"])?;
    Some(ChatEventKind::ItemReceived(ItemReceived {
        item_name: caps["item_name"].to_string(),
        qty,
        value_mpec,
    }))
}

fn match_resource_claimed(line: &ChatLine) -> Option<ChatEventKind> {
    let caps = RE_RESOURCE_CLAIMED.captures(&line.message)?;
    Some(ChatEventKind::ResourceClaimed(ResourceClaimed {
        resource_name: caps["resource_name"].to_string(),
    }))
}

fn match_resource_depleted(line: &ChatLine) -> Option<ChatEventKind> {
    if RE_RESOURCE_DEPLETED.is_match(&line.message) {
        Some(ChatEventKind::ResourceDepleted)
    } else {
        None
    }
}

fn match_position_waypoint(line: &ChatLine) -> Option<ChatEventKind> {
    let caps = RE_POSITION_WAYPOINT.captures(&line.message)?;
    let x: i64 = caps["x"].parse().ok()?;
    let y: i64 = caps["y"].parse().ok()?;
    let z: i64 = caps["z"].parse().ok()?;
    Some(ChatEventKind::PlayerPosWaypoint(PlayerPosWaypoint {
        planet_name: caps["planet_name"].to_string(),
        x,
        y,
        z,
    }))
}

fn match_skill_gained(line: &ChatLine) -> Option<ChatEventKind> {
    let caps = RE_SKILL_GAINED.captures(&line.message)?;
    Some(ChatEventKind::SkillGained(SkillGained {
        skill: caps["skill"].to_string(),
        amount: caps["amount"].to_string(),
    }))
}
