//! Typed domain events interpreted from system chat lines.
//!
//! Each event is a [`ChatMeta`] (channel metadata shared by every kind) plus
//! a [`ChatEventKind`] variant holding the kind-specific payload struct. The
//! payload structs are what gets serialized into the envelope's
//! `payload_json`; the meta fields are hoisted to envelope-level columns by
//! the store and never appear in the payload.
//!
//! Events are immutable once constructed: created by the interpreter,
//! consumed exactly once by `EventStore::append`.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::chat::{ChannelKind, ChatLine};
use crate::money::Mpec;

/// Channel metadata carried by every chat event, inherited from the line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatMeta {
    /// Timestamp label from the line header (naive game time).
    pub event_dt: NaiveDateTime,
    /// Classified channel.
    pub channel_kind: ChannelKind,
    /// Raw channel token.
    pub channel_token: String,
    /// The original line, kept for debugging.
    pub raw: String,
}

impl ChatMeta {
    /// Build meta from a parsed line.
    pub fn from_line(line: &ChatLine) -> Self {
        Self {
            event_dt: line.event_dt,
            channel_kind: line.channel_kind,
            channel_token: line.channel_token.clone(),
            raw: line.raw.clone(),
        }
    }
}

/// A mining claim marker: `You have claimed a resource! (...)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceClaimed {
    /// Name of the claimed resource.
    pub resource_name: String,
}

/// Loot received: `You received <item> x (<qty>) Value: <ped> PED`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemReceived {
    /// Item name.
    pub item_name: String,
    /// Stack quantity.
    pub qty: i64,
    /// Total value in mpec, converted exactly from the PED text.
    pub value_mpec: Mpec,
}

/// An enhancer broke off a tool or weapon.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnhancerBroke {
    /// The enhancer that broke.
    pub enhancer_name: String,
    /// The item it was socketed on.
    pub item_name: String,
    /// Enhancers remaining on the item.
    pub remaining: i64,
}

/// A waypoint position ping echoed into the system channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerPosWaypoint {
    /// Planet name.
    pub planet_name: String,
    /// World X coordinate.
    pub x: i64,
    /// World Y coordinate.
    pub y: i64,
    /// World Z coordinate.
    pub z: i64,
}

/// Skill experience gain.
///
/// `amount` keeps the literal decimal text from the log. It is not money and
/// has no fixed minor-unit grid, so it stays lossless as text rather than
/// being forced through a float.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillGained {
    /// Skill name.
    pub skill: String,
    /// Experience amount, verbatim decimal text.
    pub amount: String,
}

/// The event-kind sum type. Dispatch on the variant, not on introspection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChatEventKind {
    /// Mining claim.
    ResourceClaimed(ResourceClaimed),
    /// Loot received.
    ItemReceived(ItemReceived),
    /// `This resource is depleted` — carries no fields.
    ResourceDepleted,
    /// Enhancer breakage.
    EnhancerBroke(EnhancerBroke),
    /// Waypoint position ping.
    PlayerPosWaypoint(PlayerPosWaypoint),
    /// Skill gain.
    SkillGained(SkillGained),
}

impl ChatEventKind {
    /// Stable string discriminator persisted as the envelope `event_type`.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ResourceClaimed(_) => "ResourceClaimed",
            Self::ItemReceived(_) => "ItemReceived",
            Self::ResourceDepleted => "ResourceDepleted",
            Self::EnhancerBroke(_) => "EnhancerBroke",
            Self::PlayerPosWaypoint(_) => "PlayerPosWaypoint",
            Self::SkillGained(_) => "SkillGained",
        }
    }

    /// Serialize the kind-specific fields to compact JSON.
    ///
    /// Meta fields (timestamp label, channel, raw line) are deliberately
    /// excluded — the store hoists those to envelope columns.
    pub fn payload_json(&self) -> serde_json::Result<String> {
        match self {
            Self::ResourceClaimed(p) => serde_json::to_string(p),
            Self::ItemReceived(p) => serde_json::to_string(p),
            Self::ResourceDepleted => Ok("{}".to_string()),
            Self::EnhancerBroke(p) => serde_json::to_string(p),
            Self::PlayerPosWaypoint(p) => serde_json::to_string(p),
            Self::SkillGained(p) => serde_json::to_string(p),
        }
    }
}

/// A typed domain event: shared channel metadata plus one kind payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatEvent {
    /// Channel metadata inherited from the source line.
    pub meta: ChatMeta,
    /// The kind payload.
    pub kind: ChatEventKind,
}

impl ChatEvent {
    /// Construct an event from a line's metadata and a kind payload.
    pub fn new(line: &ChatLine, kind: ChatEventKind) -> Self {
        Self {
            meta: ChatMeta::from_line(line),
            kind,
        }
    }
}
