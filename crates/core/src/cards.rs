use crate::StatusKind;
use serde::{Deserialize, Serialize};

/// Catalog id of the status card shuffled in by `wound` and `immolate`.
pub const WOUND_CARD_ID: &str = "wound";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    Attack,
    Skill,
    Power,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TargetScope {
    #[serde(rename = "self")]
    Player,
    #[serde(rename = "enemy")]
    Enemy,
    #[serde(rename = "all_enemies")]
    AllEnemies,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusGrant {
    pub kind: StatusKind,
    pub amount: u32,
    pub target: TargetScope,
}

/// Bespoke card behaviours. Each variant is resolved by the combat effect
/// pipeline after damage, block and status grants.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Special {
    Cleave,
    Execute,
    DrawCard,
    Whirlwind,
    Rampage,
    SearingBlow,
    Wound,
    Immolate,
    MultiHit,
    BloodCost,
    SelfDamage,
    Ethereal,
    Headbutt,
    SecondWind,
    EnergyDamage,
    EnergyDraw,
    Disarm,
    Temporary,
    Cleanse,
    Prepare,
    Uppercut,
    BodySlam,
    Offering,
    Reaper,
    Feed,
    LimitBreak,
    Sentinel,
    Unplayable,
    RagePassive,
    Metallicize,
    DemonForm,
    Barricade,
    Corruption,
    BattleTrance,
    Juggernaut,
    DarkEmbrace,
    Evolve,
}

impl Special {
    /// Damage from these cards lands on every living enemy in the damage step.
    pub fn hits_all_in_damage_step(self) -> bool {
        matches!(self, Special::Cleave | Special::Immolate)
    }

    /// These cards deal their damage from the special step instead of the damage step.
    pub fn defers_damage(self) -> bool {
        matches!(self, Special::Whirlwind | Special::Reaper)
    }

    pub fn requires_target(self) -> bool {
        matches!(
            self,
            Special::Execute
                | Special::MultiHit
                | Special::BodySlam
                | Special::Disarm
                | Special::Uppercut
                | Special::Feed
        )
    }

    /// Permanent per-instance damage growth on play.
    pub fn growth(self) -> Option<u32> {
        match self {
            Special::Rampage => Some(4),
            Special::SearingBlow => Some(6),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Card {
    pub id: String,
    pub name: String,
    pub kind: CardKind,
    pub cost: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<u32>,
    #[serde(default)]
    pub description: String,
    pub rarity: Rarity,
    #[serde(default)]
    pub exhaust: bool,
    #[serde(default)]
    pub upgraded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusGrant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special: Option<Special>,
    /// Instance identity inside a run. Catalog templates carry 0.
    #[serde(default)]
    pub uid: u32,
}

impl Card {
    pub fn instance(&self, uid: u32) -> Card {
        let mut card = self.clone();
        card.uid = uid;
        card
    }

    pub fn has_special(&self, special: Special) -> bool {
        self.special == Some(special)
    }

    pub fn is_unplayable(&self) -> bool {
        self.has_special(Special::Unplayable)
    }

    pub fn base_damage(&self) -> u32 {
        self.damage.unwrap_or(0)
    }

    pub fn base_block(&self) -> u32 {
        self.block.unwrap_or(0)
    }

    /// Whether resolving this card needs a single living enemy.
    pub fn needs_target(&self) -> bool {
        if let Some(special) = self.special {
            if special.requires_target() {
                return true;
            }
            if special.hits_all_in_damage_step() || special.defers_damage() {
                return matches!(self.status, Some(grant) if grant.target == TargetScope::Enemy);
            }
        }
        if self.damage.is_some() {
            return true;
        }
        matches!(self.status, Some(grant) if grant.target == TargetScope::Enemy)
    }

    /// Permanent deck upgrade: flat damage/block bonus and a `+` on the name.
    pub fn upgrade(&mut self, damage_bonus: u32, block_bonus: u32) {
        if let Some(damage) = self.damage.as_mut() {
            if *damage > 0 {
                *damage += damage_bonus;
            }
        }
        if let Some(block) = self.block.as_mut() {
            if *block > 0 {
                *block += block_bonus;
            }
        }
        self.upgraded = true;
        self.name.push('+');
    }
}

/// How an action names a card in hand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CardRef {
    Id(String),
    Index(usize),
}

impl CardRef {
    pub fn find(&self, cards: &[Card]) -> Option<usize> {
        match self {
            CardRef::Id(id) => cards.iter().position(|card| &card.id == id),
            CardRef::Index(idx) => (*idx < cards.len()).then_some(*idx),
        }
    }
}
