use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Strength,
    Weak,
    Vulnerable,
    Poison,
    Regen,
    Thorns,
    Ritual,
}

impl StatusKind {
    pub const ALL: [StatusKind; 7] = [
        StatusKind::Strength,
        StatusKind::Weak,
        StatusKind::Vulnerable,
        StatusKind::Poison,
        StatusKind::Regen,
        StatusKind::Thorns,
        StatusKind::Ritual,
    ];

    pub fn is_debuff(self) -> bool {
        matches!(
            self,
            StatusKind::Weak | StatusKind::Vulnerable | StatusKind::Poison
        )
    }
}

/// Stack counts per status. Absent and zero are the same thing; zero entries
/// are never stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct StatusEffects {
    stacks: BTreeMap<StatusKind, u32>,
}

impl StatusEffects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: StatusKind) -> u32 {
        self.stacks.get(&kind).copied().unwrap_or(0)
    }

    pub fn has(&self, kind: StatusKind) -> bool {
        self.get(kind) > 0
    }

    pub fn set(&mut self, kind: StatusKind, value: u32) {
        if value == 0 {
            self.stacks.remove(&kind);
        } else {
            self.stacks.insert(kind, value);
        }
    }

    pub fn add(&mut self, kind: StatusKind, amount: u32) {
        let value = self.get(kind).saturating_add(amount);
        self.set(kind, value);
    }

    /// Removes up to `amount` stacks, clamping at zero.
    pub fn remove(&mut self, kind: StatusKind, amount: u32) {
        let value = self.get(kind).saturating_sub(amount);
        self.set(kind, value);
    }

    pub fn decrement(&mut self, kind: StatusKind) {
        self.remove(kind, 1);
    }

    pub fn clear(&mut self, kind: StatusKind) {
        self.stacks.remove(&kind);
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatusKind, u32)> + '_ {
        self.stacks.iter().map(|(kind, value)| (*kind, *value))
    }
}
