use super::*;
use crate::*;

impl RunState {
    /// Rolls and grants the chest contents; the treasure screen only acknowledges them.
    pub(super) fn open_treasure(&mut self, events: &mut EventBus) -> Result<(), RunError> {
        let rule = &self.config.rewards;
        let (range, relic_chance) = (rule.treasure_gold, rule.treasure_relic_chance);
        let gold = self.rng.range(range.min, range.max);
        let relic = if self.rng.chance(relic_chance) {
            self.content
                .pick_relic(self.state.act, None, &self.state.player.relics, &mut self.rng)
                .cloned()
        } else {
            None
        };
        self.change_gold(i64::from(gold), events)?;
        if let Some(relic) = relic.clone() {
            self.grant_relic(relic, events)?;
        }
        self.state.treasure = Some(TreasureReward { gold, relic });
        self.set_phase(Phase::Treasure, events);
        Ok(())
    }

    pub fn collect_treasure(&mut self, events: &mut EventBus) -> Result<(), RunError> {
        self.require_phase(Phase::Treasure)?;
        self.state.treasure = None;
        self.complete_current_node(events);
        Ok(())
    }
}
