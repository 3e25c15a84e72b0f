use super::*;
use crate::*;

impl RunState {
    fn shop_ref(&self) -> Result<&ShopState, RunError> {
        self.require_phase(Phase::Shop)?;
        self.state
            .shop
            .as_ref()
            .ok_or(RunError::InvalidPhase(self.state.phase))
    }

    fn shop_mut(&mut self) -> Result<&mut ShopState, RunError> {
        let phase = self.state.phase;
        self.state.shop.as_mut().ok_or(RunError::InvalidPhase(phase))
    }

    pub fn buy_card(&mut self, offer: usize, events: &mut EventBus) -> Result<(), RunError> {
        let entry = self.shop_ref()?.card_offer(offer)?;
        let (card, price) = (entry.card.clone(), entry.price);
        self.change_gold(-i64::from(price), events)?;
        self.grant_card(&card, events);
        self.shop_mut()?.cards[offer].sold = true;
        Ok(())
    }

    pub fn buy_potion(&mut self, offer: usize, events: &mut EventBus) -> Result<(), RunError> {
        let entry = self.shop_ref()?.potion_offer(offer)?;
        let (potion, price) = (entry.potion.clone(), entry.price);
        if self.state.player.potions.len() >= self.config.player.potion_slots {
            return Err(RunError::PotionSlotsFull);
        }
        self.change_gold(-i64::from(price), events)?;
        self.grant_potion(potion, events)?;
        self.shop_mut()?.potions[offer].sold = true;
        Ok(())
    }

    pub fn shop_remove_card(&mut self, card_id: &str, events: &mut EventBus) -> Result<(), RunError> {
        let shop = self.shop_ref()?;
        if shop.removal_used {
            return Err(RunError::AlreadyUsed);
        }
        let price = shop.removal_price;
        self.require_gold(price)?;
        self.remove_deck_card(card_id, events)?;
        self.change_gold(-i64::from(price), events)?;
        self.shop_mut()?.removal_used = true;
        Ok(())
    }

    pub fn shop_heal(&mut self, events: &mut EventBus) -> Result<(), RunError> {
        let shop = self.shop_ref()?;
        if shop.heal_used {
            return Err(RunError::AlreadyUsed);
        }
        let (price, amount) = (shop.heal_price, shop.heal_amount);
        if self.state.player.hp >= self.state.player.max_hp {
            return Err(RunError::NothingToHeal);
        }
        self.change_gold(-i64::from(price), events)?;
        self.heal(amount, events);
        self.shop_mut()?.heal_used = true;
        Ok(())
    }

    pub fn leave_shop(&mut self, events: &mut EventBus) -> Result<(), RunError> {
        self.require_phase(Phase::Shop)?;
        self.state.shop = None;
        self.complete_current_node(events);
        Ok(())
    }
}
