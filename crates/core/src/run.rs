use crate::{
    CalendarDate, CardRef, CombatError, Content, Event, EventBus, GameConfig, GameState,
    InventoryError, Phase, RngState, ShopError,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod encounter;
mod event;
mod helpers;
mod navigate;
mod rest;
mod reward;
mod shop;
mod treasure;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RunError {
    #[error("invalid phase: {0:?}")]
    InvalidPhase(Phase),
    #[error("no active combat")]
    NoCombat,
    #[error("unknown map node")]
    UnknownNode,
    #[error("map node is not available")]
    NodeUnavailable,
    #[error("unknown card")]
    UnknownCard,
    #[error("card not in deck")]
    CardNotInDeck,
    #[error("card already upgraded")]
    AlreadyUpgraded,
    #[error("not enough gold: price {price}, have {gold}")]
    NotEnoughGold { price: u32, gold: u32 },
    #[error("invalid offer index")]
    InvalidOffer,
    #[error("offer already purchased")]
    AlreadyPurchased,
    #[error("no free potion slot")]
    PotionSlotsFull,
    #[error("invalid choice")]
    InvalidChoice,
    #[error("event already resolved")]
    EventAlreadyResolved,
    #[error("already at full hp")]
    NothingToHeal,
    #[error("service already used")]
    AlreadyUsed,
    #[error("no encounter for this act and tier")]
    NoEncounter,
    #[error("combat: {0}")]
    Combat(#[from] CombatError),
    #[error("inventory error: {0}")]
    Inventory(#[from] InventoryError),
}

impl From<ShopError> for RunError {
    fn from(err: ShopError) -> Self {
        match err {
            ShopError::InvalidOffer => RunError::InvalidOffer,
            ShopError::AlreadyPurchased => RunError::AlreadyPurchased,
        }
    }
}

/// Every input the run reducer accepts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    StartNewGame {
        #[serde(default)]
        started_at_ms: u64,
    },
    StartDailyChallenge {
        date: CalendarDate,
        #[serde(default)]
        started_at_ms: u64,
    },
    EnterNode {
        node_id: String,
    },
    PlayCard {
        card: CardRef,
        #[serde(default)]
        target: Option<usize>,
    },
    EndTurn,
    UsePotion {
        slot: usize,
        #[serde(default)]
        target: Option<usize>,
    },
    ChooseCardReward {
        #[serde(default)]
        card_id: Option<String>,
    },
    RestHeal,
    RestUpgrade {
        card_id: String,
    },
    RestRemove {
        card_id: String,
        /// Second removal, only with Deck Master.
        #[serde(default)]
        second: Option<String>,
    },
    BuyCard {
        offer: usize,
    },
    BuyPotion {
        offer: usize,
    },
    ShopRemoveCard {
        card_id: String,
    },
    ShopHeal,
    LeaveShop,
    ChooseEventOption {
        choice_id: String,
        #[serde(default)]
        card_id: Option<String>,
    },
    EventGainGold {
        amount: i32,
    },
    EventHeal {
        amount: u32,
    },
    EventDamage {
        amount: u32,
    },
    EventGainMaxHp {
        amount: i32,
    },
    LeaveEvent,
    CollectTreasure,
    AdvanceAct,
    SetPhase {
        phase: Phase,
    },
    Load {
        state: Box<GameState>,
    },
    Save,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::StartNewGame { .. } => "start_new_game",
            Action::StartDailyChallenge { .. } => "start_daily_challenge",
            Action::EnterNode { .. } => "enter_node",
            Action::PlayCard { .. } => "play_card",
            Action::EndTurn => "end_turn",
            Action::UsePotion { .. } => "use_potion",
            Action::ChooseCardReward { .. } => "choose_card_reward",
            Action::RestHeal => "rest_heal",
            Action::RestUpgrade { .. } => "rest_upgrade",
            Action::RestRemove { .. } => "rest_remove",
            Action::BuyCard { .. } => "buy_card",
            Action::BuyPotion { .. } => "buy_potion",
            Action::ShopRemoveCard { .. } => "shop_remove_card",
            Action::ShopHeal => "shop_heal",
            Action::LeaveShop => "leave_shop",
            Action::ChooseEventOption { .. } => "choose_event_option",
            Action::EventGainGold { .. } => "event_gain_gold",
            Action::EventHeal { .. } => "event_heal",
            Action::EventDamage { .. } => "event_damage",
            Action::EventGainMaxHp { .. } => "event_gain_max_hp",
            Action::LeaveEvent => "leave_event",
            Action::CollectTreasure => "collect_treasure",
            Action::AdvanceAct => "advance_act",
            Action::SetPhase { .. } => "set_phase",
            Action::Load { .. } => "load",
            Action::Save => "save",
        }
    }
}

/// Owns the canonical game state together with the catalogs and generator
/// every transition reads from.
#[derive(Debug)]
pub struct RunState {
    pub config: GameConfig,
    pub content: Content,
    pub rng: RngState,
    pub state: GameState,
}

impl RunState {
    pub fn new(config: GameConfig, content: Content, rng: RngState) -> Self {
        Self {
            config,
            content,
            rng,
            state: GameState::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// Applies one action. On `Err` the game state and generator are exactly
    /// as they were and nothing is published to `events`.
    pub fn dispatch(&mut self, action: Action, events: &mut EventBus) -> Result<(), RunError> {
        let name = action.name();
        let saved_state = self.state.clone();
        let saved_rng = self.rng.clone();
        let mut pending = EventBus::default();
        match self.apply(action, &mut pending) {
            Ok(()) => {
                log::debug!("accepted {name} (phase {:?})", self.state.phase);
                events.append(&mut pending);
                Ok(())
            }
            Err(err) => {
                log::debug!("rejected {name}: {err}");
                self.state = saved_state;
                self.rng = saved_rng;
                Err(err)
            }
        }
    }

    fn apply(&mut self, action: Action, events: &mut EventBus) -> Result<(), RunError> {
        match action {
            Action::StartNewGame { started_at_ms } => {
                self.start_new_game(started_at_ms, events);
                Ok(())
            }
            Action::StartDailyChallenge {
                date,
                started_at_ms,
            } => {
                self.start_daily_challenge(date, started_at_ms, events);
                Ok(())
            }
            Action::EnterNode { node_id } => self.enter_node(&node_id, events),
            Action::PlayCard { card, target } => self.play_card(&card, target, events),
            Action::EndTurn => self.end_turn(events),
            Action::UsePotion { slot, target } => self.use_potion(slot, target, events),
            Action::ChooseCardReward { card_id } => {
                self.choose_card_reward(card_id.as_deref(), events)
            }
            Action::RestHeal => self.rest_heal(events),
            Action::RestUpgrade { card_id } => self.rest_upgrade(&card_id, events),
            Action::RestRemove { card_id, second } => {
                self.rest_remove(&card_id, second.as_deref(), events)
            }
            Action::BuyCard { offer } => self.buy_card(offer, events),
            Action::BuyPotion { offer } => self.buy_potion(offer, events),
            Action::ShopRemoveCard { card_id } => self.shop_remove_card(&card_id, events),
            Action::ShopHeal => self.shop_heal(events),
            Action::LeaveShop => self.leave_shop(events),
            Action::ChooseEventOption { choice_id, card_id } => {
                self.choose_event_option(&choice_id, card_id.as_deref(), events)
            }
            Action::EventGainGold { amount } => {
                self.require_phase(Phase::Event)?;
                self.change_gold(i64::from(amount), events)
            }
            Action::EventHeal { amount } => {
                self.require_phase(Phase::Event)?;
                self.heal(amount, events);
                Ok(())
            }
            Action::EventDamage { amount } => {
                self.require_phase(Phase::Event)?;
                self.event_damage(amount, events);
                Ok(())
            }
            Action::EventGainMaxHp { amount } => {
                self.require_phase(Phase::Event)?;
                self.change_max_hp(amount, events);
                Ok(())
            }
            Action::LeaveEvent => self.leave_event(events),
            Action::CollectTreasure => self.collect_treasure(events),
            Action::AdvanceAct => {
                self.require_phase(Phase::Map)?;
                if self.state.act >= self.config.map.acts {
                    return Err(RunError::InvalidPhase(self.state.phase));
                }
                self.advance_act(events);
                Ok(())
            }
            Action::SetPhase { phase } => {
                self.set_phase(phase, events);
                Ok(())
            }
            Action::Load { state } => {
                self.load(*state);
                Ok(())
            }
            Action::Save => Ok(()),
        }
    }

    fn load(&mut self, state: GameState) {
        if let Some(daily) = &state.daily {
            self.rng = RngState::from_seed(daily.rng_seed(u64::from(state.stats.floors_cleared)));
        }
        log::info!(
            "loaded run: act {}, floor {}, phase {:?}",
            state.act,
            state.floor,
            state.phase
        );
        self.state = state;
    }

    pub(crate) fn set_phase(&mut self, phase: Phase, events: &mut EventBus) {
        if self.state.phase != phase {
            self.state.phase = phase;
            events.push(Event::PhaseChanged { phase });
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{ActPools, Card, EnemyTemplate, EventDef, NodeType, Potion, Relic};
    use serde::de::DeserializeOwned;

    fn parse<T: DeserializeOwned>(json: &str) -> T {
        serde_json::from_str(json).expect("fixture json")
    }

    pub fn test_content() -> Content {
        let cards: Vec<Card> = parse(
            r#"[
            {"id":"strike","name":"Strike","kind":"attack","cost":1,"damage":6,"rarity":"common"},
            {"id":"defend","name":"Defend","kind":"skill","cost":1,"block":5,"rarity":"common"},
            {"id":"bash","name":"Bash","kind":"attack","cost":2,"damage":8,"rarity":"common",
             "status":{"kind":"vulnerable","amount":2,"target":"enemy"}},
            {"id":"cleave","name":"Cleave","kind":"attack","cost":1,"damage":8,"rarity":"common","special":"cleave"},
            {"id":"dodge","name":"Dodge","kind":"skill","cost":1,"block":8,"rarity":"common"},
            {"id":"flex","name":"Flex","kind":"skill","cost":0,"rarity":"common",
             "status":{"kind":"strength","amount":2,"target":"self"},"special":"temporary"},
            {"id":"execute","name":"Execute","kind":"attack","cost":1,"damage":10,"rarity":"uncommon","special":"execute"},
            {"id":"fortify","name":"Fortify","kind":"skill","cost":2,"block":12,"rarity":"uncommon"},
            {"id":"metallicize","name":"Metallicize","kind":"power","cost":1,"rarity":"uncommon","special":"metallicize"},
            {"id":"rampage","name":"Rampage","kind":"attack","cost":1,"damage":8,"rarity":"rare","special":"rampage"},
            {"id":"barricade","name":"Barricade","kind":"power","cost":3,"rarity":"rare","special":"barricade"},
            {"id":"wound","name":"Wound","kind":"skill","cost":0,"rarity":"common","special":"unplayable"}
        ]"#,
        );
        let enemies: Vec<EnemyTemplate> = parse(
            r#"[
            {"id":"dummy","name":"Dummy","max_hp":40,"act":1,"action":{"kind":"attack","damage":6}},
            {"id":"brute","name":"Brute","max_hp":80,"act":1,"action":{"kind":"attack","damage":12}},
            {"id":"titan","name":"Titan","max_hp":200,"act":1,"action":{"kind":"attack","damage":20}}
        ]"#,
        );
        let relics: Vec<Relic> = parse(
            r#"[
            {"id":"iron_ring","name":"Iron Ring","rarity":"common","effect":"hp_after_combat"},
            {"id":"gold_tooth","name":"Gold Tooth","rarity":"common","effect":"gold_per_combat"},
            {"id":"blood_vial","name":"Blood Vial","rarity":"common","effect":"heal_after_combat"},
            {"id":"lucky_coin","name":"Lucky Coin","rarity":"common","effect":"extra_card_reward"},
            {"id":"worn_boots","name":"Worn Boots","rarity":"common","effect":"extra_gold_5"},
            {"id":"card_mastery","name":"Card Mastery","rarity":"uncommon","effect":"upgrade_basics"},
            {"id":"deck_master","name":"Deck Master","rarity":"rare","effect":"double_remove"},
            {"id":"phoenix_feather","name":"Phoenix Feather","rarity":"rare","effect":"phoenix_revival"},
            {"id":"chaos_orb","name":"Chaos Orb","rarity":"rare","effect":"chaos_play"}
        ]"#,
        );
        let potions: Vec<Potion> = parse(
            r#"[
            {"id":"health_potion","name":"Health Potion","effect":{"heal":20}},
            {"id":"fire_potion","name":"Fire Potion","effect":{"damage_all":20}},
            {"id":"block_potion","name":"Block Potion","effect":{"block":12}}
        ]"#,
        );
        let events: Vec<EventDef> = parse(
            r#"[
            {"id":"shrine","name":"Shrine","choices":[
                {"id":"pray","text":"Pray","consequences":[{"type":"heal","amount":10},{"type":"gold","amount":-30}]},
                {"id":"desecrate","text":"Desecrate","consequences":[{"type":"damage","amount":8},{"type":"gold","amount":40}]},
                {"id":"offer","text":"Offer a card","consequences":[{"type":"remove_card"}]},
                {"id":"study","text":"Study","consequences":[{"type":"upgrade_card"}]},
                {"id":"loot","text":"Loot","consequences":[{"type":"relic","id":"chaos_orb"},{"type":"potion","id":"block_potion"},{"type":"card","kind":"attack","count":2}]},
                {"id":"bet","text":"Bet","consequences":[{"type":"gamble","stake":25}]},
                {"id":"idol","text":"Idol","consequences":[{"type":"gold","amount":100},{"type":"max_hp","amount":-5}]},
                {"id":"leave","text":"Leave","consequences":[{"type":"nothing"}]}
            ]}
        ]"#,
        );
        let acts: Vec<ActPools> = parse(
            r#"[{
            "act":1,
            "cards":{"common":["bash","cleave","dodge","flex"],"uncommon":["execute","fortify","metallicize"],"rare":["rampage","barricade"]},
            "relics":{"common":["iron_ring","gold_tooth","blood_vial","lucky_coin","worn_boots"],"uncommon":["card_mastery"],"rare":["deck_master","phoenix_feather","chaos_orb"]},
            "potions":["health_potion","fire_potion","block_potion"],
            "events":["shrine"],
            "encounters":{"normal":[["dummy"]],"elite":[["brute"]],"boss":[["titan"]]}
        }]"#,
        );
        let mut starter_deck = vec!["strike".to_string(); 5];
        starter_deck.extend(vec!["defend".to_string(); 5]);
        Content {
            cards,
            starter_deck,
            enemies,
            relics,
            potions,
            events,
            acts,
        }
    }

    pub fn test_run(seed: u64) -> RunState {
        RunState::new(GameConfig::default(), test_content(), RngState::from_seed(seed))
    }

    pub fn started_run(seed: u64) -> RunState {
        let mut run = test_run(seed);
        let mut events = EventBus::default();
        run.dispatch(Action::StartNewGame { started_at_ms: 0 }, &mut events)
            .expect("start");
        run
    }

    /// Started run inside the first floor's combat.
    pub fn in_combat(seed: u64) -> RunState {
        let mut run = started_run(seed);
        let mut events = EventBus::default();
        run.dispatch(Action::EnterNode { node_id: "1-0-0".into() }, &mut events)
            .expect("enter combat");
        run
    }

    /// Started run at the card reward screen after the first fight.
    pub fn won_combat(seed: u64) -> RunState {
        let mut run = in_combat(seed);
        set_hand(&mut run, &["strike"]);
        if let Some(combat) = run.state.combat.as_mut() {
            combat.enemies[0].hp = 1;
        }
        let mut events = EventBus::default();
        run.dispatch(
            Action::PlayCard {
                card: CardRef::Index(0),
                target: None,
            },
            &mut events,
        )
        .expect("lethal strike");
        run
    }

    pub fn set_hand(run: &mut RunState, ids: &[&str]) {
        let hand: Vec<Card> = ids
            .iter()
            .map(|id| run.content.card(id).cloned().expect("card"))
            .collect();
        if let Some(combat) = run.state.combat.as_mut() {
            combat.hand = hand;
        }
    }

    /// Gives a relic to the run and, if a fight is underway, to the combat copy.
    pub fn give_relic(run: &mut RunState, id: &str) {
        let relic = run.content.relic(id).cloned().expect("relic");
        if let Some(combat) = run.state.combat.as_mut() {
            combat.relics.push(relic.clone());
        }
        run.state.player.relics.push(relic);
    }

    /// Started run with the player placed on a node of the given kind.
    pub fn at_node(seed: u64, kind: NodeType) -> RunState {
        let mut run = started_run(seed);
        if let Some(node) = run.state.map.iter_mut().find(|node| node.id == "1-0-0") {
            node.kind = kind;
        }
        let mut events = EventBus::default();
        run.dispatch(Action::EnterNode { node_id: "1-0-0".into() }, &mut events)
            .expect("enter node");
        run
    }

    #[test]
    fn rejected_action_publishes_nothing() {
        let mut run = started_run(1);
        let before = run.state.clone();
        let rng_before = run.rng.clone().next_u64();
        let mut events = EventBus::default();
        assert_eq!(
            run.dispatch(Action::RestHeal, &mut events),
            Err(RunError::InvalidPhase(Phase::Map))
        );
        assert_eq!(run.state, before);
        assert_eq!(run.rng.clone().next_u64(), rng_before);
        assert!(events.is_empty());
    }

    #[test]
    fn action_json_is_tagged() {
        let action = Action::PlayCard {
            card: CardRef::Index(2),
            target: Some(1),
        };
        let json = serde_json::to_value(&action).expect("json");
        assert_eq!(json["type"], "play_card");
        let parsed: Action =
            serde_json::from_str(r#"{"type":"enter_node","node_id":"1-0-1"}"#).expect("parse");
        assert_eq!(
            parsed,
            Action::EnterNode {
                node_id: "1-0-1".into()
            }
        );
    }

    #[test]
    fn load_replaces_state_and_reseeds_daily_runs() {
        let mut run = test_run(1);
        let mut events = EventBus::default();
        run.dispatch(
            Action::StartDailyChallenge {
                date: CalendarDate::new(2026, 10, 16),
                started_at_ms: 0,
            },
            &mut events,
        )
        .expect("daily");
        let mut saved = run.state.clone();
        saved.stats.floors_cleared = 4;
        saved.player.gold = 321;
        let expected_seed = saved.daily.as_ref().expect("daily").rng_seed(4);

        let mut other = test_run(77);
        other
            .dispatch(Action::Load { state: Box::new(saved.clone()) }, &mut events)
            .expect("load");
        assert_eq!(other.state, saved);
        assert_eq!(other.rng.seed(), expected_seed);
        other.dispatch(Action::Save, &mut events).expect("save");
        assert_eq!(other.state, saved);
    }

    #[test]
    fn set_phase_is_an_escape_hatch() {
        let mut run = started_run(1);
        let mut events = EventBus::default();
        run.dispatch(Action::SetPhase { phase: Phase::Rest }, &mut events)
            .expect("set phase");
        assert_eq!(run.phase(), Phase::Rest);
        assert_eq!(
            events.drain().collect::<Vec<_>>(),
            vec![Event::PhaseChanged { phase: Phase::Rest }]
        );
    }
}
