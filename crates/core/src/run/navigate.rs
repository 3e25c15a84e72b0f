use super::*;
use crate::*;

impl RunState {
    pub fn start_new_game(&mut self, started_at_ms: u64, events: &mut EventBus) {
        self.state = self.fresh_state(started_at_ms);
        self.state.map = self.map_for_act(1);
        log::info!("new run started (seed {})", self.rng.seed());
        events.push(Event::RunStarted {
            seed: self.rng.seed(),
            daily: false,
        });
        self.set_phase(Phase::Map, events);
    }

    /// Same date, same seed, same maps.
    pub fn start_daily_challenge(
        &mut self,
        date: CalendarDate,
        started_at_ms: u64,
        events: &mut EventBus,
    ) {
        let daily = DailyChallenge::for_date(date);
        self.rng = RngState::from_seed(daily.rng_seed(0));
        self.state = self.fresh_state(started_at_ms);
        self.state.daily = Some(daily);
        self.state.map = self.map_for_act(1);
        log::info!("daily challenge started for {}", date.label());
        events.push(Event::RunStarted {
            seed: self.rng.seed(),
            daily: true,
        });
        self.set_phase(Phase::Map, events);
    }

    fn fresh_state(&self, started_at_ms: u64) -> GameState {
        let rule = &self.config.player;
        let mut state = GameState::new();
        state.player = Player::new(rule.max_hp, rule.gold);
        for card in self.content.starter_deck() {
            state.add_to_deck(&card);
        }
        state.stats.start_time_ms = started_at_ms;
        state
    }

    /// Daily runs use a generator derived from the date seed and act number so
    /// the map does not depend on earlier play.
    fn map_for_act(&mut self, act: u8) -> Vec<MapNode> {
        match &self.state.daily {
            Some(daily) => {
                let mut rng = RngState::from_seed(daily.rng_seed(u64::from(act)));
                generate_map(act, &self.config.map, &mut rng)
            }
            None => generate_map(act, &self.config.map, &mut self.rng),
        }
    }

    pub(super) fn advance_act(&mut self, events: &mut EventBus) {
        self.state.act += 1;
        self.state.floor = 0;
        self.state.current_node = None;
        self.state.map = self.map_for_act(self.state.act);
        log::info!("advanced to act {}", self.state.act);
        events.push(Event::ActAdvanced {
            act: self.state.act,
        });
        self.set_phase(Phase::Map, events);
    }

    pub fn enter_node(&mut self, node_id: &str, events: &mut EventBus) -> Result<(), RunError> {
        self.require_phase(Phase::Map)?;
        let node = self.state.node(node_id).ok_or(RunError::UnknownNode)?;
        if !node.available || node.completed {
            return Err(RunError::NodeUnavailable);
        }
        let (kind, floor) = (node.kind, node.y);
        self.state.floor = floor;
        self.state.current_node = Some(node_id.to_string());
        events.push(Event::NodeEntered {
            node_id: node_id.to_string(),
            kind,
        });

        if let Some(tier) = kind.tier() {
            return self.start_combat(tier, events);
        }
        match kind {
            NodeType::Rest => self.set_phase(Phase::Rest, events),
            NodeType::Shop => {
                let shop = ShopState::generate(
                    &self.config,
                    &self.content,
                    self.state.act,
                    &mut self.rng,
                );
                self.state.shop = Some(shop);
                self.set_phase(Phase::Shop, events);
            }
            NodeType::Event => {
                self.state.current_event = self
                    .content
                    .pick_event(self.state.act, &mut self.rng)
                    .cloned()
                    .map(|event| CurrentEvent {
                        event,
                        resolved: false,
                    });
                self.set_phase(Phase::Event, events);
            }
            NodeType::Treasure => self.open_treasure(events)?,
            NodeType::Combat | NodeType::Elite | NodeType::Boss => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::run::tests::*;
    use crate::*;

    #[test]
    fn new_game_builds_starting_state() {
        let mut run = test_run(3);
        let mut events = EventBus::default();
        run.dispatch(Action::StartNewGame { started_at_ms: 500 }, &mut events)
            .expect("start");
        let state = &run.state;
        assert_eq!(state.phase, Phase::Map);
        assert_eq!(state.player.hp, 70);
        assert_eq!(state.player.gold, 99);
        assert_eq!(state.player.deck.len(), 10);
        assert_eq!(state.stats.start_time_ms, 500);
        assert_eq!(available_nodes(&state.map).count(), 3);
        let mut uids: Vec<u32> = state.player.deck.iter().map(|card| card.uid).collect();
        uids.dedup();
        assert_eq!(uids.len(), 10);
    }

    #[test]
    fn unavailable_node_is_rejected_without_change() {
        let mut run = started_run(3);
        let before = run.state.clone();
        let mut events = EventBus::default();
        let err = run
            .dispatch(Action::EnterNode { node_id: "1-5-0".into() }, &mut events)
            .unwrap_err();
        assert_eq!(err, RunError::NodeUnavailable);
        assert_eq!(run.state, before);
        assert!(events.is_empty());

        let err = run
            .dispatch(Action::EnterNode { node_id: "nope".into() }, &mut events)
            .unwrap_err();
        assert_eq!(err, RunError::UnknownNode);
    }

    #[test]
    fn daily_maps_depend_only_on_date() {
        let date = CalendarDate::new(2026, 10, 16);
        let mut first = test_run(1);
        let mut second = test_run(99);
        let mut events = EventBus::default();
        first
            .dispatch(Action::StartDailyChallenge { date, started_at_ms: 0 }, &mut events)
            .expect("daily");
        second
            .dispatch(Action::StartDailyChallenge { date, started_at_ms: 7 }, &mut events)
            .expect("daily");
        assert_eq!(first.state.map, second.state.map);
        assert_eq!(first.state.daily, second.state.daily);
        assert_eq!(first.rng.seed(), second.rng.seed());
    }

    #[test]
    fn advance_act_is_bounded_by_act_count() {
        let mut run = started_run(2);
        let mut events = EventBus::default();
        run.dispatch(Action::AdvanceAct, &mut events).expect("act 2");
        run.dispatch(Action::AdvanceAct, &mut events).expect("act 3");
        assert_eq!(run.state.act, 3);
        assert!(run.state.map.iter().all(|node| node.id.starts_with("3-")));
        assert!(matches!(
            run.dispatch(Action::AdvanceAct, &mut events),
            Err(RunError::InvalidPhase(Phase::Map))
        ));
    }
}
