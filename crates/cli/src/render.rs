use deckdungeon_core::{
    available_nodes, Card, CombatState, DailyResult, Enemy, Event, EventBus, Intent,
    LifetimeStats, NodeType, Phase, RunError, RunState, StatusEffects,
};

pub fn print_help() {
    println!("Commands:");
    println!("  help|h|?                 show help");
    println!("  new                      start a new run");
    println!("  daily                    start today's daily challenge");
    println!("  save [path]              save the run");
    println!("  load [path]              load a saved run");
    println!("  quit|exit                exit");
    println!();
    println!("View:");
    println!("  state|s                  run summary");
    println!("  map|m                    map with available nodes");
    println!("  deck                     deck list");
    println!("  inv                      relics and potions");
    println!("  stats                    lifetime stats and daily history");
    println!();
    println!("Map:");
    println!("  enter|e <node>           enter a node, e.g. `enter 1-0-0`");
    println!();
    println!("Combat:");
    println!("  play|p <idx|id> [enemy]  play a card from hand");
    println!("  end                      end the turn");
    println!("  potion <slot> [enemy]    drink a potion");
    println!();
    println!("Rewards and rooms:");
    println!("  pick <card>|skip         take or skip the card reward");
    println!("  heal                     rest: heal / shop: buy healing");
    println!("  upgrade <card>           rest: upgrade a card");
    println!("  remove <card> [card]     rest: remove a card (second needs a relic)");
    println!("  buy card|potion <idx>    shop purchases");
    println!("  purge <card>             shop card removal");
    println!("  choose <option> [card]   event choice");
    println!("  collect                  take the treasure");
    println!("  leave                    leave the shop or event");
}

pub fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Menu => "menu",
        Phase::Map => "map",
        Phase::Combat => "combat",
        Phase::CardReward => "card reward",
        Phase::Rest => "rest site",
        Phase::Shop => "shop",
        Phase::Event => "event",
        Phase::Treasure => "treasure",
        Phase::GameOver => "game over",
        Phase::Victory => "victory",
    }
}

fn node_short(kind: NodeType) -> &'static str {
    match kind {
        NodeType::Combat => "C",
        NodeType::Elite => "E",
        NodeType::Rest => "R",
        NodeType::Shop => "$",
        NodeType::Event => "?",
        NodeType::Treasure => "T",
        NodeType::Boss => "B",
    }
}

pub fn print_state(run: &RunState) {
    let state = &run.state;
    let player = &state.player;
    println!("== State ==");
    println!(
        "Act {} | Floor {} | Phase {}{}",
        state.act,
        state.floor,
        phase_label(state.phase),
        state
            .daily
            .as_ref()
            .map(|daily| format!(" | Daily {}", daily.date))
            .unwrap_or_default()
    );
    println!(
        "HP {}/{} | Gold {} | Deck {} | Relics {} | Potions {}/{}",
        player.hp,
        player.max_hp,
        player.gold,
        player.deck.len(),
        player.relics.len(),
        player.potions.len(),
        run.config.player.potion_slots
    );
    match state.phase {
        Phase::Map => print_map(run),
        Phase::Combat => {
            if let Some(combat) = &state.combat {
                print_combat(combat);
            }
        }
        Phase::CardReward => print_reward(run),
        Phase::Shop => print_shop(run),
        Phase::Event => print_event(run),
        Phase::Treasure => {
            if let Some(treasure) = &state.treasure {
                println!(
                    "Treasure: {} gold{}",
                    treasure.gold,
                    treasure
                        .relic
                        .as_ref()
                        .map(|relic| format!(", {}", relic.name))
                        .unwrap_or_default()
                );
            }
        }
        _ => {}
    }
}

pub fn print_map(run: &RunState) {
    let state = &run.state;
    let floors = state.map.iter().map(|node| node.y).max().unwrap_or(0);
    for floor in (0..=floors).rev() {
        let row: Vec<String> = state
            .map
            .iter()
            .filter(|node| node.y == floor)
            .map(|node| {
                let mark = if node.completed {
                    "x"
                } else if node.available {
                    "*"
                } else {
                    " "
                };
                format!("{}{}", node_short(node.kind), mark)
            })
            .collect();
        println!("{floor:>3} | {}", row.join("  "));
    }
    let open: Vec<String> = available_nodes(&state.map)
        .map(|node| format!("{} ({:?})", node.id, node.kind))
        .collect();
    if !open.is_empty() {
        println!("Available: {}", open.join(", "));
    }
}

fn format_status(status: &StatusEffects) -> String {
    let parts: Vec<String> = status
        .iter()
        .filter(|(_, amount)| *amount > 0)
        .map(|(kind, amount)| format!("{kind:?} {amount}"))
        .collect();
    if parts.is_empty() {
        String::new()
    } else {
        format!(" [{}]", parts.join(", "))
    }
}

fn format_intent(enemy: &Enemy) -> String {
    let action = &enemy.next_action;
    match enemy.intent {
        Intent::Attack => format!("attack {}", action.damage.unwrap_or(0)),
        Intent::Defend => format!("defend {}", action.block.unwrap_or(0)),
        Intent::Buff | Intent::Debuff => match action.status {
            Some(status) => format!("{:?} {:?} {}", enemy.intent, status.kind, status.amount),
            None => format!("{:?}", enemy.intent),
        },
    }
}

pub fn print_combat(combat: &CombatState) {
    println!(
        "Turn {} | Energy {}/{} | HP {}/{} | Block {}{}",
        combat.turn,
        combat.energy,
        combat.max_energy,
        combat.player.hp,
        combat.player.max_hp,
        combat.player.block,
        format_status(&combat.player.status)
    );
    for (idx, enemy) in combat.enemies.iter().enumerate() {
        if !enemy.is_alive() {
            println!("  [{idx}] {} (defeated)", enemy.name);
            continue;
        }
        println!(
            "  [{idx}] {} {}/{} block {} intent: {}{}",
            enemy.name,
            enemy.hp,
            enemy.max_hp,
            enemy.block,
            format_intent(enemy),
            format_status(&enemy.status)
        );
    }
    print_hand(combat);
    println!(
        "Draw {} | Discard {} | Exhaust {}",
        combat.piles.draw.len(),
        combat.piles.discard.len(),
        combat.piles.exhaust.len()
    );
}

pub fn print_hand(combat: &CombatState) {
    println!("Hand:");
    for (idx, card) in combat.hand.iter().enumerate() {
        println!(
            "  {idx}: ({}) {}",
            combat.effective_cost(card),
            format_card(card)
        );
    }
}

pub fn format_card(card: &Card) -> String {
    let mut text = card.name.clone();
    if card.upgraded {
        text.push('+');
    }
    let mut stats = Vec::new();
    if let Some(damage) = card.damage {
        stats.push(format!("dmg {damage}"));
    }
    if let Some(block) = card.block {
        stats.push(format!("blk {block}"));
    }
    if !stats.is_empty() {
        text.push_str(&format!(" [{}]", stats.join(" ")));
    }
    if !card.description.is_empty() {
        text.push_str(" - ");
        text.push_str(&card.description);
    }
    text
}

pub fn print_deck(run: &RunState) {
    println!("== Deck ({}) ==", run.state.player.deck.len());
    for card in &run.state.player.deck {
        println!("  {} ({}) {}", card.id, card.cost, format_card(card));
    }
}

pub fn print_inventory(run: &RunState) {
    let player = &run.state.player;
    println!("== Relics ==");
    for relic in &player.relics {
        println!("  {}: {}", relic.name, relic.description);
    }
    println!("== Potions ==");
    for (slot, potion) in player.potions.iter().enumerate() {
        println!("  {slot}: {} - {}", potion.name, potion.description);
    }
}

pub fn print_reward(run: &RunState) {
    let Some(offers) = &run.state.card_reward else {
        return;
    };
    println!("Card reward (pick <id> or skip):");
    for card in offers {
        println!("  {}: {}", card.id, format_card(card));
    }
}

pub fn print_shop(run: &RunState) {
    let Some(shop) = &run.state.shop else {
        return;
    };
    println!("== Shop ==");
    for (idx, offer) in shop.cards.iter().enumerate() {
        let sold = if offer.sold { " (sold)" } else { "" };
        println!("  card {idx}: {} - {}g{sold}", format_card(&offer.card), offer.price);
    }
    for (idx, offer) in shop.potions.iter().enumerate() {
        let sold = if offer.sold { " (sold)" } else { "" };
        println!("  potion {idx}: {} - {}g{sold}", offer.potion.name, offer.price);
    }
    if !shop.removal_used {
        println!("  purge: remove a card - {}g", shop.removal_price);
    }
    if !shop.heal_used {
        println!("  heal: {} HP - {}g", shop.heal_amount, shop.heal_price);
    }
}

pub fn print_event(run: &RunState) {
    let Some(current) = &run.state.current_event else {
        return;
    };
    println!("== {} ==", current.event.name);
    if !current.event.description.is_empty() {
        println!("{}", current.event.description);
    }
    if current.resolved {
        println!("(resolved, type `leave`)");
        return;
    }
    for choice in &current.event.choices {
        println!("  {}: {}", choice.id, choice.text);
    }
}

pub fn print_stats(stats: &LifetimeStats, daily: &[DailyResult]) {
    println!("== Lifetime ==");
    println!(
        "Runs {} | Wins {} | Deaths {} | Win rate {:.0}%",
        stats.total_runs,
        stats.victories,
        stats.deaths,
        stats.win_rate() * 100.0
    );
    println!(
        "Floors {} | Kills {} | Damage {} | Cards {} | Gold {}",
        stats.total_floors_cleared,
        stats.total_enemies_killed,
        stats.total_damage_dealt,
        stats.total_cards_played,
        stats.total_gold_earned
    );
    println!(
        "Best floor {} | Longest run {}s{}",
        stats.best_floor,
        stats.longest_run_ms / 1000,
        stats
            .fastest_victory_ms
            .map(|ms| format!(" | Fastest win {}s", ms / 1000))
            .unwrap_or_default()
    );
    if daily.is_empty() {
        return;
    }
    println!("== Daily ==");
    for result in daily.iter().rev() {
        println!(
            "  {}: score {} floors {}{}",
            result.date,
            result.score,
            result.floors_cleared,
            if result.victory { " (won)" } else { "" }
        );
    }
}

pub fn print_run_error(err: &RunError) {
    println!("rejected: {err}");
}

pub fn drain_events(events: &mut EventBus) {
    for event in events.drain() {
        if let Some(line) = format_event(&event) {
            println!("  > {line}");
        }
    }
}

/// One log line per event; phase changes are implied by the next prompt.
pub fn format_event(event: &Event) -> Option<String> {
    let line = match event {
        Event::RunStarted { seed, daily } => {
            format!("run started (seed {seed}{})", if *daily { ", daily" } else { "" })
        }
        Event::NodeEntered { node_id, kind } => format!("entered {node_id} ({kind:?})"),
        Event::CombatStarted { tier, enemies } => {
            format!("{tier:?} combat: {}", enemies.join(", "))
        }
        Event::TurnStarted { turn, energy, hand } => {
            format!("turn {turn}: {energy} energy, {hand} cards")
        }
        Event::CardPlayed { card_id, cost } => format!("played {card_id} ({cost})"),
        Event::CardExhausted { card_id } => format!("{card_id} exhausted"),
        Event::DamageDealt { enemy, amount, hp } => {
            format!("enemy {enemy} took {amount} ({hp} left)")
        }
        Event::BlockGained { amount, block } => format!("+{amount} block ({block})"),
        Event::PlayerDamaged {
            amount,
            blocked,
            hp,
        } => format!("took {amount} damage, {blocked} blocked ({hp} hp)"),
        Event::EnemyActed { enemy, intent } => format!("enemy {enemy}: {intent:?}"),
        Event::EnemyDefeated { enemy, enemy_id } => format!("{enemy_id} [{enemy}] defeated"),
        Event::PlayerRevived { hp } => format!("revived at {hp} hp"),
        Event::PotionUsed { potion_id } => format!("drank {potion_id}"),
        Event::CombatWon { turns } => format!("combat won in {turns} turns"),
        Event::CombatLost => "combat lost".to_string(),
        Event::PhaseChanged { .. } => return None,
        Event::GoldChanged { delta, gold } => format!("gold {delta:+} ({gold})"),
        Event::HpChanged { hp, max_hp } => format!("hp {hp}/{max_hp}"),
        Event::CardAdded { card_id } => format!("{card_id} added to deck"),
        Event::CardRemoved { card_id } => format!("{card_id} removed from deck"),
        Event::CardUpgraded { card_id } => format!("{card_id} upgraded"),
        Event::RelicGained { relic_id } => format!("relic {relic_id}"),
        Event::PotionGained { potion_id } => format!("potion {potion_id}"),
        Event::ActAdvanced { act } => format!("act {act} begins"),
        Event::RunWon => "the dungeon is conquered".to_string(),
        Event::RunLost { act, floor } => format!("fell on act {act} floor {floor}"),
    };
    Some(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_changes_are_not_logged() {
        assert!(format_event(&Event::PhaseChanged { phase: Phase::Map }).is_none());
        assert_eq!(
            format_event(&Event::GoldChanged { delta: -30, gold: 69 }).as_deref(),
            Some("gold -30 (69)")
        );
    }
}
