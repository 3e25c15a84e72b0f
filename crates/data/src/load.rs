use crate::schema::{
    ActsFile, CardsFile, Consequence, Content, EnemiesFile, EventsFile, GameConfig, PotionsFile,
    RelicsFile,
};
use anyhow::{bail, Context};
use deckdungeon_core::{EncounterTier, WOUND_CARD_ID};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

const CONFIG_FILE: &str = "config.json";
const CARDS_FILE: &str = "cards.json";
const ENEMIES_FILE: &str = "enemies.json";
const RELICS_FILE: &str = "relics.json";
const POTIONS_FILE: &str = "potions.json";
const EVENTS_FILE: &str = "events.json";
const ACTS_FILE: &str = "acts.json";

const BUILTIN_CONFIG: &str = include_str!("../../../assets/config.json");
const BUILTIN_CARDS: &str = include_str!("../../../assets/cards.json");
const BUILTIN_ENEMIES: &str = include_str!("../../../assets/enemies.json");
const BUILTIN_RELICS: &str = include_str!("../../../assets/relics.json");
const BUILTIN_POTIONS: &str = include_str!("../../../assets/potions.json");
const BUILTIN_EVENTS: &str = include_str!("../../../assets/events.json");
const BUILTIN_ACTS: &str = include_str!("../../../assets/acts.json");

pub fn load_game_config(dir: &Path) -> anyhow::Result<GameConfig> {
    load_json(dir.join(CONFIG_FILE))
}

/// Reads every catalog file under `dir` and checks its cross references
/// against `config`.
pub fn load_content(dir: &Path, config: &GameConfig) -> anyhow::Result<Content> {
    let cards: CardsFile = load_json(dir.join(CARDS_FILE))?;
    let enemies: EnemiesFile = load_json(dir.join(ENEMIES_FILE))?;
    let relics: RelicsFile = load_json(dir.join(RELICS_FILE))?;
    let potions: PotionsFile = load_json(dir.join(POTIONS_FILE))?;
    let events: EventsFile = load_json(dir.join(EVENTS_FILE))?;
    let acts: ActsFile = load_json(dir.join(ACTS_FILE))?;
    let content = assemble(cards, enemies, relics, potions, events, acts);
    validate_content(&content, config)
        .with_context(|| format!("validate content in {}", dir.display()))?;
    Ok(content)
}

pub fn builtin_config() -> anyhow::Result<GameConfig> {
    parse_json(BUILTIN_CONFIG, CONFIG_FILE)
}

pub fn builtin_content(config: &GameConfig) -> anyhow::Result<Content> {
    let content = assemble(
        parse_json(BUILTIN_CARDS, CARDS_FILE)?,
        parse_json(BUILTIN_ENEMIES, ENEMIES_FILE)?,
        parse_json(BUILTIN_RELICS, RELICS_FILE)?,
        parse_json(BUILTIN_POTIONS, POTIONS_FILE)?,
        parse_json(BUILTIN_EVENTS, EVENTS_FILE)?,
        parse_json(BUILTIN_ACTS, ACTS_FILE)?,
    );
    validate_content(&content, config).context("validate builtin content")?;
    Ok(content)
}

/// Loads from `dir` when it holds a config file, otherwise falls back to the
/// copy embedded in the binary.
pub fn load_or_builtin(dir: Option<&Path>) -> anyhow::Result<(GameConfig, Content)> {
    match dir {
        Some(dir) if dir.join(CONFIG_FILE).exists() => {
            let config = load_game_config(dir)?;
            let content = load_content(dir, &config)?;
            Ok((config, content))
        }
        _ => {
            let config = builtin_config()?;
            let content = builtin_content(&config)?;
            Ok((config, content))
        }
    }
}

fn assemble(
    cards: CardsFile,
    enemies: EnemiesFile,
    relics: RelicsFile,
    potions: PotionsFile,
    events: EventsFile,
    acts: ActsFile,
) -> Content {
    Content {
        cards: cards.cards,
        starter_deck: cards.starter_deck,
        enemies: enemies.enemies,
        relics: relics.relics,
        potions: potions.potions,
        events: events.events,
        acts: acts.acts,
    }
}

pub fn validate_content(content: &Content, config: &GameConfig) -> anyhow::Result<()> {
    let card_ids = unique_ids("card", content.cards.iter().map(|card| card.id.as_str()))?;
    let enemy_ids = unique_ids("enemy", content.enemies.iter().map(|enemy| enemy.id.as_str()))?;
    let relic_ids = unique_ids("relic", content.relics.iter().map(|relic| relic.id.as_str()))?;
    let potion_ids = unique_ids("potion", content.potions.iter().map(|potion| potion.id.as_str()))?;
    let event_ids = unique_ids("event", content.events.iter().map(|event| event.id.as_str()))?;

    if !card_ids.contains(WOUND_CARD_ID) {
        bail!("card catalog lacks the {WOUND_CARD_ID} status card");
    }
    if content.starter_deck.is_empty() {
        bail!("starter deck is empty");
    }
    for id in &content.starter_deck {
        require(&card_ids, "starter deck card", id)?;
    }

    for act in 1..=config.map.acts {
        // `Content::act` falls back to the last act, so look for an exact match
        let pools = content
            .acts
            .iter()
            .find(|pools| pools.act == act)
            .with_context(|| format!("act {act} has no pools"))?;
        for id in pools.cards.all() {
            require(&card_ids, "card pool entry", id)
                .with_context(|| format!("act {act} cards"))?;
        }
        for id in pools.relics.all() {
            require(&relic_ids, "relic pool entry", id)
                .with_context(|| format!("act {act} relics"))?;
        }
        for id in &pools.potions {
            require(&potion_ids, "potion pool entry", id)
                .with_context(|| format!("act {act} potions"))?;
        }
        for id in &pools.events {
            require(&event_ids, "event pool entry", id)
                .with_context(|| format!("act {act} events"))?;
        }
        for tier in [EncounterTier::Normal, EncounterTier::Elite, EncounterTier::Boss] {
            let encounters = pools.encounters.get(tier);
            if encounters.is_empty() {
                bail!("act {act} has no {tier:?} encounters");
            }
            for group in encounters {
                if group.is_empty() {
                    bail!("act {act} has an empty {tier:?} encounter");
                }
                for id in group {
                    require(&enemy_ids, "encounter enemy", id)
                        .with_context(|| format!("act {act} {tier:?} encounters"))?;
                }
            }
        }
    }

    for event in &content.events {
        if event.choices.is_empty() {
            bail!("event {} has no choices", event.id);
        }
        for choice in &event.choices {
            for consequence in &choice.consequences {
                let checked = match consequence {
                    Consequence::Relic { id: Some(id), .. } => require(&relic_ids, "relic", id),
                    Consequence::Card { id: Some(id), .. } => require(&card_ids, "card", id),
                    Consequence::Potion { id: Some(id) } => require(&potion_ids, "potion", id),
                    _ => Ok(()),
                };
                checked.with_context(|| format!("event {} choice {}", event.id, choice.id))?;
            }
        }
    }
    Ok(())
}

fn unique_ids<'a>(
    label: &str,
    ids: impl Iterator<Item = &'a str>,
) -> anyhow::Result<HashSet<&'a str>> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            bail!("duplicate {label} id {id}");
        }
    }
    Ok(seen)
}

fn require(ids: &HashSet<&str>, label: &str, id: &str) -> anyhow::Result<()> {
    if !ids.contains(id) {
        bail!("unknown {label} {id}");
    }
    Ok(())
}

fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<T> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value = serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(value)
}

fn parse_json<T: DeserializeOwned>(raw: &str, name: &str) -> anyhow::Result<T> {
    serde_json::from_str(raw).with_context(|| format!("parse builtin {name}"))
}
