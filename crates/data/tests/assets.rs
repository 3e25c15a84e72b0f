use deckdungeon_core::{Consequence, EncounterTier, GameConfig, Special, WOUND_CARD_ID};
use deckdungeon_data::{builtin_config, builtin_content, load_content, load_game_config, validate_content};
use std::path::PathBuf;

fn assets_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../assets")
}

#[test]
fn shipped_assets_load_and_validate() {
    let config = load_game_config(&assets_dir()).expect("config");
    let content = load_content(&assets_dir(), &config).expect("content");
    assert_eq!(content.cards.len(), 52);
    assert_eq!(content.enemies.len(), 31);
    assert_eq!(content.relics.len(), 34);
    assert_eq!(content.potions.len(), 7);
    assert_eq!(content.events.len(), 10);
    assert_eq!(content.acts.len(), 3);
}

#[test]
fn builtin_copy_matches_files_on_disk() {
    let config = builtin_config().expect("config");
    let content = builtin_content(&config).expect("content");
    let on_disk = load_content(&assets_dir(), &config).expect("content");
    assert_eq!(content.cards, on_disk.cards);
    assert_eq!(content.relics, on_disk.relics);
    assert_eq!(content.starter_deck, on_disk.starter_deck);
}

#[test]
fn config_file_carries_default_tuning() {
    let loaded = serde_json::to_value(builtin_config().expect("config")).expect("json");
    let defaults = serde_json::to_value(GameConfig::default()).expect("json");
    assert_eq!(loaded, defaults);
}

#[test]
fn starter_deck_is_five_strikes_and_five_defends() {
    let config = builtin_config().expect("config");
    let content = builtin_content(&config).expect("content");
    let deck = content.starter_deck();
    assert_eq!(deck.len(), 10);
    assert_eq!(deck.iter().filter(|card| card.id == "strike").count(), 5);
    assert_eq!(deck.iter().filter(|card| card.id == "defend").count(), 5);
}

#[test]
fn wound_is_an_unplayable_status_card() {
    let config = builtin_config().expect("config");
    let content = builtin_content(&config).expect("content");
    let wound = content.card(WOUND_CARD_ID).expect("wound");
    assert!(wound.has_special(Special::Unplayable));
    for act in content.acts.iter() {
        assert!(act.cards.all().all(|id| id != WOUND_CARD_ID));
    }
}

#[test]
fn every_act_has_all_encounter_tiers() {
    let config = builtin_config().expect("config");
    let content = builtin_content(&config).expect("content");
    for act in 1..=config.map.acts {
        let pools = content.act(act).expect("pools");
        for tier in [EncounterTier::Normal, EncounterTier::Elite, EncounterTier::Boss] {
            assert!(!pools.encounters.get(tier).is_empty(), "act {act} {tier:?}");
        }
    }
}

#[test]
fn validation_reports_unknown_references() {
    let config = builtin_config().expect("config");
    let content = builtin_content(&config).expect("content");

    let mut broken = content.clone();
    broken.starter_deck.push("missing_card".into());
    let err = validate_content(&broken, &config).expect_err("starter deck");
    assert!(err.to_string().contains("missing_card"));

    let mut broken = content.clone();
    broken.acts[1].encounters.boss = vec![vec!["ghost".into()]];
    let err = validate_content(&broken, &config).expect_err("encounter");
    assert!(format!("{err:#}").contains("ghost"));

    let mut broken = content.clone();
    broken.acts.pop();
    let err = validate_content(&broken, &config).expect_err("act");
    assert!(err.to_string().contains("act 3"));

    let mut broken = content.clone();
    broken.events[0].choices[0].consequences = vec![Consequence::Relic {
        id: Some("nonexistent".into()),
        rarity: None,
    }];
    let err = validate_content(&broken, &config).expect_err("event relic");
    assert!(format!("{err:#}").contains("nonexistent"));

    let mut broken = content;
    let duplicate = broken.cards[0].clone();
    broken.cards.push(duplicate);
    let err = validate_content(&broken, &config).expect_err("duplicate");
    assert!(err.to_string().contains("duplicate card"));
}

#[test]
fn missing_directory_is_an_error_with_path() {
    let dir = assets_dir().join("no_such_dir");
    let err = load_game_config(&dir).expect_err("missing");
    assert!(format!("{err:#}").contains("config.json"));
}
