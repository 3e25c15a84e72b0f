//! Core game logic. Keep this crate free of IO and platform concerns.

pub mod cards;
pub mod combat;
pub mod config;
pub mod content;
pub mod daily;
pub mod deck;
pub mod enemy;
pub mod events;
pub mod inventory;
pub mod map;
pub mod rng;
pub mod run;
pub mod shop;
pub mod state;
pub mod stats;
pub mod status;

pub use cards::*;
pub use combat::*;
pub use config::*;
pub use content::*;
pub use daily::*;
pub use deck::*;
pub use enemy::*;
pub use events::*;
pub use inventory::*;
pub use map::*;
pub use rng::*;
pub use run::*;
pub use shop::*;
pub use state::*;
pub use stats::*;
pub use status::*;
