use env_logger::{Builder, Env, Target};

const LEVEL_VAR: &str = "DECKDUNGEON_LOG";
const DEFAULT_LEVEL: &str = "warn";

/// Engine diagnostics go to stderr so they never interleave with the game
/// text on stdout. `DECKDUNGEON_LOG` takes the usual env_logger filter syntax.
pub fn init() {
    let env = Env::new().filter_or(LEVEL_VAR, DEFAULT_LEVEL);
    let _ = Builder::from_env(env)
        .target(Target::Stderr)
        .format_timestamp(None)
        .try_init();
}
