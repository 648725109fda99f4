//=========================================================================
// Islander
//=========================================================================
//
// Loads the player config ($ISLANDER_CONFIG or ./islander.toml) and runs
// the island game. Log level defaults to `info`; override with RUST_LOG.
//
//=========================================================================

use env_logger::Env;
use log::info;

use islander::config::PlayerConfig;
use islander::games::island::{IslandAction, IslandPlugin, IslandScene};
use islander::EngineBuilder;

fn main() {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .try_init();

    let config_path = PlayerConfig::default_path();
    let plugin = IslandPlugin::load(config_path);
    info!("Starting Islander as '{}'", plugin.config().name);

    EngineBuilder::<IslandScene, IslandAction>::new()
        .with_tps(60.0)
        .with_window("Islander", 1280, 720)
        .build()
        .with_plugin(plugin)
        .run();
}
