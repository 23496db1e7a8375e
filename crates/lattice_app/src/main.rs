mod app;
mod commands;
mod config;
mod effects;
mod render;

use log::LevelFilter;

fn main() -> anyhow::Result<()> {
    let config = config::AppConfig::from_env()?;
    lattice_logging::initialize(config.log_destination(), LevelFilter::Info);
    app::run_app(config)
}
