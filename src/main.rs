use anyhow::Result;
use orbs_config::OrbsConfig;

fn main() -> Result<()> {
    // The log filter lives in the config, so a load error is reported once logging is up.
    let loaded = OrbsConfig::load();
    let config = match &loaded {
        Ok(config) => config.clone(),
        Err(_) => OrbsConfig::from_env(),
    };
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.filter.as_str()),
    )
    .init();
    if let Err(e) = loaded {
        log::warn!("{}; using default configuration", e);
    }
    log::debug!("config: {:?}", config);
    orbs_scene::run(&config)
}
