/// Example program to print the loaded configuration
///
/// Run with: cargo run -p orbs-config --example print_config

fn main() {
    let config = match orbs_config::OrbsConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}; showing defaults");
            orbs_config::OrbsConfig::from_env()
        }
    };

    println!("=== Skyorbs Configuration ===\n");

    println!("Window Settings:");
    println!("  Title: {}", config.window.title);
    println!();

    println!("Asset Settings:");
    println!("  Root: {}", config.assets.root.display());
    println!("  Sky-box dir: {}", config.assets.resolve("/maps/swedishcastle/").display());
    println!();

    println!("Logging Settings:");
    println!("  Filter: {}", config.logging.filter);
    println!();

    match toml::to_string_pretty(&config) {
        Ok(toml_str) => {
            println!("=== Serialized Configuration ===");
            println!("{}", toml_str);
        }
        Err(e) => {
            eprintln!("Failed to serialize config: {}", e);
        }
    }
}
