//! The `aimark endpoints` command.

use std::path::PathBuf;

use anyhow::Result;

use aimark_lm::load_config_from;

pub fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    if config.endpoints.is_empty() {
        println!("No endpoints configured. Run `aimark init` to create a config file.");
        return Ok(());
    }

    // HashMap order is not stable; sort for readable output
    let mut names: Vec<&String> = config.endpoints.keys().collect();
    names.sort();

    for name in names {
        let endpoint = &config.endpoints[name];
        let default_marker = if *name == config.default_endpoint {
            " (default)"
        } else {
            ""
        };
        let key_state = if endpoint.key.is_empty() {
            "no key"
        } else {
            "key set"
        };
        println!("Endpoint: {name}{default_marker}");
        println!("  url:   {}", endpoint.url);
        println!("  model: {} ({key_state})", endpoint.model);
        println!();
    }

    Ok(())
}
