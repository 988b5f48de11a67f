//! Oracle availability check.

use console::style;

use crate::config::Settings;
use crate::oracle::OllamaOracle;

pub async fn cmd_check(settings: &Settings) -> anyhow::Result<()> {
    let oracle = OllamaOracle::new(settings.oracle.clone())?;
    println!("Endpoint: {}", settings.oracle.endpoint);
    println!("Model:    {}", settings.oracle.model);

    if oracle.is_available().await {
        println!("{} Oracle is reachable", style("✓").green());
    } else {
        println!("{} Oracle is not reachable", style("✗").red());
        std::process::exit(1);
    }

    Ok(())
}
