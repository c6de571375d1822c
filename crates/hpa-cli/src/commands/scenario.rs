use std::path::Path;

use hpa_core::ScenarioConfig;

use super::run::load_config;

pub fn scaffold(
    output: Option<&Path>,
    pod_cpu_request: u64,
    min_replicas: u32,
    max_replicas: u32,
) -> anyhow::Result<()> {
    let config = ScenarioConfig::scaffold(pod_cpu_request, min_replicas, max_replicas);
    let content = config.to_toml_string()?;

    match output {
        Some(path) => {
            std::fs::write(path, content)?;
            println!("✓ Generated {}", path.display());
        }
        None => print!("{content}"),
    }
    Ok(())
}

pub fn check(path: &Path) -> anyhow::Result<()> {
    let config = load_config(Some(path))?;
    let settings = config.validate()?;

    println!("✓ {} is valid", path.display());
    println!("  {}", settings.describe_timing());
    for warning in config.warnings() {
        println!("  warning: {warning}");
    }
    Ok(())
}
