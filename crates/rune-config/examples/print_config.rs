/// Print the effective configuration after file and environment overrides.
///
/// Run with: cargo run -p rune-config --example print_config

fn main() {
    let config = rune_config::RuneConfig::load();

    println!("Transitions:");
    println!("  Insert:     {:?}", config.transitions.insert_duration());
    println!("  Remove:     {:?}", config.transitions.remove_duration());
    println!("  Reposition: {:?}", config.transitions.reposition_duration());
    println!("  Replace:    {:?}", config.transitions.replace_duration());
    println!();

    println!("Diagnostics:");
    println!(
        "  Strict consistency: {}",
        config.diagnostics.strict_consistency
    );
    println!();

    match toml::to_string_pretty(&config) {
        Ok(toml_str) => {
            println!("=== Serialized Configuration ===");
            println!("{toml_str}");
        }
        Err(e) => {
            eprintln!("Failed to serialize config: {e}");
        }
    }
}
