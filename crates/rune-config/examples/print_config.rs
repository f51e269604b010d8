/// Example program to print the loaded configuration
///
/// Run with: cargo run -p rune-config --example print_config

fn main() {
    // Load configuration from rune.toml
    let config = rune_config::RuneConfig::load();

    println!("=== Rune Motion Configuration ===\n");

    println!("Motion Defaults:");
    println!("  Duration: {}s", config.motion.default_duration_s);
    println!("  Easing: {}", config.motion.default_easing);
    println!("  Stagger Step: {}s", config.motion.stagger_step_s);
    println!("  Frame Interval: {:.3}ms", config.motion.frame_interval_ms);
    println!();

    println!("Demo Settings:");
    println!("  Frames: {:?}", config.demo.frames);
    println!("  Log Filter: {}", config.demo.log_filter);
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
