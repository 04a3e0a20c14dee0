//! Config validation CLI tool
//!
//! Validates a logrecycler configuration file and reports any errors.

use recycler_util::default_config_path;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.get(1).map(String::as_str) {
        Some("-h") | Some("--help") => {
            let default_path = default_config_path();
            eprintln!("Usage: validate-config [config-file]");
            eprintln!();
            eprintln!("Validates a logrecycler configuration file.");
            eprintln!();
            eprintln!("If no path is provided, uses: {}", default_path.display());
            return ExitCode::from(2);
        }
        Some(path) => PathBuf::from(path),
        None => default_config_path(),
    };

    match recycler_config::load_config(&config_path) {
        Ok(config) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Summary:");
            println!(
                "  Preprocess: {}",
                config
                    .preprocess
                    .as_ref()
                    .map(|re| re.as_str())
                    .unwrap_or("(none)")
            );
            println!("  Patterns: {}", config.patterns.len());

            if !config.patterns.is_empty() {
                println!();
                println!("Patterns:");
                for pattern in &config.patterns {
                    let mut fields: Vec<&str> = pattern.capture_names().collect();
                    fields.extend(pattern.add.iter().map(|(k, _)| k.as_str()));

                    let action = if pattern.discard { "discard" } else { "keep" };
                    println!(
                        "  - {} [{}]: {}",
                        pattern.label(),
                        action,
                        pattern.regex.as_str()
                    );
                    if !fields.is_empty() {
                        println!("      fields: {}", fields.join(", "));
                    }
                }
            }

            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed");
            eprintln!();
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_class().code())
        }
    }
}
