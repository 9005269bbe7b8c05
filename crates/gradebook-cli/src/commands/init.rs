//! The `gradebook init` command.

use std::path::Path;

use anyhow::Result;

use gradebook_core::config::CONFIG_FILE_NAME;

pub fn execute() -> Result<()> {
    if Path::new(CONFIG_FILE_NAME).exists() {
        println!("{CONFIG_FILE_NAME} already exists, skipping.");
    } else {
        std::fs::write(CONFIG_FILE_NAME, SAMPLE_CONFIG)?;
        println!("Created {CONFIG_FILE_NAME}");
    }

    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_FILE_NAME} with your name and institution");
    println!("  2. Run: gradebook session");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# gradebook configuration

# Shown in the report banner and footer
owner = "Eliane Orozco"
institution = "Universidad del Magdalena"
app_name = "Calculadora Académica"

# Where exported PDF reports are written
output_dir = "reports"
"#;
