//! The `aimark init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create aimark.toml
    if std::path::Path::new("aimark.toml").exists() {
        println!("aimark.toml already exists, skipping.");
    } else {
        std::fs::write("aimark.toml", SAMPLE_CONFIG)?;
        println!("Created aimark.toml");
    }

    // Create example rubric
    if std::path::Path::new("rubric.txt").exists() {
        println!("rubric.txt already exists, skipping.");
    } else {
        std::fs::write("rubric.txt", EXAMPLE_RUBRIC)?;
        println!("Created rubric.txt");
    }

    // Create example sheet
    if std::path::Path::new("sheet.tsv").exists() {
        println!("sheet.tsv already exists, skipping.");
    } else {
        std::fs::write("sheet.tsv", EXAMPLE_SHEET)?;
        println!("Created sheet.tsv");
    }

    println!("\nNext steps:");
    println!("  1. Edit aimark.toml (point \"custom\" at your local server, or set an OpenAI key)");
    println!("  2. Run: aimark show --sheet sheet.tsv");
    println!("  3. Run: aimark grade --sheet sheet.tsv --rubric rubric.txt --column Answer");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# aimark configuration

default_endpoint = "custom"
parallelism = 1

[endpoints.custom]
url = "http://localhost:11434/v1/chat/completions"
key = ""
model = "llama3"

[endpoints.openai]
url = "https://api.openai.com/v1/chat/completions"
key = "${OPENAI_API_KEY}"
model = "gpt-4o"
"#;

const EXAMPLE_RUBRIC: &str = r#"Mentions that data is split into packets
Explains that each packet carries a destination address
Notes that packets may take different routes across the network
States that packets are reassembled into the original data at the destination
"#;

const EXAMPLE_SHEET: &str = "Name\tAnswer\tscore\n\
Ada\tData is broken into packets that each carry an address and may travel different routes before being reassembled.\t?\n\
Ben\tThe internet sends your whole file in one go down a wire.\t?\n";
