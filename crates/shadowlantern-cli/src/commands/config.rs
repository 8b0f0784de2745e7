use clap::Subcommand;
use shadowlantern_core::Config;

const SECTIONS: [&str; 3] = ["habit", "diagnosis", "interpret"];

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a value, or every value in a section
    Get {
        /// Key such as "habit.test_weekday", or a section: habit, diagnosis, interpret
        key: String,
    },
    /// Set a value
    Set {
        /// Key such as "diagnosis.chat_quota"
        key: String,
        value: String,
    },
    /// List values, one `key = value` per line
    List {
        /// Only this section
        #[arg(long)]
        section: Option<String>,
        /// Print the whole config as JSON instead
        #[arg(long)]
        json: bool,
    },
    /// Reset config to defaults
    Reset,
}

fn print_entries(entries: &[(String, String)]) {
    for (key, value) in entries {
        println!("{key} = {value}");
    }
}

fn section_entries(config: &Config, section: &str) -> Result<Vec<(String, String)>, String> {
    if !SECTIONS.contains(&section) {
        return Err(format!(
            "unknown section: {section} (expected one of {})",
            SECTIONS.join(", ")
        ));
    }
    Ok(config.section(section))
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None if SECTIONS.contains(&key.as_str()) => print_entries(&config.section(&key)),
                None => return Err(format!("unknown key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            // read back the coerced value
            let stored = config.get(&key).unwrap_or(value);
            println!("{key} = {stored}");
        }
        ConfigAction::List { section, json } => {
            let config = Config::load()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else if let Some(section) = section {
                print_entries(&section_entries(&config, &section)?);
            } else {
                print_entries(&config.entries());
            }
        }
        ConfigAction::Reset => {
            Config::default().save()?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
