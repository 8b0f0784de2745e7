use clap::Subcommand;
use shadowlantern_core::interpret::{resolve_api_key, API_KEY_ENTRY, API_KEY_ENV};
use shadowlantern_core::storage::keyring_store;
use std::io::BufRead;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Store the Generative Language API key in the OS keyring
    SetKey {
        /// API key; read from stdin when omitted
        key: Option<String>,
    },
    /// Remove the stored API key
    Clear,
    /// Check whether an API key is available
    Status,
}

pub fn run(action: AuthAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        AuthAction::SetKey { key } => {
            let key = match key {
                Some(k) => k,
                None => {
                    let mut line = String::new();
                    std::io::stdin().lock().read_line(&mut line)?;
                    line
                }
            };
            let key = key.trim();
            if key.is_empty() {
                return Err("API key must not be empty".into());
            }
            keyring_store::set(API_KEY_ENTRY, key)?;
            println!("API key stored");
        }
        AuthAction::Clear => {
            keyring_store::delete(API_KEY_ENTRY)?;
            println!("API key removed");
        }
        AuthAction::Status => {
            let source = if std::env::var(API_KEY_ENV).is_ok_and(|k| !k.trim().is_empty()) {
                "environment"
            } else if resolve_api_key().is_some() {
                "keyring"
            } else {
                "none"
            };
            println!(
                "{}",
                if source == "none" {
                    "not configured (analyses will use fallback results)".to_string()
                } else {
                    format!("configured ({source})")
                }
            );
        }
    }
    Ok(())
}
