//! Favorite activity management.
//!
//! Favorites are the candidate set for every suggestion. The catalogue
//! grows when a custom activity is added, matching the onboarding flow.

use clap::Subcommand;

use breakwise_core::Config;

#[derive(Subcommand)]
pub enum FavoriteAction {
    /// Add an activity to the favorites (and to the catalogue if new)
    Add {
        /// Activity name, e.g. "Walk outside"
        name: String,
    },
    /// Remove an activity from the favorites
    Remove { name: String },
    /// List the catalogue, marking favorites
    List,
}

pub fn run(action: FavoriteAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        FavoriteAction::Add { name } => {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err("activity name cannot be empty".into());
            }
            let mut config = Config::load_or_default();
            if !config.activities.contains(&name) {
                config.activities.push(name.clone());
            }
            if config.favorites.contains(&name) {
                println!("{name} is already a favorite.");
            } else {
                config.favorites.push(name.clone());
                println!("Added {name}.");
            }
            if config.favorites.len() < 3 {
                println!(
                    "Pick at least three favorites for useful suggestions ({} so far).",
                    config.favorites.len()
                );
            }
            config.save()?;
        }
        FavoriteAction::Remove { name } => {
            let mut config = Config::load_or_default();
            let before = config.favorites.len();
            config.favorites.retain(|a| a != &name);
            if config.favorites.len() == before {
                println!("{name} was not a favorite.");
            } else {
                println!("Removed {name}.");
            }
            config.save()?;
        }
        FavoriteAction::List => {
            let config = Config::load_or_default();
            for activity in &config.activities {
                let marker = if config.favorites.contains(activity) {
                    "*"
                } else {
                    " "
                };
                println!("{marker} {activity}");
            }
        }
    }
    Ok(())
}
