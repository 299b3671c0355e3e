use clap::{Args, Subcommand};
use tour_plan_core::models::Weather;
use tour_plan_core::store::ItineraryStore;

use super::{parse_date, OutputFormat};
use crate::workspace::Workspace;

#[derive(Args)]
pub struct WeatherCommand {
    #[command(subcommand)]
    pub command: WeatherSubcommand,
}

#[derive(Subcommand)]
pub enum WeatherSubcommand {
    /// Record the forecast for a day, replacing any earlier one
    Add {
        /// Day (YYYY-MM-DD)
        date: String,

        /// Temperature in degrees Celsius
        #[arg(long, allow_hyphen_values = true)]
        temp: f64,

        /// Short description, e.g. "Sunny"
        #[arg(long)]
        description: String,

        /// Icon code from the forecast provider
        #[arg(long)]
        icon: Option<String>,
    },

    /// List recorded forecasts
    List {
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Remove all forecasts
    Clear,
}

impl WeatherSubcommand {
    pub fn is_write(&self) -> bool {
        !matches!(self, WeatherSubcommand::List { .. })
    }
}

impl WeatherCommand {
    pub fn run(&self, workspace: &Workspace) -> Result<(), Box<dyn std::error::Error>> {
        let store = workspace.open()?;
        self.execute(&store)?;
        if self.command.is_write() {
            workspace.save(&store)?;
        }
        Ok(())
    }

    fn execute(&self, store: &ItineraryStore) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            WeatherSubcommand::Add {
                date,
                temp,
                description,
                icon,
            } => {
                let date = parse_date(date)?;
                let mut forecast = Weather::new(date, *temp, description.as_str());
                if let Some(icon) = icon {
                    forecast = forecast.with_icon(icon.as_str());
                }
                let mut weather = store.read(|s| s.weather.clone());
                weather.retain(|w| w.date != date);
                weather.push(forecast);
                weather.sort_by_key(|w| w.date);
                store.set_weather(weather);
                println!("Recorded weather for {}", date);
                Ok(())
            }

            WeatherSubcommand::List { format } => {
                let weather = store.read(|s| s.weather.clone());
                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&weather)?),
                    OutputFormat::Text => {
                        if weather.is_empty() {
                            println!("No weather recorded.");
                        }
                        for w in &weather {
                            println!("{}  {:>5.1}°C  {}", w.date, w.temperature, w.description);
                        }
                    }
                }
                Ok(())
            }

            WeatherSubcommand::Clear => {
                store.set_weather(Vec::new());
                println!("Cleared weather.");
                Ok(())
            }
        }
    }
}
