use clap::{Args, Subcommand};
use tour_plan_core::models::{BudgetTier, Tour, TourId};
use tour_plan_core::sync::{HttpTourBackend, RemoteSync, SessionCache, SyncError, TourBackend};

use super::{parse_date, OutputFormat};
use crate::config::Config;
use crate::workspace::Workspace;

#[derive(Args)]
pub struct SyncCommand {
    #[command(subcommand)]
    pub command: SyncSubcommand,
}

#[derive(Subcommand)]
pub enum SyncSubcommand {
    /// Save the working tour to the server
    Save,

    /// Replace the working plan with a tour from the server
    Load {
        /// Server tour id
        id: i64,
    },

    /// List tours stored on the server
    List {
        /// Owner to list for, defaults to the logged-in user
        #[arg(long)]
        user: Option<i64>,

        /// List every tour on the server
        #[arg(long, conflicts_with = "user")]
        all: bool,

        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Create an empty tour on the server and start working on it
    Create {
        title: String,

        /// First day (YYYY-MM-DD)
        #[arg(long)]
        start: String,

        /// Last day (YYYY-MM-DD)
        #[arg(long)]
        end: String,

        #[arg(long)]
        travelers: Option<u32>,

        /// Budget tier (low, medium, high)
        #[arg(long)]
        budget: Option<String>,
    },

    /// Delete a tour on the server
    Delete {
        /// Server tour id
        id: i64,
    },
}

impl SyncSubcommand {
    pub fn is_write(&self) -> bool {
        !matches!(self, SyncSubcommand::List { .. })
    }
}

/// Builds the HTTP backend from config, preferring the session's token.
fn http_backend(config: &Config, session: &SessionCache) -> Result<HttpTourBackend, SyncError> {
    let base_url = config
        .server
        .base_url
        .value
        .clone()
        .ok_or(SyncError::NotConfigured)?;
    let token = session
        .load()?
        .and_then(|s| s.token)
        .or_else(|| config.server.api_token.value.clone());
    Ok(HttpTourBackend::new(base_url, token))
}

fn logged_in_user(session: &SessionCache) -> Result<i64, SyncError> {
    session
        .load()?
        .map(|s| s.user_id)
        .ok_or(SyncError::AuthenticationRequired)
}

impl SyncCommand {
    pub fn run(
        &self,
        workspace: &Workspace,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let session = SessionCache::new(workspace.data_dir());
        let backend = http_backend(config, &session)?;
        let store = workspace.open()?;
        let sync = RemoteSync::new(store.clone(), backend).with_session(session.clone());

        // Use tokio runtime for async operations
        let rt = tokio::runtime::Runtime::new()
            .map_err(|e| format!("Failed to create runtime: {}", e))?;
        rt.block_on(self.execute(&sync, &session))?;

        if self.command.is_write() {
            workspace.save(&store)?;
        }
        Ok(())
    }

    async fn execute<B: TourBackend>(
        &self,
        sync: &RemoteSync<B>,
        session: &SessionCache,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            SyncSubcommand::Save => {
                let saved = sync.save_tour().await?;
                println!("Saved tour {} ({})", saved.id, saved.title);
            }

            SyncSubcommand::Load { id } => {
                let tour = sync.load_tour(*id).await?;
                let count = sync.store().read(|s| s.schedules.len());
                println!("Loaded tour {} with {} schedule entries", tour.id, count);
            }

            SyncSubcommand::List { user, all, format } => {
                let tours = if *all {
                    sync.list_all_tours().await?
                } else {
                    let owner = match user {
                        Some(user) => *user,
                        None => logged_in_user(session)?,
                    };
                    sync.list_tours(owner).await?
                };
                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&tours)?),
                    OutputFormat::Text => {
                        if tours.is_empty() {
                            println!("No tours found.");
                        }
                        for tour in &tours {
                            println!(
                                "[{}] {}  {} ~ {}",
                                tour.id, tour.title, tour.start_date, tour.end_date
                            );
                        }
                    }
                }
            }

            SyncSubcommand::Create {
                title,
                start,
                end,
                travelers,
                budget,
            } => {
                let owner = logged_in_user(session)?;
                let mut template = Tour::new(
                    TourId::Draft(0),
                    title.as_str(),
                    parse_date(start)?,
                    parse_date(end)?,
                );
                if let Some(travelers) = travelers {
                    template = template.with_travelers(*travelers);
                }
                if let Some(budget) = budget {
                    template = template.with_budget(budget.parse::<BudgetTier>()?);
                }
                let created = sync.create_tour(owner, template).await?;
                println!("Created tour {} ({})", created.id, created.title);
            }

            SyncSubcommand::Delete { id } => {
                sync.delete_tour(*id).await?;
                println!("Deleted tour {}", id);
            }
        }
        Ok(())
    }
}
