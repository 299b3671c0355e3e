//! Login and logout against the local session cache.
//!
//! The persistence server authenticates with a bearer token. `tour login`
//! records which user the CLI acts for, and optionally the token, in
//! `session.json` next to the working itinerary.

use clap::Args;
use tour_plan_core::sync::{Session, SessionCache};

use crate::workspace::Workspace;

/// Remember the user tours are saved for
#[derive(Args)]
pub struct LoginCommand {
    /// Server-side user id
    #[arg(long)]
    pub user_id: i64,

    /// Bearer token; falls back to server.api_token from config
    #[arg(long)]
    pub token: Option<String>,
}

impl LoginCommand {
    pub fn run(&self, workspace: &Workspace) -> Result<(), Box<dyn std::error::Error>> {
        let cache = SessionCache::new(workspace.data_dir());
        cache.store(&Session {
            user_id: self.user_id,
            token: self.token.clone(),
        })?;
        tracing::info!("Stored session for user {}", self.user_id);
        println!("Logged in as user {}", self.user_id);
        Ok(())
    }
}

/// Forget the stored session
#[derive(Args)]
pub struct LogoutCommand;

impl LogoutCommand {
    pub fn run(&self, workspace: &Workspace) -> Result<(), Box<dyn std::error::Error>> {
        let cache = SessionCache::new(workspace.data_dir());
        if cache.clear()? {
            println!("Logged out.");
        } else {
            println!("Not logged in.");
        }
        Ok(())
    }
}
