//! Fetch command - one uncached scrape, printed as JSON on stdout

use clap::Args;
use tracing::info;

use crate::api::types::GradesSummaryResponse;
use crate::config::AppConfig;
use crate::domain::{GradesSource, StudentCredentials};
use crate::infrastructure::logging;
use crate::infrastructure::portal::PortalClient;

#[derive(Args)]
pub struct FetchArgs {
    /// Student ID used to sign in to the portal
    #[arg(short = 's', long)]
    pub student_id: String,

    /// Portal password
    #[arg(long, env = "NILE_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Print the course list together with the computed CGPA
    #[arg(long)]
    pub summary: bool,
}

pub async fn run(args: FetchArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    logging::init_cli_logging(&config.logging);

    let credentials = StudentCredentials::new(args.student_id, args.password)?;
    let portal = PortalClient::from_config(&config.portal);

    info!(portal = %portal.endpoints().base_url(), "Fetching grades");
    let courses = portal.fetch_grades(&credentials).await?;
    info!(courses = courses.len(), "Fetched grades");

    let output = if args.summary {
        serde_json::to_string_pretty(&GradesSummaryResponse::from(courses))?
    } else {
        serde_json::to_string_pretty(&courses)?
    };
    println!("{}", output);

    Ok(())
}
