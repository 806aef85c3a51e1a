use care_core::analytics::CareManagementStats;
use care_core::constants::{DEFAULT_SAMPLES_DIR, MEMBER_DATA_FILENAME};
use care_core::{
    CareOrchestrator, InMemoryPublisher, MemberDataSource, OrchestrationRequest, Topic,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "care")]
#[command(about = "Care orchestration CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the orchestration pipeline offline on a request file
    Process {
        /// Path to an orchestration request JSON file
        request: PathBuf,
    },
    /// Print care management statistics for the member data file
    Stats {
        /// Directory containing enhanced_member_data.json
        #[arg(long, default_value = DEFAULT_SAMPLES_DIR)]
        samples_dir: PathBuf,
    },
    /// Print one member record
    Member {
        /// Exact member id
        member_id: String,
        /// Directory containing enhanced_member_data.json
        #[arg(long, default_value = DEFAULT_SAMPLES_DIR)]
        samples_dir: PathBuf,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Process { request }) => {
            let bytes = std::fs::read(&request)?;
            match OrchestrationRequest::from_json_slice(&bytes) {
                Ok(request) => {
                    let publisher = Arc::new(InMemoryPublisher::new());
                    let orchestrator = CareOrchestrator::new(publisher.clone());
                    let result = orchestrator.process(&request).await;

                    println!("{}", serde_json::to_string_pretty(&result)?);
                    let topics: Vec<&str> =
                        publisher.topics().into_iter().map(Topic::name).collect();
                    println!("Would publish: {}", topics.join(", "));
                }
                Err(e) => eprintln!("Error reading request: {}", e),
            }
        }
        Some(Commands::Stats { samples_dir }) => {
            let source = MemberDataSource::new(samples_dir.join(MEMBER_DATA_FILENAME));
            match source.load() {
                Ok(members) => {
                    let stats = CareManagementStats::from_members(&members);
                    println!("{}", serde_json::to_string_pretty(&stats)?);
                }
                Err(e) => eprintln!("Error loading member data: {}", e),
            }
        }
        Some(Commands::Member {
            member_id,
            samples_dir,
        }) => {
            let source = MemberDataSource::new(samples_dir.join(MEMBER_DATA_FILENAME));
            match source.find(&member_id) {
                Ok(Some(member)) => println!("{}", serde_json::to_string_pretty(&member)?),
                Ok(None) => println!("Member not found: {}", member_id),
                Err(e) => eprintln!("Error loading member data: {}", e),
            }
        }
        None => {
            println!("Use 'care --help' for commands");
        }
    }

    Ok(())
}
