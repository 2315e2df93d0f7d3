//! FleetSure CLI - command-line client for the lifecycle engine

mod rpc;
mod view;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rpc::RpcClient;
use serde_json::json;
use tabled::Table;
use view::{
    HistoryRow, Job, JobHistory, JobPage, JobRow, MechanicJobs, RunnerTask, TaskHistory, TaskList,
    TaskRow,
};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9630";

#[derive(Parser)]
#[command(name = "fleetsure")]
#[command(about = "FleetSure lifecycle engine CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "FLEETSURE_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Service jobs
    Job {
        #[command(subcommand)]
        command: JobCommand,
    },

    /// Runner (parts delivery) tasks
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },
}

/// Acting identity; without --actor the change is attributed to SYSTEM
#[derive(Args)]
struct ActorArgs {
    /// User ID performing the change
    #[arg(long)]
    actor: Option<String>,

    /// Reason (recorded on the ledger; stored as the cancel reason for CANCELLED)
    #[arg(long)]
    reason: Option<String>,
}

impl ActorArgs {
    fn params(&self) -> serde_json::Value {
        match &self.actor {
            Some(id) => json!({ "actor_kind": "USER", "actor_id": id, "reason": self.reason }),
            None => json!({ "actor_kind": "SYSTEM", "reason": self.reason }),
        }
    }
}

#[derive(Subcommand)]
enum JobCommand {
    /// Submit a new service request
    Create {
        #[arg(long)]
        fleet: String,
        #[arg(long)]
        vehicle: String,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        #[arg(long)]
        address: String,
        #[arg(long)]
        city: String,
        #[arg(long)]
        state: String,
        /// Free-form directions for the mechanic
        #[arg(long)]
        location_notes: Option<String>,
        #[arg(long)]
        issue_type: String,
        #[arg(long, default_value = "")]
        description: String,
        /// STANDARD, PRIORITY or EMERGENCY
        #[arg(long, default_value = "STANDARD")]
        urgency: String,
        /// ROADSIDE, SCHEDULED or PREVENTIVE
        #[arg(long, default_value = "ROADSIDE")]
        job_type: String,
    },

    /// Move a job to a new status
    Transition {
        job_id: String,
        /// Target status (e.g. ASSIGNED, EN_ROUTE, CANCELLED)
        status: String,
        /// Mechanic to dispatch (only with ASSIGNED)
        #[arg(long)]
        mechanic: Option<String>,
        #[command(flatten)]
        actor: ActorArgs,
    },

    /// Show a job
    Get { job_id: String },

    /// Show a job's status history, newest first
    History { job_id: String },

    /// List a fleet's jobs
    List {
        #[arg(long)]
        fleet: String,
        /// Filter by status (repeatable)
        #[arg(long = "status")]
        statuses: Vec<String>,
        #[arg(long, default_value = "1")]
        page: u32,
        #[arg(long, default_value = "20")]
        limit: u32,
    },

    /// Latest jobs dispatched to a mechanic
    Mine {
        #[arg(long)]
        mechanic: String,
    },
}

#[derive(Subcommand)]
enum TaskCommand {
    /// Dispatch a parts delivery for a job
    Create {
        #[arg(long)]
        job: String,
        #[arg(long, allow_hyphen_values = true)]
        pickup_lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        pickup_lon: f64,
        #[arg(long)]
        pickup_address: String,
        #[arg(long, allow_hyphen_values = true)]
        delivery_lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        delivery_lon: f64,
        #[arg(long)]
        delivery_address: String,
        /// Pre-assign a runner
        #[arg(long)]
        runner: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Advance a task one step (or cancel it)
    Advance {
        task_id: String,
        /// Target status (e.g. ACCEPTED, PICKING_UP, DELIVERED)
        status: String,
        #[command(flatten)]
        actor: ActorArgs,
    },

    /// Show a task
    Get { task_id: String },

    /// Show a task's status history, newest first
    History { task_id: String },

    /// List a runner's tasks
    List {
        #[arg(long)]
        runner: String,
    },
}

fn print_job(job: &Job) {
    println!("{}", Table::new([JobRow::from(job)]));
    if let Some(reason) = &job.cancel_reason {
        println!("  {} {}", "Cancel reason:".bold(), reason);
    }
}

async fn run_job(client: &RpcClient, command: JobCommand) -> Result<()> {
    match command {
        JobCommand::Create {
            fleet,
            vehicle,
            lat,
            lon,
            address,
            city,
            state,
            location_notes,
            issue_type,
            description,
            urgency,
            job_type,
        } => {
            let params = json!({
                "fleet_id": fleet,
                "vehicle_id": vehicle,
                "location": {
                    "latitude": lat,
                    "longitude": lon,
                    "address": address,
                    "city": city,
                    "state": state,
                    "notes": location_notes,
                },
                "issue_type": issue_type,
                "issue_description": description,
                "urgency": urgency.to_uppercase(),
                "job_type": job_type.to_uppercase(),
            });

            let job: Job = client.call("job.create.v1", params).await?;
            println!(
                "{}",
                format!("✓ Job {} created", job.job_number).green().bold()
            );
            println!();
            print_job(&job);
        }

        JobCommand::Transition {
            job_id,
            status,
            mechanic,
            actor,
        } => {
            let mut params = actor.params();
            params["job_id"] = json!(job_id);
            params["status"] = json!(status.to_uppercase());
            params["mechanic_id"] = json!(mechanic);

            let job: Job = client.call("job.transition.v1", params).await?;
            println!(
                "✓ Job {} is now {}",
                job.job_number.bold(),
                view::status(&job.status)
            );
        }

        JobCommand::Get { job_id } => {
            let job: Job = client.call("job.get.v1", json!({ "job_id": job_id })).await?;
            print_job(&job);
        }

        JobCommand::History { job_id } => {
            let history: JobHistory = client
                .call("job.history.v1", json!({ "job_id": job_id }))
                .await?;
            let rows: Vec<HistoryRow> = history.entries.iter().map(HistoryRow::from).collect();
            println!("{}", format!("History of job {}", job_id).cyan().bold());
            println!("{}", Table::new(rows));
        }

        JobCommand::List {
            fleet,
            statuses,
            page,
            limit,
        } => {
            let statuses: Vec<String> = statuses.iter().map(|s| s.to_uppercase()).collect();
            let params = json!({
                "fleet_id": fleet,
                "statuses": statuses,
                "page": page,
                "limit": limit,
            });

            let result: JobPage = client.call("job.list.v1", params).await?;
            if result.data.is_empty() {
                println!("{}", "No jobs found".yellow());
                return Ok(());
            }
            let rows: Vec<JobRow> = result.data.iter().map(JobRow::from).collect();
            println!("{}", Table::new(rows));
            println!(
                "  page {}/{} ({} jobs)",
                result.meta.page, result.meta.total_pages, result.meta.total
            );
        }

        JobCommand::Mine { mechanic } => {
            let result: MechanicJobs = client
                .call("job.list_for_mechanic.v1", json!({ "mechanic_id": mechanic }))
                .await?;
            if result.jobs.is_empty() {
                println!("{}", "No jobs found".yellow());
                return Ok(());
            }
            let rows: Vec<JobRow> = result.jobs.iter().map(JobRow::from).collect();
            println!("{}", Table::new(rows));
        }
    }
    Ok(())
}

async fn run_task(client: &RpcClient, command: TaskCommand) -> Result<()> {
    match command {
        TaskCommand::Create {
            job,
            pickup_lat,
            pickup_lon,
            pickup_address,
            delivery_lat,
            delivery_lon,
            delivery_address,
            runner,
            notes,
        } => {
            let params = json!({
                "job_id": job,
                "pickup": {
                    "latitude": pickup_lat,
                    "longitude": pickup_lon,
                    "address": pickup_address,
                },
                "delivery": {
                    "latitude": delivery_lat,
                    "longitude": delivery_lon,
                    "address": delivery_address,
                },
                "runner_id": runner,
                "notes": notes,
            });

            let task: RunnerTask = client.call("runner.task.create.v1", params).await?;
            println!("{}", format!("✓ Task {} created", task.id).green().bold());
            println!();
            println!("{}", Table::new([TaskRow::from(&task)]));
        }

        TaskCommand::Advance {
            task_id,
            status,
            actor,
        } => {
            let mut params = actor.params();
            params["task_id"] = json!(task_id);
            params["status"] = json!(status.to_uppercase());

            let task: RunnerTask = client.call("runner.task.advance.v1", params).await?;
            println!(
                "✓ Task {} is now {}",
                task.id.bold(),
                view::status(&task.status)
            );
        }

        TaskCommand::Get { task_id } => {
            let task: RunnerTask = client
                .call("runner.task.get.v1", json!({ "task_id": task_id }))
                .await?;
            println!("{}", Table::new([TaskRow::from(&task)]));
        }

        TaskCommand::History { task_id } => {
            let history: TaskHistory = client
                .call("runner.task.history.v1", json!({ "task_id": task_id }))
                .await?;
            let rows: Vec<HistoryRow> = history.entries.iter().map(HistoryRow::from).collect();
            println!("{}", format!("History of task {}", task_id).cyan().bold());
            println!("{}", Table::new(rows));
        }

        TaskCommand::List { runner } => {
            let list: TaskList = client
                .call("runner.task.list.v1", json!({ "runner_id": runner }))
                .await?;
            if list.tasks.is_empty() {
                println!("{}", "No tasks found".yellow());
                return Ok(());
            }
            let rows: Vec<TaskRow> = list.tasks.iter().map(TaskRow::from).collect();
            println!("{}", Table::new(rows));
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = RpcClient::new(cli.rpc_url);

    match cli.command {
        Commands::Job { command } => run_job(&client, command).await,
        Commands::Task { command } => run_task(&client, command).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_actor_params() {
        let system = ActorArgs {
            actor: None,
            reason: None,
        };
        assert_eq!(system.params()["actor_kind"], "SYSTEM");

        let user = ActorArgs {
            actor: Some("R1".to_string()),
            reason: Some("flat tire".to_string()),
        };
        let params = user.params();
        assert_eq!(params["actor_kind"], "USER");
        assert_eq!(params["actor_id"], "R1");
        assert_eq!(params["reason"], "flat tire");
    }

    #[test]
    fn test_parse_mechanic_jobs() {
        let cli = Cli::try_parse_from(["fleetsure", "job", "mine", "--mechanic", "M9"]).unwrap();
        match cli.command {
            Commands::Job {
                command: JobCommand::Mine { mechanic },
            } => assert_eq!(mechanic, "M9"),
            _ => panic!("expected job mine"),
        }
    }

    #[test]
    fn test_parse_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "fleetsure", "job", "create", "--fleet", "F1", "--vehicle", "V1", "--lat", "47.6",
            "--lon", "-122.3", "--address", "I-5 N mile 165", "--city", "Seattle", "--state",
            "WA", "--issue-type", "engine",
        ])
        .unwrap();
        match cli.command {
            Commands::Job {
                command: JobCommand::Create { lon, urgency, .. },
            } => {
                assert_eq!(lon, -122.3);
                assert_eq!(urgency, "STANDARD");
            }
            _ => panic!("expected job create"),
        }
    }
}
