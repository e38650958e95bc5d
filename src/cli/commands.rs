use clap::{Parser, Subcommand};
use crate::cascade::{CascadeResult, CompletionEngine};
use crate::cli::error::{parse_deal_type, parse_priority, parse_task_status, user_error, validate_non_empty};
use crate::cli::output::{format_cascade_result, format_deal, format_resync_report, format_task_line};
use crate::config::Config;
use crate::models::{Deal, DealType, Stage, Task, TaskPriority, TaskStatus};
use crate::store::{SqliteStore, Store};
use crate::utils::parse_date_expr;
use anyhow::{Context, Result};

#[derive(Parser)]
#[command(name = "dealflow")]
#[command(about = "Stage and deal completion propagation for rental and builder pipelines")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Task commands
    Task {
        #[command(subcommand)]
        subcommand: TaskCommands,
    },
    /// Deal commands
    Deal {
        #[command(subcommand)]
        subcommand: DealCommands,
    },
    /// Stage commands
    Stage {
        #[command(subcommand)]
        subcommand: StageCommands,
    },
    /// Assign a task to a stage
    Assign {
        #[arg(value_parser = parse_deal_type)]
        deal_type: DealType,
        stage_id: String,
        task_id: String,
        /// Team member responsible for the task on this stage
        #[arg(long)]
        member: Option<String>,
    },
    /// Remove a stage assignment by its numeric id
    Unassign {
        #[arg(value_parser = parse_deal_type)]
        deal_type: DealType,
        assignment_id: i64,
    },
    /// Run the completion cascade for a task
    Complete {
        task_id: String,
        #[arg(long)]
        json: bool,
    },
    /// Run the reopen cascade for a task
    Reopen {
        task_id: String,
        #[arg(long)]
        json: bool,
    },
    /// Mirror a task's status onto its stages
    Sync {
        task_id: String,
        #[arg(long)]
        json: bool,
    },
    /// Re-project every completed task onto its stages
    Resync {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Add a new task
    Add {
        title: String,
        #[arg(long, value_parser = parse_priority)]
        priority: Option<TaskPriority>,
        /// Due date (YYYY-MM-DD, today, tomorrow)
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        project: Option<String>,
    },
    /// Set a task's status and propagate it to stages and deals
    Status {
        task_id: String,
        #[arg(value_parser = parse_task_status)]
        status: TaskStatus,
        #[arg(long)]
        json: bool,
    },
    /// List tasks
    List,
    /// Delete a task
    Delete { task_id: String },
}

#[derive(Subcommand)]
pub enum DealCommands {
    /// Create a deal
    Add {
        #[arg(value_parser = parse_deal_type)]
        deal_type: DealType,
        title: String,
    },
    /// Show a deal and its stages
    Show {
        #[arg(value_parser = parse_deal_type)]
        deal_type: DealType,
        deal_id: String,
    },
    /// List deals of one taxonomy
    List {
        #[arg(value_parser = parse_deal_type)]
        deal_type: DealType,
    },
}

#[derive(Subcommand)]
pub enum StageCommands {
    /// Add a stage to a deal
    Add {
        #[arg(value_parser = parse_deal_type)]
        deal_type: DealType,
        deal_id: String,
        name: String,
        /// Position in the pipeline
        #[arg(long, default_value_t = 0)]
        order: i64,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    let env = env_logger::Env::default().default_filter_or(config.log_level.as_str());
    let _ = env_logger::Builder::from_env(env).try_init();

    let store = SqliteStore::open(&config)?;
    handle_command(&store, cli.command)
}

fn handle_command(store: &SqliteStore, command: Commands) -> Result<()> {
    match command {
        Commands::Task { subcommand } => handle_task(store, subcommand),
        Commands::Deal { subcommand } => handle_deal(store, subcommand),
        Commands::Stage { subcommand } => handle_stage(store, subcommand),
        Commands::Assign { deal_type, stage_id, task_id, member } => {
            handle_assign(store, deal_type, &stage_id, &task_id, member.as_deref())
        }
        Commands::Unassign { deal_type, assignment_id } => {
            if !store.delete_assignment(deal_type, assignment_id)? {
                user_error(&format!("Assignment {} not found in {} stages", assignment_id, deal_type));
            }
            println!("Removed assignment {}", assignment_id);
            Ok(())
        }
        Commands::Complete { task_id, json } => {
            require_task(store, &task_id)?;
            let result = CompletionEngine::new(store).handle_task_completion(&task_id);
            print_result("complete", &result, json)
        }
        Commands::Reopen { task_id, json } => {
            require_task(store, &task_id)?;
            let result = CompletionEngine::new(store).handle_task_reopening(&task_id);
            print_result("reopen", &result, json)
        }
        Commands::Sync { task_id, json } => {
            require_task(store, &task_id)?;
            let result = CompletionEngine::new(store).sync_task_status_with_stage(&task_id);
            print_result("sync", &result, json)
        }
        Commands::Resync { json } => {
            let report = CompletionEngine::new(store).sync_all_completed_tasks_with_stages();
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", format_resync_report(&report));
            }
            Ok(())
        }
    }
}

fn require_task(store: &SqliteStore, task_id: &str) -> Result<Task> {
    match store.get_task(task_id)? {
        Some(task) => Ok(task),
        None => user_error(&format!("Task {} not found", task_id)),
    }
}

fn print_result(label: &str, result: &CascadeResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        println!("{}", format_cascade_result(label, result));
    }
    Ok(())
}

fn handle_task(store: &SqliteStore, cmd: TaskCommands) -> Result<()> {
    match cmd {
        TaskCommands::Add { title, priority, due, project } => {
            if let Err(e) = validate_non_empty(&title, "Task title") {
                user_error(&e);
            }
            let mut task = Task::new(title.trim().to_string());
            if let Some(priority) = priority {
                task.priority = priority;
            }
            if let Some(due) = due {
                task.due_date = Some(parse_date_expr(&due).unwrap_or_else(|e| user_error(&e.to_string())));
            }
            task.project_id = project;
            store.insert_task(&task).context("Failed to create task")?;
            println!("Created task {}", task.id);
            Ok(())
        }
        TaskCommands::Status { task_id, status, json } => {
            let engine = CompletionEngine::new(store);
            match engine.apply_task_status(&task_id, status)? {
                Some(result) => {
                    let label = if status.is_completed() { "complete" } else { "reopen" };
                    print_result(label, &result, json)
                }
                None => user_error(&format!("Task {} not found", task_id)),
            }
        }
        TaskCommands::List => {
            let tasks = store.list_tasks()?;
            if tasks.is_empty() {
                println!("No tasks.");
            }
            for task in &tasks {
                println!("{}", format_task_line(task));
            }
            Ok(())
        }
        TaskCommands::Delete { task_id } => {
            if !store.delete_task(&task_id)? {
                user_error(&format!("Task {} not found", task_id));
            }
            println!("Deleted task {}", task_id);
            Ok(())
        }
    }
}

fn handle_deal(store: &SqliteStore, cmd: DealCommands) -> Result<()> {
    match cmd {
        DealCommands::Add { deal_type, title } => {
            if let Err(e) = validate_non_empty(&title, "Deal title") {
                user_error(&e);
            }
            let deal = Deal::new(title.trim());
            store.insert_deal(deal_type, &deal).context("Failed to create deal")?;
            println!("Created {} deal {}", deal_type, deal.id);
            Ok(())
        }
        DealCommands::Show { deal_type, deal_id } => {
            let deal = match store.get_deal(deal_type, &deal_id)? {
                Some(deal) => deal,
                None => user_error(&format!("{} deal {} not found", deal_type, deal_id)),
            };
            let mut stages = Vec::new();
            for stage in store.list_stages_by_deal(deal_type, &deal_id)? {
                let task_count = store
                    .list_assignments_by_stage(deal_type, &stage.id)?
                    .iter()
                    .filter(|a| a.task_id.is_some())
                    .count();
                stages.push((stage, task_count));
            }
            print!("{}", format_deal(deal_type, &deal, &stages));
            Ok(())
        }
        DealCommands::List { deal_type } => {
            let deals = store.list_deals(deal_type)?;
            if deals.is_empty() {
                println!("No {} deals.", deal_type);
            }
            for deal in &deals {
                println!("{}  {:<12} {}", deal.id, deal.status.as_str(), deal.title);
            }
            Ok(())
        }
    }
}

fn handle_stage(store: &SqliteStore, cmd: StageCommands) -> Result<()> {
    match cmd {
        StageCommands::Add { deal_type, deal_id, name, order } => {
            if let Err(e) = validate_non_empty(&name, "Stage name") {
                user_error(&e);
            }
            if store.get_deal(deal_type, &deal_id)?.is_none() {
                user_error(&format!("{} deal {} not found", deal_type, deal_id));
            }
            let stage = Stage::new(&deal_id, name.trim(), order);
            store.insert_stage(deal_type, &stage).context("Failed to create stage")?;
            println!("Created {} stage {}", deal_type, stage.id);
            Ok(())
        }
    }
}

fn handle_assign(
    store: &SqliteStore,
    deal_type: DealType,
    stage_id: &str,
    task_id: &str,
    member: Option<&str>,
) -> Result<()> {
    if store.get_stage(deal_type, stage_id)?.is_none() {
        user_error(&format!("{} stage {} not found", deal_type, stage_id));
    }
    require_task(store, task_id)?;
    let assignment = store
        .insert_assignment(deal_type, stage_id, Some(task_id), member)
        .context("Failed to assign task")?;
    println!("Assigned task {} to {} stage {} (assignment {})", task_id, deal_type, stage_id, assignment.id);
    Ok(())
}
