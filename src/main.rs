use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use log::{debug, info};
use tokio::io::{self, AsyncBufReadExt, BufReader};

use lp_workbench::convert::problem_to_model;
use lp_workbench::models::ProblemFile;
use lp_workbench::render::render_view;
use lp_workbench::session::SOLVING_STATUS;
use lp_workbench::shell::{describe_model, Command, HELP};
use lp_workbench::{ClientError, Config, HandleRegistry, Result, Session, SolveMethod, SolverClient};

#[derive(Parser)]
#[command(name = "lp-workbench")]
#[command(about = "Build linear programs and inspect what the solver returns", long_about = None)]
struct Cli {
    /// Solver base URL (overrides SOLVER_URL)
    #[arg(long, global = true)]
    url: Option<String>,
    /// Solve method (overrides SOLVE_METHOD and the problem file)
    #[arg(short, long, global = true)]
    method: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a problem file and print the result
    Solve {
        /// JSON problem file
        file: PathBuf,
        /// Select this branch-and-bound node before printing
        #[arg(long)]
        select: Option<String>,
        /// Write the returned graph to this path
        #[arg(long)]
        save_graph: Option<PathBuf>,
    },
    /// Edit and solve a model interactively
    Shell,
}

fn save_graph(session: &Session<HandleRegistry>, path: &Path) -> Result<()> {
    match session.artifact_bytes() {
        Some(bytes) => {
            std::fs::write(path, bytes)?;
            info!("wrote {} bytes to {}", bytes.len(), path.display());
            Ok(())
        }
        None => Err(ClientError::InvalidProblem(
            "the current result has no graph".to_string(),
        )),
    }
}

async fn run_solve(
    client: &SolverClient,
    mut session: Session<HandleRegistry>,
    file: &Path,
    method_override: Option<SolveMethod>,
    select: Option<String>,
    graph_path: Option<PathBuf>,
) -> Result<()> {
    let source = std::fs::read_to_string(file)?;
    let problem: ProblemFile =
        serde_json::from_str(&source).map_err(|e| ClientError::InvalidProblem(e.to_string()))?;

    let file_method = match problem.method.as_deref() {
        Some(name) => Some(name.parse::<SolveMethod>()?),
        None => None,
    };
    if let Some(method) = method_override.or(file_method) {
        session.set_method(method);
    }
    *session.model_mut() = problem_to_model(problem)?;

    session.solve(client).await;
    if let Some(id) = select {
        if !session.select_node(&id) {
            eprintln!("no node {} in the decision tree", id);
        }
    }
    println!("{}", render_view(&session.view()));

    if let Some(path) = graph_path {
        save_graph(&session, &path)?;
    }
    Ok(())
}

async fn apply(
    client: &SolverClient,
    session: &mut Session<HandleRegistry>,
    command: Command,
) -> Result<()> {
    match command {
        Command::Sense(sense) => session.model_mut().set_objective_sense(sense),
        Command::AddVariable => session.model_mut().add_variable(),
        Command::AddConstraint => session.model_mut().add_constraint(),
        Command::Set { row, col, value } => {
            if !session.model_mut().set_coefficient(row, col, value.as_str()) {
                println!("no such cell");
            }
        }
        Command::Sign { row, relation } => {
            if !session.model_mut().set_relation(row, relation) {
                println!("no such constraint");
            }
        }
        Command::Rhs { row, value } => {
            if !session.model_mut().set_rhs(row, value.as_str()) {
                println!("no such constraint");
            }
        }
        Command::Method(method) => {
            session.set_method(method);
            println!("method: {}", method);
        }
        Command::Solve => {
            println!("{}", SOLVING_STATUS);
            session.solve(client).await;
            println!("{}", render_view(&session.view()));
        }
        Command::Select(id) => {
            if session.select_node(&id) {
                println!("{}", render_view(&session.view()));
            } else {
                println!("no node {} in the decision tree", id);
            }
        }
        Command::Replay => match session.replay_artifact().await {
            Some(handle) => println!("graph restarted at {}", handle.url),
            None => println!("no graph to replay"),
        },
        Command::SaveGraph(path) => save_graph(session, &path)?,
        Command::Show => {
            for line in describe_model(session.model()) {
                println!("{}", line);
            }
            println!("method: {}", session.method());
            println!("{}", render_view(&session.view()));
        }
        Command::Reset => session.reset(),
        Command::Help => println!("{}", HELP),
        Command::Quit => {}
    }
    Ok(())
}

async fn run_shell(client: &SolverClient, mut session: Session<HandleRegistry>) -> Result<()> {
    println!("{}", describe_model(session.model()).join("\n"));
    println!("type help for commands");

    let mut lines = BufReader::new(io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match Command::parse(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => {
                debug!("shell command: {:?}", command);
                if let Err(e) = apply(client, &mut session, command).await {
                    println!("{}", e.status_line());
                }
            }
            Err(message) => println!("{}", message),
        }
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::from_env();
    if let Some(url) = cli.url {
        config.solver_url = url;
    }
    let method_override = match cli.method.as_deref() {
        Some(name) => Some(name.parse::<SolveMethod>()?),
        None => None,
    };
    if let Some(method) = method_override {
        config.method = method;
    }

    info!("using solver at {}", config.solver_url);
    let client = SolverClient::with_timeout(&config.solver_url, config.timeout)?;
    let session = Session::with_config(HandleRegistry::new(), &config);

    match cli.command {
        Commands::Solve {
            file,
            select,
            save_graph,
        } => run_solve(&client, session, &file, method_override, select, save_graph).await,
        Commands::Shell => run_shell(&client, session).await,
    }
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("{}", e.status_line());
        process::exit(1);
    }
}
