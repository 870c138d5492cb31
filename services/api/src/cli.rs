use crate::demo::{run_demo, run_list_scenarios, run_score, DemoArgs, ScoreArgs};
use crate::server;
use casesim::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Clinical Case Simulator",
    about = "Serve, score and demo the fictional clinical case simulator from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// List the loaded scenarios
    Scenarios,
    /// Score a recorded submission offline and print the report
    Score(ScoreArgs),
    /// Walk a scripted student through a scenario and print every resolution
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Scenarios => run_list_scenarios(),
        Command::Score(args) => run_score(args),
        Command::Demo(args) => run_demo(args),
    }
}
