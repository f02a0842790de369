use crate::demo::{run_demo, run_score_enem, run_score_pas, DemoArgs, EnemScoreArgs, PasScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use essay_flow::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Essay Grading Service",
    about = "Demonstrate and run the essay grading service from the command line",
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
    /// Preview a rubric score without touching any stored essay
    Score {
        #[command(subcommand)]
        command: ScoreCommand,
    },
    /// Run an end-to-end CLI demo covering the grading lifecycle
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum ScoreCommand {
    /// Score ENEM competency bands
    Enem(EnemScoreArgs),
    /// Score PAS rubric inputs
    Pas(PasScoreArgs),
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
        Command::Score {
            command: ScoreCommand::Enem(args),
        } => run_score_enem(args),
        Command::Score {
            command: ScoreCommand::Pas(args),
        } => run_score_pas(args),
        Command::Demo(args) => run_demo(args),
    }
}
