use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use kumitate_core::{Cell, EdgeMap, EngineConfig, Grid, PieceOutline, PuzzleSpec, Session};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

mod bot;

#[derive(Parser)]
#[command(name = "kumitate-cli", version, about = "Developer tools for the kumitate puzzle engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct PuzzleArgs {
    #[arg(long, default_value_t = 1)]
    puzzle_id: u32,
    #[arg(long, default_value_t = 9)]
    pieces: u32,
    #[arg(long, default_value = "")]
    image: String,
    /// TOML engine config; defaults apply to anything it leaves out.
    #[arg(long, env = "KUMITATE_CONFIG")]
    config: Option<PathBuf>,
}

impl PuzzleArgs {
    fn spec(&self) -> PuzzleSpec {
        PuzzleSpec {
            id: self.puzzle_id,
            piece_count: self.pieces,
            image_ref: self.image.clone(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Dump every interior edge curve as JSON.
    Edges {
        #[command(flatten)]
        puzzle: PuzzleArgs,
    },
    /// Print the SVG path of one piece in piece-local coordinates.
    Outline {
        #[command(flatten)]
        puzzle: PuzzleArgs,
        #[arg(long)]
        row: u32,
        #[arg(long)]
        col: u32,
    },
    /// Let an automated player assemble the puzzle and print the result.
    Solve {
        #[command(flatten)]
        puzzle: PuzzleArgs,
        #[arg(long)]
        seed: Option<u64>,
        #[command(flatten)]
        player: bot::PlayerArgs,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Edges { puzzle } => {
            let config = load_config(puzzle.config.as_deref())?;
            let grid = Grid::from_spec(&puzzle.spec())?;
            let edges = EdgeMap::generate(puzzle.puzzle_id, grid, &config.shape);
            println!("{}", serde_json::to_string_pretty(&edges)?);
        }
        Commands::Outline { puzzle, row, col } => {
            let config = load_config(puzzle.config.as_deref())?;
            let grid = Grid::from_spec(&puzzle.spec())?;
            if row >= grid.size || col >= grid.size {
                return Err(err_msg(&format!(
                    "cell ({row}, {col}) is outside the {0}x{0} grid",
                    grid.size
                )));
            }
            let edges = EdgeMap::generate(puzzle.puzzle_id, grid, &config.shape);
            let outline = PieceOutline::build(&edges, Cell::new(row, col), config.snap.unit);
            println!("{}", outline.to_svg_path());
        }
        Commands::Solve {
            puzzle,
            seed,
            player,
        } => {
            let config = load_config(puzzle.config.as_deref())?;
            let seed = seed.unwrap_or_else(|| rand::rng().random());
            let mut rng = StdRng::seed_from_u64(seed);
            let session = Session::new(puzzle.spec(), config, &mut rng)?;
            tracing::info!(seed, puzzle_id = puzzle.puzzle_id, pieces = puzzle.pieces, "solve started");
            let event = bot::run(session, player, &mut rng).await?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let contents = std::fs::read_to_string(path)?;
    Ok(EngineConfig::from_toml_str(&contents)?)
}

fn err_msg(message: &str) -> Box<dyn std::error::Error> {
    message.to_string().into()
}
