mod import;
mod options;
mod progress;
mod session;
mod sink;
mod tiles;

use anyhow::Result;
use clap::Parser;
use options::Cli;
use terrain::Topology;

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli {
        Cli::Grid(grid) => grid.import.run(Topology::Grid(grid.primitive)),
        Cli::Path(path) => path.import.run(Topology::Path),
        Cli::Tiles(tiles) => tiles.run(),
    }
}
