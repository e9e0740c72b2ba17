use clap::Parser;
use scacchiera::{Board, Color};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 3)]
    depth: u32,
}

fn main() {
    let args = Args::parse();

    println!("Running perft on the initial position at depth {}", args.depth);

    let mut board = Board::standard();
    let start = std::time::Instant::now();
    let nodes = board.perft(args.depth, Color::White);
    let duration = start.elapsed();

    println!(
        "perft({}) = {} nodes ({} ms)",
        args.depth,
        nodes,
        duration.as_millis()
    );
}
