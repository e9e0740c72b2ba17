//! Scacchiera console entry point.

use clap::Parser;
use scacchiera::GameOptions;
use tracing::{error, Level};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Stalemate handling: "continue" or "draw"
    #[arg(long, default_value = "continue")]
    stalemate: String,

    /// Accept moves without checking them against the legal-move set
    #[arg(long)]
    no_validate: bool,

    /// Log engine decisions at debug level (stderr)
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    let mut options = GameOptions::default();
    if let Err(e) = options.set_option("Stalemate", Some(&args.stalemate)) {
        error!("{}", e);
        std::process::exit(2);
    }
    options.validate_moves = !args.no_validate;

    // Run console main loop
    if let Err(e) = scacchiera::console::run_console(options) {
        error!("console loop failed: {:?}", e);
    }
}
