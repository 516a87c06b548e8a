mod bubbles;
mod data;
mod error;
mod graphics;
mod host;
mod math;
mod modes;

use clap::Parser;
use tracing::error;

use data::{args::Args, Program};

fn main() {
    let args = Args::parse();

    data::log::init(args.quiet);

    let result = Program::from_args(&args).and_then(modes::windowed_mode::winit_main);

    if let Err(e) = result {
        error!("{e}");
        std::process::exit(1);
    }
}
