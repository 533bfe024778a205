use clap::Parser;
use gbr2stencil::{convert, output_path, StencilOptions};
use log::info;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "gbr2stencil",
    about = "Turn a Gerber paste layer into a G-code program that drills a solder paste stencil"
)]
struct Cli {
    /// Input Gerber file (a name containing `-B.` is treated as the bottom side)
    input: PathBuf,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let opts = StencilOptions::for_input(&cli.input);
    if opts.mirror_x {
        info!("creating stencil for bottom side");
    } else {
        info!("creating stencil for top side");
    }
    info!("writing to {}", output_path(&cli.input).display());

    match convert(&cli.input, &opts) {
        Ok(written) => {
            eprintln!("Written to {}", written.display());
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
