use clap::Parser;
use colored::Colorize;

use decknav::cli::Cli;

fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }
    decknav::logging::init(cli.verbose, cli.quiet, cli.no_color);

    if let Err(err) = cli.run() {
        eprintln!("{} {err:#}", "error:".red().bold());
        std::process::exit(1);
    }
}
