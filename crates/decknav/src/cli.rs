use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::StartMode;

#[derive(Parser)]
#[command(name = "decknav")]
#[command(author, version, about)]
#[command(long_about = "Present a markdown slide deck with keyboard navigation.\n\n\
    Slides scroll in a window; press F to present one slide at a time in fullscreen.\n\n\
    Examples:\n  \
    decknav talk.md                Open the deck in a window\n  \
    decknav talk.md --fullscreen   Start presenting in fullscreen\n  \
    decknav config show            Show configuration")]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Markdown file to present
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Open in a window (the default unless configured otherwise)
    #[arg(long, conflicts_with = "fullscreen")]
    pub windowed: bool,

    /// Start in fullscreen presentation mode
    #[arg(long)]
    pub fullscreen: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (defaults.theme, defaults.start_mode)
        key: String,

        /// Value to set
        value: String,
    },
}

#[derive(Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

impl Cli {
    /// Start mode requested on the command line, if any.
    pub fn start_mode(&self) -> Option<StartMode> {
        if self.fullscreen {
            Some(StartMode::Fullscreen)
        } else if self.windowed {
            Some(StartMode::Windowed)
        } else {
            None
        }
    }

    pub fn run(self) -> anyhow::Result<()> {
        let start_mode = self.start_mode();
        match self.command {
            Some(Commands::Config { command }) => crate::commands::config::run(command),
            Some(Commands::Completion { shell }) => {
                crate::commands::completion::run(shell);
                Ok(())
            }
            Some(Commands::Version) => {
                println!("decknav {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
            None => {
                if let Some(file) = self.file {
                    if !file.exists() {
                        anyhow::bail!("File not found: {}", file.display());
                    }
                    crate::app::run(file, start_mode)
                } else {
                    use clap::CommandFactory;
                    let mut cmd = Self::command();
                    cmd.print_help()?;
                    println!();
                    Ok(())
                }
            }
        }
    }
}
