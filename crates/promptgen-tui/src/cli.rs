use std::path::PathBuf;

use clap::Parser;

/// Browse, search, fill and copy AI prompts kept in a YAML file.
///
/// Press '/' to search, Enter to view a prompt, 'c' to copy it as XML to the
/// clipboard and 'n' to create a new one.
#[derive(Parser, Debug)]
#[command(name = "promptgen", version)]
pub struct Cli {
    /// Path to the prompts YAML file
    /// [default: ./prompts.yaml or ~/.config/promptgen/prompts.yaml]
    #[arg(short, long, value_name = "PATH", env = "PROMPTGEN_FILE")]
    pub file: Option<PathBuf>,

    /// Disable colors (also honored via NO_COLOR)
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    pub fn wants_monochrome(&self) -> bool {
        self.no_color || no_color_env(std::env::var_os("NO_COLOR").as_deref())
    }
}

/// NO_COLOR counts when set to anything non-empty.
fn no_color_env(value: Option<&std::ffi::OsStr>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}
