use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "slidepack", version)]
#[command(about = "Assemble images into slideshows and batch files into archives", long_about = None)]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Directory to write the artifact into
    #[arg(short, long, global = true, value_name = "DIR")]
    pub output: Option<PathBuf>,
    /// More log output; repeat for more
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build a slideshow with one full-bleed slide per image
    Slides {
        /// Images, or directories to take images from
        #[arg(required = true, value_name = "FILES")]
        files: Vec<PathBuf>,
        /// Title used when naming the presentation
        #[arg(long)]
        title: Option<String>,
        /// Archive the slide images instead of building a presentation
        #[arg(long, conflicts_with = "title")]
        to_archive: bool,
    },
    /// Pack files into a ZIP archive
    Archive {
        /// Files, or directories to take files from
        #[arg(required = true, value_name = "FILES")]
        files: Vec<PathBuf>,
    },
}
