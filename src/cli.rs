use clap::Parser;

#[derive(Parser)]
#[command(
    name = "loomx",
    about = "Loom transcript extractor",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    /// Loom share URL, e.g. https://www.loom.com/share/<video-id>
    pub url: Option<String>,

    /// Show video metadata and config details on stderr
    #[arg(short, long)]
    pub verbose: bool,
}
