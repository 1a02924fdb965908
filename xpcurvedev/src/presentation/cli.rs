use clap::Parser;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Regenerate the addon's experience table from the current game build",
    long_about = None
)]
pub struct Cli {
    /// Run even when the recorded build matches the current one
    #[arg(long)]
    pub force: bool,
}
