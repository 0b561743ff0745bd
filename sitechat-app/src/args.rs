use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "sitechat", version, about = "Crawl a site and answer questions about it")]
pub struct Args {
    /// YAML config file. Without it, `sitechat.yaml` is read when present.
    #[arg(long, env = "SITECHAT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Listen address, overriding `server.bind`.
    #[arg(long)]
    pub bind: Option<String>,
}
