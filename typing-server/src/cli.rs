//! Command-line interface.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use typing_core::TypingParams;

/// Default port for the typing server.
pub const DEFAULT_PORT: u16 = 8080;
/// Default `max-age` of rendered cards, in seconds.
pub const DEFAULT_CACHE_MAX_AGE: u64 = 3600;

/// Command-line arguments for typing-svg.
#[derive(Debug, Clone, Parser)]
#[command(name = "typing-svg")]
#[command(about = "Animated typing SVG cards")]
#[command(version)]
pub struct Cli {
    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Serve cards over HTTP
    Serve(ServeArgs),
    /// Render a single card to a file or stdout
    Render(RenderArgs),
}

/// Arguments of `typing-svg serve`.
#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, env = "TYPING_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Address to bind
    #[arg(long, env = "TYPING_HOST", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub host: IpAddr,

    /// `Cache-Control` max-age for rendered cards, in seconds
    #[arg(long, env = "TYPING_CACHE_MAX_AGE", default_value_t = DEFAULT_CACHE_MAX_AGE)]
    pub cache_max_age: u64,
}

impl ServeArgs {
    /// Socket address to bind.
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Arguments of `typing-svg render`.
#[derive(Debug, Clone, Args)]
pub struct RenderArgs {
    /// Semicolon-separated lines to type
    #[arg(long)]
    pub lines: Option<String>,

    /// Loop the animation forever
    #[arg(long = "loop")]
    pub looped: bool,

    /// Any other card parameter, as `key=value` (repeatable)
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,

    /// Seed for the particle field, for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl RenderArgs {
    /// Card parameters. Dedicated flags take precedence over `--param`.
    #[must_use]
    pub fn typing_params(&self) -> TypingParams {
        let mut params = TypingParams::new();
        if let Some(lines) = &self.lines {
            params = params.with("lines", lines.as_str());
        }
        if self.looped {
            params = params.with("loop", "true");
        }
        self.params
            .iter()
            .fold(params, |params, (key, value)| params.with(key.as_str(), value.as_str()))
    }
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))
}
