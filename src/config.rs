// Run configuration: command-line options (with environment fallbacks) and
// the immutable `Config` value built from them.

use crate::api::DEFAULT_API_URL;
use crate::error::{Error, Result};
use crate::retry::{RetryPolicy, DEFAULT_ATTEMPTS};
use crate::ui::OnFailure;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "bmp", "tiff"];
const TOKEN_FILE: &str = ".disk_uploader_token";

/// Upload an image tree to cloud storage, publish every file and record the
/// public links in a JSON file.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// Local directory to upload, walked recursively
    #[arg(long)]
    pub root: PathBuf,

    /// Remote folder that mirrors the local root, e.g. "/Опоры трубопроводов"
    #[arg(long)]
    pub remote_base: String,

    /// JSON file mapping file names to public links
    #[arg(long, default_value = "uploaded_files.json")]
    pub output: PathBuf,

    /// Allowed file extension (repeatable); defaults to common image types
    #[arg(long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Only upload files whose name contains this text (case-insensitive)
    #[arg(long, default_value = "")]
    pub filter: String,

    /// OAuth token; falls back to ~/.disk_uploader_token
    #[arg(long, env = "DISK_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[arg(long, env = "DISK_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Attempts per remote operation
    #[arg(long, default_value_t = DEFAULT_ATTEMPTS)]
    pub attempts: u32,

    /// Seconds to wait between attempts
    #[arg(long, default_value_t = 2.0)]
    pub delay_secs: f64,

    /// What to do when a file cannot be uploaded
    #[arg(long, value_enum, default_value_t = OnFailure::Ask)]
    pub on_failure: OnFailure,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub api_url: String,
    pub root: PathBuf,
    pub remote_base: String,
    pub output: PathBuf,
    /// Lowercased, without the leading dot.
    pub extensions: Vec<String>,
    pub name_filter: String,
    pub retry: RetryPolicy,
    pub on_failure: OnFailure,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let token = match cli.token.filter(|t| !t.trim().is_empty()) {
            Some(t) => t.trim().to_string(),
            None => load_token()?,
        };
        if !cli.delay_secs.is_finite() || cli.delay_secs < 0.0 {
            return Err(Error::Config(format!("invalid retry delay: {}", cli.delay_secs)));
        }
        Ok(Config {
            token,
            api_url: cli.api_url,
            root: cli.root,
            remote_base: cli.remote_base,
            output: cli.output,
            extensions: normalize_extensions(&cli.extensions),
            name_filter: cli.filter,
            retry: RetryPolicy::new(cli.attempts, Duration::from_secs_f64(cli.delay_secs)),
            on_failure: cli.on_failure,
        })
    }
}

/// `.JPG`, `jpg` and ` Jpg ` all become `jpg`; an empty list means the defaults.
pub fn normalize_extensions(raw: &[String]) -> Vec<String> {
    let exts: Vec<String> = raw
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_lowercase())
        .filter(|e| !e.is_empty())
        .collect();
    if exts.is_empty() {
        DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
    } else {
        exts
    }
}

/// Load the token from the user's home directory file.
fn load_token() -> Result<String> {
    let dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    let path = dir.join(TOKEN_FILE);
    let data = std::fs::read_to_string(&path).map_err(|e| {
        Error::Config(format!(
            "no access token: pass --token, set DISK_TOKEN or create {} ({e})",
            path.display()
        ))
    })?;
    let token = data.trim();
    if token.is_empty() {
        return Err(Error::Config(format!("{} is empty", path.display())));
    }
    Ok(token.to_string())
}
