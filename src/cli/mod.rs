//! Command-line interface for recognizing files and saving the results as JSON.

use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow, bail};
use clap::Parser;

use crate::client::SightClient;
use crate::config::{ClientConfig, DEFAULT_ENDPOINT, RecognitionConfig};
use crate::types::PollOutcome;

mod output;

pub use output::{PagesWriter, Progress, create_output, save_rotated_image};

/// Length of a well-formed API key (`xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx`)
const API_KEY_LEN: usize = 36;

const API_KEY_PROMPT: &str = "enter your Sight API key: ";

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "sight")]
#[command(about = "Recognize text in images and documents with the Sight API")]
#[command(version)]
pub struct Cli {
    /// Images or documents to recognize (.bmp, .gif, .pdf, .png, .jpg, .jpeg)
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// File that will contain the recognized text as JSON
    #[arg(short, long)]
    pub output: PathBuf,

    /// Read the API key from a file containing it on a single line
    #[arg(long, conflicts_with = "prompt_api_key")]
    pub api_key_file: Option<PathBuf>,

    /// Prompt for the API key on the terminal without echoing it
    #[arg(long)]
    pub prompt_api_key: bool,

    /// API key
    #[arg(long, env = "SIGHT_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Return word-level bounding boxes instead of sentence-level ones
    #[arg(short, long)]
    pub words: bool,

    /// Use EXIF orientation for the bounding box coordinate system
    #[arg(short = 'e', long)]
    pub obey_exif: bool,

    /// Return and save the input images rotated so most text is upright
    #[arg(short = 'r', long)]
    pub auto_rotate: bool,

    /// Comma-separated scripts to recognize (e.g. latin,thai,cyrillic);
    /// see https://siftrics.com/docs/sight.html for the full list of codes
    #[arg(short = 's', long, value_delimiter = ',')]
    pub script_hints: Vec<String>,

    /// Ask the service to process the batch asynchronously
    #[arg(long = "async")]
    pub do_async: bool,

    /// Directory where auto-rotated images are saved
    #[arg(long, default_value = ".")]
    pub rotated_dir: PathBuf,

    /// Sight API endpoint
    #[arg(long, env = "SIGHT_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Recognition flags selected on the command line
    pub fn recognition_config(&self) -> RecognitionConfig {
        RecognitionConfig {
            make_sentences: !self.words,
            do_exif_rotate: self.obey_exif,
            do_auto_rotate: self.auto_rotate,
            do_async: self.do_async,
            script_hints: self.script_hints.clone(),
        }
    }

    /// Resolve the API key from the file, the prompt, or the flag/environment
    pub fn resolve_api_key(&self) -> anyhow::Result<String> {
        let (raw, origin) = if let Some(path) = &self.api_key_file {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read API key file {}", path.display()))?;
            (raw, Some(path.as_path()))
        } else if self.prompt_api_key {
            (prompt_api_key()?, None)
        } else if let Some(key) = &self.api_key {
            (key.clone(), None)
        } else {
            bail!("you must specify --api-key-file <filename>, --prompt-api-key, or set SIGHT_API_KEY");
        };
        validate_api_key(&raw, origin)
    }
}

fn prompt_api_key() -> anyhow::Result<String> {
    rpassword::prompt_password(API_KEY_PROMPT).context("failed to read API key from the terminal")
}

/// Trim the key and check that it looks like `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx`
pub fn validate_api_key(raw: &str, origin: Option<&Path>) -> anyhow::Result<String> {
    let key = raw.trim();
    if key.len() != API_KEY_LEN {
        let mut message = String::from(
            "the provided API key is not valid\nAPI keys should look like xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx",
        );
        if let Some(path) = origin {
            message.push_str(&format!(
                "\nyou specified to read the API key from the file {}",
                path.display()
            ));
        }
        return Err(anyhow!(message));
    }
    Ok(key.to_string())
}

/// Run the tool: upload, stream pages into the output file, report progress
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let api_key = cli.resolve_api_key()?;
    let client = SightClient::with_config(
        api_key,
        ClientConfig {
            endpoint: cli.endpoint.clone(),
            ..Default::default()
        },
    )?;

    let output = create_output(&cli.output)
        .with_context(|| format!("failed to create {}", cli.output.display()))?;
    let mut writer = PagesWriter::new(output)?;

    println!("Uploading files...");
    let mut pages = client
        .recognize_with(&cli.recognition_config(), &cli.inputs)
        .await?;

    let mut progress = Progress::new(cli.inputs.len());
    while let Some(page) = pages.next_page().await {
        let source = page.file_position().and_then(|index| cli.inputs.get(index));
        if let (Some(image), Some(source)) = (&page.rotated_image, source) {
            match save_rotated_image(&cli.rotated_dir, source, image) {
                Ok(dest) => println!(
                    "Saving auto-rotated {} to {}.",
                    source.display(),
                    dest.display()
                ),
                Err(e) => eprintln!(
                    "error: failed to save auto-rotated {}: {e}",
                    source.display()
                ),
            }
        }

        writer.write_page(&page)?;

        if let Some(done) = progress.observe(&page) {
            println!(
                "{done} out of {} input files are complete",
                progress.total_files()
            );
        }
    }
    writer.finish()?;

    match pages.finish().await {
        PollOutcome::Completed => Ok(()),
        PollOutcome::Failed(e) => {
            Err(anyhow!(e).context("recognition stopped before every page arrived"))
        }
        PollOutcome::Cancelled => bail!("recognition was cancelled"),
    }
}
