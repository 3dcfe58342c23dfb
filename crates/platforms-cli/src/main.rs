use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use colored::*;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use inquire::Select;
use kakaotv_parser::extractor::default_factory;
use kakaotv_parser::media::StreamInfo;
use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The URL of the clip to extract, e.g. https://tv.kakao.com/v/477029600
    #[arg(short, long)]
    url: String,

    /// Qualities to resolve (pixel heights), e.g. 720,1080
    #[arg(long, value_delimiter = ',')]
    qualities: Option<Vec<u32>>,

    /// Quality to select without prompting
    #[arg(long)]
    quality: Option<u32>,

    /// Output the result in JSON format
    #[clap(long)]
    json: bool,

    /// Download the selected stream to this file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let extras = args
        .qualities
        .as_ref()
        .map(|qualities| serde_json::json!({ "qualities": qualities }));

    let pb = spinner("Extracting clip information...");
    let factory = default_factory();
    let extractor = factory
        .create_extractor(&args.url, extras)
        .with_context(|| format!("Failed to create extractor for URL: {}", &args.url))?;
    let media_info = extractor
        .extract()
        .await
        .context("Failed to fetch clip information")?;
    pb.finish_with_message("Done");

    debug!(streams = media_info.streams.len(), "clip resolved");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&media_info)?);
        return Ok(());
    }

    println!("\n{}", "Clip Information:".green().bold());
    println!("{} {}", "Channel:".green(), media_info.artist.cyan());
    println!("{} {}", "Title:".green(), media_info.title.cyan());
    if let Some(cover_url) = &media_info.cover_url {
        println!("{} {}", "Cover URL:".green(), cover_url.blue());
    }

    let selected = select_stream(&args, media_info.streams)?;
    let selected = extractor
        .get_url(selected)
        .await
        .context("Failed to resolve final stream URL")?;

    println!("\n{}", "Selected Stream:".green().bold());
    println!("  {}: {}", "Quality".yellow(), selected.quality.cyan());
    println!(
        "  {}: {}",
        "Format".yellow(),
        selected.format.to_string().cyan()
    );
    println!("  {}: {}", "URL".yellow(), selected.url.blue());

    if let Some(output) = &args.output {
        let client = extractor.get_extractor().client.clone();
        download(&client, &selected.url, output).await?;
        println!(
            "{} {}",
            "Saved to".green(),
            output.display().to_string().cyan()
        );
    }

    Ok(())
}

fn select_stream(args: &Args, streams: Vec<StreamInfo>) -> anyhow::Result<StreamInfo> {
    if let Some(quality) = args.quality {
        let label = format!("{quality}p");
        return streams
            .into_iter()
            .find(|s| s.quality == label)
            .with_context(|| format!("No {label} stream was resolved"));
    }

    match streams.len() {
        0 => {
            // there are no streams
            anyhow::bail!("No streams available for this clip.");
        }
        1 => Ok(streams.into_iter().next().unwrap()),
        _ => {
            println!(
                "{}",
                "Multiple streams available, please select one:"
                    .yellow()
                    .bold()
            );

            let options: Vec<String> = streams.iter().map(|s| s.to_string()).collect();
            let selection = Select::new("Select a stream:", options)
                .prompt()
                .context("Failed to select stream")?;

            Ok(streams
                .into_iter()
                .find(|s| s.to_string() == selection)
                .unwrap())
        }
    }
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap()
            .tick_strings(&[
                "▹▹▹▹▹",
                "▸▹▹▹▹",
                "▹▸▹▹▹",
                "▹▹▸▹▹",
                "▹▹▹▸▹",
                "▹▹▹▹▸",
                "▪▪▪▪▪",
            ]),
    );
    pb.set_message(message);
    pb
}

async fn download(client: &Client, url: &str, path: &Path) -> anyhow::Result<()> {
    let response = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .context("Failed to request the media URL")?;

    let total = response.content_length().unwrap_or(0);
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {bytes}/{total_bytes} ({eta})")
            .unwrap()
            .progress_chars("#>-"),
    );

    let mut file = tokio::fs::File::create(path)
        .await
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.context("Failed while reading the media stream")?;
        file.write_all(&chunk).await?;
        pb.inc(chunk.len() as u64);
    }
    file.flush().await?;
    pb.finish();

    Ok(())
}
