//! Basic recognition example
//!
//! This example demonstrates the core functionality of sight:
//! - Creating a client from an API key
//! - Submitting a batch of files asynchronously
//! - Consuming pages as they arrive
//! - Checking how the batch ended
//!
//! Run with:
//! SIGHT_API_KEY=xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx cargo run --example basic_recognize -- invoice.pdf receipt.jpg

use sight::{PollOutcome, RecognitionConfig, SightClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let api_key = std::env::var("SIGHT_API_KEY")?;
    let files: Vec<String> = std::env::args().skip(1).collect();
    if files.is_empty() {
        eprintln!("usage: basic_recognize <file>...");
        std::process::exit(2);
    }

    let client = SightClient::new(api_key)?;

    // Ask for asynchronous processing so multi-page documents stream back
    let config = RecognitionConfig {
        do_async: true,
        ..RecognitionConfig::sentences()
    };
    let mut pages = client.recognize_with(&config, &files).await?;
    println!("Submitted {} files", pages.total_files());

    while let Some(page) = pages.next_page().await {
        let name = page
            .file_position()
            .and_then(|index| files.get(index))
            .map_or("?", String::as_str);
        if let Some(error) = page.error() {
            println!("✗ {name}: {error}");
            continue;
        }
        println!(
            "✓ {name} page {}/{}",
            page.page_number, page.number_of_pages_in_file
        );
        for region in &page.recognized_text {
            println!("    {:.2}  {}", region.confidence, region.text);
        }
    }

    match pages.finish().await {
        PollOutcome::Completed => println!("All files complete"),
        PollOutcome::Failed(e) => eprintln!("Stopped early: {e}"),
        PollOutcome::Cancelled => eprintln!("Cancelled"),
    }
    Ok(())
}
