//! Stream a chat completion from an OpenAI-compatible endpoint and print the
//! classified block structure as it forms.
//!
//! ```text
//! STREAMBLOCKS_ENDPOINT=https://api.openai.com/v1/chat/completions \
//! STREAMBLOCKS_API_KEY=sk-... \
//! cargo run --example stream_chat -- "Explain the Pythagorean theorem with a table"
//! ```

use serde_json::json;
use std::sync::{Arc, Mutex};
use streamblocks::{ContentBlock, FnSink, LanguageHint, LiveAnswer, StreamConsumer};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let endpoint = std::env::var("STREAMBLOCKS_ENDPOINT")
        .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string());
    let prompt = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Explain the Pythagorean theorem with a table".to_string());

    let mut builder = StreamConsumer::builder();
    if let Ok(key) = std::env::var("STREAMBLOCKS_API_KEY") {
        builder = builder.api_key(key);
    }
    let consumer = builder.build()?;

    let answer = Arc::new(Mutex::new(LiveAnswer::new(LanguageHint::Auto)));
    let (done_tx, mut done_rx) = mpsc::channel::<Result<String, String>>(1);

    let view = answer.clone();
    let done = done_tx.clone();
    let fail = done_tx;
    let handle = consumer.open(
        endpoint,
        json!({
            "model": std::env::var("STREAMBLOCKS_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into()),
            "stream": true,
            "messages": [{"role": "user", "content": prompt}],
        }),
        FnSink::new(
            move |delta| {
                let mut answer = view.lock().unwrap();
                answer.push_delta(delta);
                // Redraw: renderers replace their view in full on every update.
                print!("\x1b[2J\x1b[H");
                for block in answer.blocks() {
                    render(block);
                }
            },
            move |full| {
                let _ = done.try_send(Ok(full));
            },
            move |err, partial| {
                let _ = fail.try_send(Err(format!("{err} (kept {} chars)", partial.len())));
            },
        ),
    );

    match done_rx.recv().await {
        Some(Ok(full)) => println!("\n--- stream complete, {} chars ---", full.len()),
        Some(Err(msg)) => eprintln!("\n--- stream failed: {msg} ---"),
        None => eprintln!("\n--- stream ended without a terminal event ---"),
    }
    handle.cancel();
    Ok(())
}

fn render(block: &ContentBlock) {
    match block {
        ContentBlock::Heading { level, text } => println!("{} {text}", "=".repeat(4 - *level as usize)),
        ContentBlock::ChineseHeading { text } => println!("== {text}"),
        ContentBlock::ChineseSubheading { text } => println!("  · {text}"),
        ContentBlock::ListItem { ordered, index, text } => match (ordered, index) {
            (true, Some(i)) => println!("  {i}. {text}"),
            _ => println!("  - {text}"),
        },
        ContentBlock::Table { table } => {
            println!("  [{}]", table.headers.join(" | "));
            for row in &table.rows {
                println!("   {}", row.join(" | "));
            }
        }
        ContentBlock::MathInline { markup } => println!("  ⟨math⟩ {markup}"),
        ContentBlock::MathDisplay { markup } => println!("  ⟨MATH⟩ {markup}"),
        ContentBlock::PlainText { text } => println!("{text}"),
    }
}
