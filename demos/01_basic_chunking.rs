//! Basic Text Chunking
//!
//! The minimal example: chunk a document from a flat config, the way a
//! labeling pipeline does.
//!
//! ```bash
//! RUST_LOG=morsels=debug cargo run --example 01_basic_chunking
//! ```

use morsels::ChunkConfig;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let document = "Machine learning models learn patterns from data. \
        They generalize these patterns to make predictions. \
        This is fundamentally different from traditional programming. \
        Deep learning extends this with multiple hidden layers. \
        Each layer learns increasingly abstract representations.";

    // Settings usually come from a file; JSON here for brevity
    let config: ChunkConfig =
        serde_json::from_str(r#"{ "method": "sentence", "sentences_per_chunk": 2 }"#)?;
    let chunks = morsels::chunk(document, &config, None)?;

    println!("Document: {} chars", document.len());
    println!("Chunks: {}\n", chunks.len());

    for (i, chunk) in chunks.iter().enumerate() {
        println!("[{}] {} chars: \"{}\"", i, chunk.len(), chunk);
    }

    // A broken config is reported before any text is touched
    if let Err(e) = morsels::chunk(document, &ChunkConfig::word(0), None) {
        println!("\nRejected: {e}");
    }

    Ok(())
}
