//! Chunking Strategies Comparison
//!
//! Runs every chunking method over one document and shows what each produces.
//!
//! ```bash
//! cargo run --example chunking_strategies
//! ```

use std::sync::Arc;

use morsels::{ChunkConfig, Chunker, DocumentChunker, Embedder, FnEmbedder, Method};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Text Chunking Strategies");
    println!("========================\n");

    // Sample document with varied structure
    let document = r"Machine learning models learn patterns from data. They generalize these patterns to make predictions on new, unseen examples. Rivers carry sediment to the sea.

The training process involves three key steps: forward pass; loss computation; backpropagation.

Deep learning extends this with multiple hidden layers. Floods reshape river valleys over centuries. Each layer learns increasingly abstract representations.";

    println!("Document length: {} characters\n", document.len());

    // Toy two-topic embedder: machine learning vs. rivers
    let embedder: Arc<dyn Embedder> = Arc::new(FnEmbedder::new(
        |s: &str| -> Result<Vec<f32>, String> {
            let lower = s.to_lowercase();
            let water = ["river", "flood", "sea"].iter().any(|w| lower.contains(w));
            Ok(if water { vec![0.1, 1.0] } else { vec![1.0, 0.1] })
        },
    ));

    for method in Method::ALL {
        let config = match method {
            Method::Character => ChunkConfig::character(120),
            Method::Word => ChunkConfig::word(15),
            Method::Sentence => ChunkConfig::sentence(2),
            Method::Paragraph => ChunkConfig::paragraph(),
            Method::Delimiter => ChunkConfig::delimiter(";"),
            Method::Tokens => ChunkConfig::tokens(20),
            Method::Semantic => ChunkConfig::semantic(2),
        };
        let chunker = DocumentChunker::from_config(&config)?.with_embedder(Arc::clone(&embedder));
        let chunks = chunker.chunk(document)?;

        println!("{method} ({} chunks)", chunks.len());
        println!("{}", "-".repeat(method.as_str().len() + 12));
        for (i, chunk) in chunks.iter().enumerate() {
            let preview: String = chunk.chars().take(70).collect();
            let ellipsis = if chunk.chars().count() > 70 { "..." } else { "" };
            println!("  [{i}] \"{preview}{ellipsis}\"");
        }
        println!();
    }

    println!("Note: semantic chunks gather the river sentences even though they sit");
    println!("in different paragraphs.");

    Ok(())
}
