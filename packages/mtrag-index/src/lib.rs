//! BM25 retrieval over a JSONL chunk corpus.

mod bm25;
mod corpus;
mod error;

pub use bm25::{Bm25Index, tokenize};
pub use corpus::{ChunkRecord, load_chunks};
pub use error::{Error, Result};
