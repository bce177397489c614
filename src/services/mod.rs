pub mod batch;
pub mod dedup;
pub mod image_io;
pub mod palette_io;
pub mod pipeline;

pub use batch::{BatchProcessor, BatchReport, FileKind, FileOutput};
pub use dedup::{deduplicate, deduplicate_in_order, PaletteDeduplicator};
pub use pipeline::{
    extract_palette, extract_palette_from_samples, Extraction, PaletteExtractionPipeline,
};
