mod r#trait;

pub use r#trait::{TestExecutor, TranscriptLoader};
