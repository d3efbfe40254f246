pub mod directline;
pub mod transcript;

pub use directline::DirectLineExecutor;
pub use transcript::HttpTranscriptLoader;
