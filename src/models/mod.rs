pub mod corpus;
pub mod loaders;
pub mod question;

pub use corpus::{CompletionCounts, CompletionStatus, CorpusFileStats};
pub use loaders::{load_corpus_file, save_corpus_file};
pub use question::{EnrichmentItem, QuestionRecord, QuizOption};
