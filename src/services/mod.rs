pub mod batch_planner;
pub mod corpus_scanner;
pub mod interaction;
pub mod progress;
pub mod prompt_builder;
pub mod response_parser;

pub use batch_planner::BatchPlan;
pub use corpus_scanner::{scan_corpus, CorpusScan};
pub use interaction::{Prompter, TerminalPrompter};
pub use progress::ProgressReporter;
pub use prompt_builder::build_prompt;
pub use response_parser::parse_response;
