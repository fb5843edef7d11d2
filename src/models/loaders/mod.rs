pub mod json_loader;

pub use json_loader::{load_corpus_file, save_corpus_file};
