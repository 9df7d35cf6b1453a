pub mod extractor;
pub mod handlers;
pub mod key_terms;
pub mod normalize;
pub mod prompts;
pub mod session;
pub mod similarity;
