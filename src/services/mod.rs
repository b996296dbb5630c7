pub mod evaluator;
pub mod translator;
pub mod verdict;

pub use evaluator::{Evaluator, LlmEvaluator};
pub use translator::Translator;
pub use verdict::{extract_json_span, parse_verdict, VerdictParseError};
