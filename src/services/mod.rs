pub mod explanation_service;
pub mod fallback;
pub mod glossary_service;
pub mod json_extractor;
pub mod llm_service;
pub mod quiz_service;
pub mod steps_service;
pub mod text_classifier;

pub use explanation_service::ExplanationService;
pub use glossary_service::GlossaryService;
pub use llm_service::{CallOptions, LlmService};
pub use quiz_service::QuizService;
pub use steps_service::StepsService;
pub use text_classifier::TextClassifier;
