pub mod document;
pub mod enrichment;
pub mod learner;
pub mod loaders;
pub mod scan_page;

pub use document::{Classification, Document, DocumentType};
pub use enrichment::{
    Enrichment, EnrichmentKind, ExplanationResult, GlossaryResult, QuizQuestion, QuizResult,
    StepsResult,
};
pub use learner::{LearnerContext, LearnerProfile};
pub use loaders::{load_all_toml_files, load_toml_to_scan_page};
pub use scan_page::ScanPage;
