//! Pipeline services: collaborator clients, the claim fact-checker, and the
//! orchestrator that sequences them

pub mod fact_checker;
pub mod llm_client;
pub mod orchestrator;
pub mod probe_client;
pub mod search_client;
pub mod video_index_client;

pub use fact_checker::ClaimFactChecker;
pub use llm_client::LanguageModelClient;
pub use orchestrator::AnalysisOrchestrator;
pub use probe_client::FfprobeClient;
pub use search_client::WebSearchClient;
pub use video_index_client::VideoIndexClient;
