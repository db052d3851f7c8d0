pub mod builder;
pub mod cascade;
pub mod defaults;
pub mod model_handle;
pub mod orchestrator;
pub mod runtime;
pub mod traits;
pub mod transcript;
pub mod vocabulary;
