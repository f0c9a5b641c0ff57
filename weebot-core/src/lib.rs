pub mod config;
pub mod error;
pub mod kv;
pub mod llm;
pub mod models;
pub mod prompts;
pub mod store;

pub use config::WeebotConfig;
pub use error::WeebotError;
pub use kv::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use llm::{
    create_generator, GeminiTextClient, LlmError, TextGenerator, UnavailableGenerator,
};
pub use models::{
    CodeAnalysis, CodingSession, CommunicationMetrics, CommunicationSession, ResponseAnalysis,
    Session, SessionKind, SessionStats,
};
pub use store::{SessionStore, WriteOutcome, SESSIONS_KEY};
