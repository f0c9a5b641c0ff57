pub mod analysis;
pub mod session;
pub mod stats;

pub use analysis::{fallback_tips, tips_from_value, CodeAnalysis, CommunicationMetrics, ResponseAnalysis};
pub use session::{CodingSession, CommunicationSession, Session, SessionKind};
pub use stats::SessionStats;
