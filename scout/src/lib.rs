pub mod analysis;
pub mod app;
pub mod config;
pub mod integrity;
pub mod persistence;
pub mod router;
pub mod transmission;

pub use analysis::{AnalysisEvent, AnalysisRunner, AnalysisTiming, MockResultGenerator};
pub use app::{ScoutApp, ScoutError, ScoutResult};
pub use config::{AppConfig, ConfigError, ConfigResult, TimingConfig};
pub use integrity::{FormCheck, IntegrityReport, IntegrityStatus};
pub use persistence::{
    FileStore, KeyValueStore, MemoryStore, Persistence, StoreError, StoreResult, HISTORY_KEY,
    PROFILE_KEY,
};
pub use router::{CompletedTest, RouterError, RouterResult, Screen, ScreenRouter, Session, View};
pub use transmission::{
    scramble_lines, DataPacket, EncryptionAnimation, EncryptionConfig, EncryptionPhase,
    PacketMetrics, TransmissionEvent,
};
