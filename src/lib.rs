pub mod character;
pub mod error;
pub mod healing;
pub mod host;
pub mod ledger;
pub mod logging;
pub mod marker;
pub mod memory;
pub mod message;
pub mod rest;
pub mod save;
pub mod settings;
pub mod toll;
pub mod vestige;

// Re-export commonly used items for easier access
pub use character::{CharacterId, HitPoints, HpUpdate, RestProfile, TargetContext, UpdateTag};
pub use error::{Result, VestigeError};
pub use host::{CharacterStore, ContentSource, Notifier, RestRoutine};
pub use ledger::TollLedger;
pub use memory::{CharacterRecord, MemoryHost, RecordingNotifier};
pub use message::{Notification, NotificationLevel};
pub use rest::RestReport;
pub use settings::Settings;
pub use toll::{TollOutcome, TollReceipt};
pub use vestige::{DischargeOutcome, RestOutcome, Vestige};
