pub mod boot;
pub mod clock;
pub mod config;
pub mod selector;
pub mod session;

pub use boot::{BOOT_MESSAGES, BootSchedule, BootTiming};
pub use clock::PlaybackClock;
pub use config::PlayerConfig;
pub use selector::{SelectorEvent, SelectorState, SourceSelector, SwitchOutcome};
pub use session::{PlayerSession, SessionEvent};
