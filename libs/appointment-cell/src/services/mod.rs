pub mod consultation;
pub mod counters;
pub mod pricing;
pub mod recorder;
pub mod registration;
pub mod scheduler;

pub use consultation::ConsultationService;
pub use counters::AttentionCounters;
pub use pricing::PricingService;
pub use recorder::AttentionRecorder;
pub use registration::RegistrationService;
pub use scheduler::{Clock, FixedClock, SlotFinder, SystemClock};
