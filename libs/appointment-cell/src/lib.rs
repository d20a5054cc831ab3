pub mod models;
pub mod handlers;
pub mod router;
pub mod services;
pub mod state;

pub use models::*;
pub use router::*;
pub use state::AppointmentState;
