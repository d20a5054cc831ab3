pub mod listing;
pub mod pet;
pub mod vaccination;

pub use pet::PetService;
