pub mod cart;
pub mod catalog;
pub mod order;

pub use cart::Cart;
pub use order::OrderService;
