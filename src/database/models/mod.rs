pub mod book;
pub mod user;

pub use book::NewBook;
pub use user::{User, UserProfile};
