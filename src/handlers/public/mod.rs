pub mod auth;
pub mod books;
pub mod reviews;

pub use auth::{login, signup, user_profile};
pub use books::{book_get, books_list, books_recent};
pub use reviews::reviews_list;
