// Every handler here sits behind `require_auth`; the verified caller is
// available as an `Extension<AuthUser>`.
pub mod books;
pub mod reviews;

pub use books::{book_create, book_delete, book_update};
pub use reviews::review_append;
