//! Domain rows, request payloads and response shapes.

mod admin;
mod broadcast;
mod catalog;
mod engagement;
mod page;
mod post;
mod upload;
mod user;

pub use admin::*;
pub use broadcast::*;
pub use catalog::*;
pub use engagement::*;
pub use page::*;
pub use post::*;
pub use upload::*;
pub use user::*;
