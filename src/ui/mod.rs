mod exceptions;
mod flows;
pub mod selectors;
mod session;

pub use exceptions::{BENIGN, is_benign, unexpected as unexpected_errors};
pub use flows::{DishCardAction, SessionLoginError};
pub use session::{UiError, UiSession, Viewport};
