mod dish;
mod identity;
mod session_credential;
mod user;

pub use dish::{Dish, DishFixture, DishUpdate, normalize_dish_list};
pub use identity::{Credentials, IdentityError, RegistrationRequest, TestIdentity};
pub use session_credential::SessionCredential;
pub use user::User;
