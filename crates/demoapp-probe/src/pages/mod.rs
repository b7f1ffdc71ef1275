//! Page objects for the My Demo App screens.

pub mod login;
pub mod product;

pub use login::LoginPage;
pub use product::{ComparisonResult, ProductPage};
