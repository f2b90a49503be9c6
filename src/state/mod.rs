//! Application state module

mod app_state;
mod login_state;
mod snackbar;

pub use app_state::*;
pub use login_state::*;
pub use snackbar::*;
