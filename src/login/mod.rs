//! Sign-in screen logic: form handling, account linking and user id migration

mod coordinator;
mod errors;
mod scope;

pub use coordinator::SignInCoordinator;
