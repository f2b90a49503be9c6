//! Account, storage and reporting capabilities used by the sign-in screen

mod diagnostics;
mod local;
mod traits;

pub use diagnostics::TracingDiagnostics;
pub use local::{LocalAuthProvider, LocalUserStore};
pub use traits::{AuthProvider, DiagnosticsSink, NotificationSink, RemoteUserStore};

#[cfg(test)]
pub use local::AccountError;
#[cfg(test)]
pub use traits::{MockAuthProvider, MockDiagnosticsSink, MockNotificationSink, MockRemoteUserStore};
