//! Socket table reader port (interface).

use crate::domain::SocketEntry;
use crate::error::Result;

/// Port for enumerating bound sockets.
///
/// Implementations cover TCP and UDP, listening and connected, for every
/// socket visible at the current privilege level. Rows that cannot be read
/// or attributed to a PID are skipped; a PID is never guessed. Results are
/// unordered and may contain the same (port, protocol, pid) more than once.
pub trait SocketTablePort: Send + Sync {
    /// Read the current socket table.
    ///
    /// Fails only when the table as a whole is unavailable.
    fn read_sockets(&self) -> impl std::future::Future<Output = Result<Vec<SocketEntry>>> + Send;
}
