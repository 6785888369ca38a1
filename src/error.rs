// Copyright (c) 2022 John Ingve Olsen
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The session bus could not be reached.
    #[error("failed to connect to session bus: {0}")]
    Connection(#[source] zbus::Error),

    /// An operation was attempted before `Notifier::init` or after `Notifier::shutdown`.
    #[error("notifier is not initialized")]
    NotInitialized,

    /// The call was rejected or the reply could not be decoded.
    #[error("notification server call failed: {0}")]
    Protocol(#[from] zbus::Error),

    #[error("failed to start handler workers: {0}")]
    Workers(#[source] std::io::Error),
}
