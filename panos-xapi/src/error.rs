use thiserror::Error;

use crate::name::NameError;
use crate::outcome::Category;
use crate::payload::PayloadError;
use crate::profile::ProfileLoadError;
use crate::response::ProtocolError;
use crate::scope::RoutingError;
use crate::session::SessionError;
use crate::transport::TransportError;

/// Everything an API call can fail with.
///
/// `Validation`, `Routing`, `Payload`, `Session` and `Profile` are raised
/// locally before any request leaves the process. `Transport` and `Protocol`
/// wrap I/O and decoding failures unchanged. `Semantic` carries the device's verdict.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] NameError),
    #[error(transparent)]
    Routing(#[from] RoutingError),
    #[error(transparent)]
    Payload(#[from] PayloadError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Profile(#[from] ProfileLoadError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("device rejected request ({category}): {}", semantic_detail(.description, .detail))]
    Semantic {
        category: Category,
        code: Option<String>,
        description: String,
        detail: String,
    },
}

impl Error {
    /// Category of a device-side rejection, if this is one.
    pub fn category(&self) -> Option<Category> {
        match self {
            Error::Semantic { category, .. } => Some(*category),
            _ => None,
        }
    }

    /// Whether the request never left the process.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Error::Validation(_)
                | Error::Routing(_)
                | Error::Payload(_)
                | Error::Session(_)
                | Error::Profile(_)
        )
    }
}

fn semantic_detail(description: &str, detail: &str) -> String {
    if detail.is_empty() {
        description.to_string()
    } else {
        format!("{detail} [{description}]")
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
