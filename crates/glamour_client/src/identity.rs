//! Anonymous player identity.
//!
//! The id is generated once and kept in a small file next to the client, so
//! every game from this machine counts towards the same player.

use derive_getters::Getters;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

use crate::error::ClientError;

/// Default identity file name.
pub const DEFAULT_ID_FILE: &str = ".glamour_player_id";

/// Stable anonymous id plus where it is stored.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct PlayerIdentity {
    /// The id sent to the server as `storageId`.
    id: String,
    /// File the id lives in.
    path: PathBuf,
}

impl PlayerIdentity {
    /// Reads the id from `path`, or generates a UUID v7 and writes it there.
    ///
    /// A file holding only whitespace counts as missing.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Io`] if the file cannot be read or written.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_create(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref().to_path_buf();
        match std::fs::read_to_string(&path) {
            Ok(content) if !content.trim().is_empty() => {
                let id = content.trim().to_string();
                debug!(player_id = %id, "Loaded player identity");
                return Ok(Self { id, path });
            }
            Ok(_) => debug!("Identity file empty, regenerating"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No identity file yet")
            }
            Err(e) => return Err(e.into()),
        }

        let id = uuid::Uuid::now_v7().to_string();
        std::fs::write(&path, &id)?;
        info!(player_id = %id, "Created player identity");
        Ok(Self { id, path })
    }
}
