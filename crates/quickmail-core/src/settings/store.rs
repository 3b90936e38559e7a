//! Settings file load/save.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::model::{Settings, SmtpServer};
use super::obfuscation::{decode_secret, encode_secret};
use crate::{Error, Result};

/// File name inside the home directory.
pub const CONFIG_FILE_NAME: &str = ".gmail_sender_config.json";

/// On-disk layout. The password is stored encoded.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredSettings {
    #[serde(default)]
    sender_email: String,
    #[serde(default)]
    recipient_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sender_password: Option<String>,
    #[serde(default)]
    smtp: SmtpServer,
}

impl StoredSettings {
    fn decode(self) -> Result<Settings> {
        let sender_password = self
            .sender_password
            .filter(|encoded| !encoded.is_empty())
            .map(|encoded| decode_secret(&encoded))
            .transpose()?;

        Ok(Settings {
            sender_email: self.sender_email,
            recipient_email: self.recipient_email,
            sender_password,
            smtp: self.smtp,
        })
    }

    fn encode(settings: &Settings) -> Self {
        Self {
            sender_email: settings.sender_email.clone(),
            recipient_email: settings.recipient_email.clone(),
            sender_password: settings.sender_password.as_ref().map(encode_secret),
            smtp: settings.smtp.clone(),
        }
    }
}

/// Reads and writes the settings file at a fixed path.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Creates a store backed by `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a store at `~/.gmail_sender_config.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn default_location() -> Result<Self> {
        let home = dirs::home_dir().ok_or(Error::NoHomeDirectory)?;
        Ok(Self::new(home.join(CONFIG_FILE_NAME)))
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the settings, or `None` if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// holds a password that does not decode.
    pub fn try_load(&self) -> Result<Option<Settings>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No settings file at {:?}", self.path);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let stored: StoredSettings = serde_json::from_str(&contents)?;
        stored.decode().map(Some)
    }

    /// Loads the settings, falling back to empty defaults.
    ///
    /// A missing file is normal. Any other failure is logged as a warning.
    #[must_use]
    pub fn load(&self) -> Settings {
        match self.try_load() {
            Ok(Some(settings)) => {
                debug!("Loaded settings from {:?}", self.path);
                settings
            }
            Ok(None) => Settings::default(),
            Err(e) => {
                warn!("Could not load config file {}: {e}", self.path.display());
                Settings::default()
            }
        }
    }

    /// Writes the settings, replacing any previous content, and returns the
    /// path written.
    ///
    /// On Unix the file is created with mode `0600`. An existing file is
    /// narrowed to `0600` before anything is written to it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, settings: &Settings) -> Result<&Path> {
        let contents = serde_json::to_string_pretty(&StoredSettings::encode(settings))?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let mut file = create_private(&self.path)?;
        file.write_all(contents.as_bytes())?;
        file.write_all(b"\n")?;
        file.sync_all()?;

        info!("Settings saved to {:?}", self.path);
        Ok(&self.path)
    }
}

/// Opens `path` truncated and owner-only, ready for the secret.
fn create_private(path: &Path) -> io::Result<fs::File> {
    let file = open_private(path)?;
    restrict_permissions(&file)?;
    Ok(file)
}

#[cfg(unix)]
fn open_private(path: &Path) -> io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;

    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> io::Result<fs::File> {
    fs::File::create(path)
}

#[cfg(unix)]
fn restrict_permissions(file: &fs::File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    file.set_permissions(fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
const fn restrict_permissions(_file: &fs::File) -> io::Result<()> {
    Ok(())
}
