use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, SubsecRound, Utc};
use tracing::debug;

use super::StoreError;
use crate::crypto::SessionCipher;

/// Session lifetime in seconds.
/// Forces a fresh login (and identity check against the backend) every hour.
const SESSION_TTL_SECS: i64 = 60 * 60;

/// Separator between the fields of the plaintext record
const FIELD_DELIMITER: char = ',';

/// Number of fields in the plaintext record
const RECORD_FIELDS: usize = 4;

/// App code / app secret pair used by both authentication schemes.
#[derive(Clone, PartialEq, Eq)]
pub struct AppIdentity {
    pub app_code: String,
    pub app_secret: String,
}

impl AppIdentity {
    pub fn new(app_code: impl Into<String>, app_secret: impl Into<String>) -> Self {
        Self {
            app_code: app_code.into(),
            app_secret: app_secret.into(),
        }
    }
}

impl fmt::Debug for AppIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppIdentity")
            .field("app_code", &self.app_code)
            .field("app_secret", &"*****")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCredential {
    pub host: String,
    pub identity: AppIdentity,
    pub expires_at: DateTime<Utc>,
}

impl SessionCredential {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Minutes remaining until expiry (for display)
    pub fn minutes_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_minutes().max(0)
    }

    fn to_record(&self) -> String {
        format!(
            "{}{d}{}{d}{}{d}{}",
            self.host,
            self.identity.app_code,
            self.identity.app_secret,
            self.expires_at.timestamp(),
            d = FIELD_DELIMITER
        )
    }

    fn from_record(record: &str) -> Result<Self, StoreError> {
        let parts: Vec<&str> = record.split(FIELD_DELIMITER).collect();
        if parts.len() != RECORD_FIELDS {
            return Err(StoreError::Corrupt(format!(
                "expected {} fields, found {}",
                RECORD_FIELDS,
                parts.len()
            )));
        }

        let expires_at = parts[3]
            .parse::<i64>()
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .ok_or_else(|| StoreError::Corrupt("invalid expiration".to_string()))?;

        Ok(Self {
            host: parts[0].to_string(),
            identity: AppIdentity::new(parts[1], parts[2]),
            expires_at,
        })
    }
}

/// Encrypted, expiring session file.
pub struct SessionStore {
    path: PathBuf,
    cipher: SessionCipher,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cipher: SessionCipher::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Save a new session for `host`, valid for one hour from now.
    pub fn write(
        &self,
        host: &str,
        identity: &AppIdentity,
    ) -> Result<SessionCredential, StoreError> {
        self.write_at(Utc::now(), host, identity)
    }

    pub fn write_at(
        &self,
        now: DateTime<Utc>,
        host: &str,
        identity: &AppIdentity,
    ) -> Result<SessionCredential, StoreError> {
        let fields = [
            ("host", host),
            ("app_code", identity.app_code.as_str()),
            ("app_secret", identity.app_secret.as_str()),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, v)| v.contains(FIELD_DELIMITER)) {
            return Err(StoreError::InvalidField(*name));
        }

        // The record keeps whole seconds only
        let now = now.trunc_subsecs(0);
        let credential = SessionCredential {
            host: host.to_string(),
            identity: identity.clone(),
            expires_at: now + Duration::seconds(SESSION_TTL_SECS),
        };

        let blob = self
            .cipher
            .encrypt_to_base64(&credential.to_record())
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        // Replace the file in one step so a failed write never leaves half a blob
        let tmp = self.temp_path();
        std::fs::write(&tmp, blob).map_err(|e| StoreError::io(&tmp, e))?;
        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(StoreError::io(&self.path, e));
        }

        debug!(path = %self.path.display(), expires_at = %credential.expires_at, "Session saved");
        Ok(credential)
    }

    /// Load the session, failing if it is missing, unreadable or expired.
    pub fn read(&self) -> Result<SessionCredential, StoreError> {
        self.read_at(Utc::now())
    }

    pub fn read_at(&self, now: DateTime<Utc>) -> Result<SessionCredential, StoreError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotLoggedIn)
            }
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        let contents = String::from_utf8(bytes)
            .map_err(|_| StoreError::Corrupt("not a session file".to_string()))?;
        let record = self
            .cipher
            .decrypt_from_base64(contents.trim())
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let credential = SessionCredential::from_record(&record)?;

        if credential.is_expired_at(now) {
            return Err(StoreError::Expired {
                host: credential.host,
                app_code: credential.identity.app_code,
                expired_at: credential.expires_at,
            });
        }

        Ok(credential)
    }

    /// Delete the session file. A missing file is fine.
    pub fn remove(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(&self.path, e)),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
