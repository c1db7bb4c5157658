use crate::config::ConfigError;
use crate::constants::USERNAME_REGEX;
use crate::core_auth::error::AuthFailure;
use crate::core_auth::secret::Secret;
use log::{info, warn};
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// One entry of the users file.
#[derive(Clone, Deserialize)]
pub struct CredentialRecord {
    /// Jail root of the user on the host filesystem.
    pub path: String,
    pub user: String,
    pub password: String,
}

impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("path", &self.path)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

struct StoredCredential {
    record: CredentialRecord,
    secret: Secret,
}

/// Immutable username -> credential map, built once at startup and shared
/// read-only between sessions.
pub struct CredentialStore {
    users: HashMap<String, StoredCredential>,
    dummy: Secret,
}

impl CredentialStore {
    /// Loads the users file: a JSON array of `{"path", "user", "password"}`.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let store = Self::from_json_str(&content)?;
        info!(
            "Loaded {} user(s) from {}",
            store.len(),
            path.display()
        );
        Ok(store)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let records: Vec<CredentialRecord> = serde_json::from_str(content)?;
        Self::from_records(records)
    }

    /// Builds the store from records in source order. When a username appears
    /// more than once, the last record wins.
    pub fn from_records(
        records: impl IntoIterator<Item = CredentialRecord>,
    ) -> Result<Self, ConfigError> {
        let username_re =
            Regex::new(USERNAME_REGEX).map_err(|e| ConfigError::InvalidRecord(e.to_string()))?;

        let mut users = HashMap::new();
        for record in records {
            if !username_re.is_match(&record.user) {
                return Err(ConfigError::InvalidRecord(format!(
                    "invalid username {:?}",
                    record.user
                )));
            }
            let secret = Secret::parse(&record.password);
            let username = record.user.clone();
            if let Some(previous) = users.insert(username, StoredCredential { record, secret }) {
                warn!(
                    "Duplicate user {:?} in credentials, replacing root {} with a later record",
                    previous.record.user, previous.record.path
                );
            }
        }

        let max_cost = users.values().filter_map(|c| c.secret.bcrypt_cost()).max();
        let dummy = Secret::dummy(max_cost)?;

        Ok(Self { users, dummy })
    }

    pub fn lookup(&self, username: &str) -> Option<&CredentialRecord> {
        self.users.get(username).map(|c| &c.record)
    }

    /// Checks a username/password pair. Every reject costs at least one
    /// verification of the dummy secret, so the time taken does not tell
    /// whether the username exists.
    pub fn verify(&self, username: &str, password: &str) -> Result<&CredentialRecord, AuthFailure> {
        match self.users.get(username) {
            Some(stored) if stored.secret.verify(password) => Ok(&stored.record),
            Some(stored) => {
                if self.pads_with_dummy(&stored.secret) {
                    let _ = self.dummy.verify(password);
                }
                Err(AuthFailure::BadPassword(username.to_string()))
            }
            None => {
                let _ = self.dummy.verify(password);
                Err(AuthFailure::UnknownUser(username.to_string()))
            }
        }
    }

    /// A known user's reject is topped up with the dummy check when their own
    /// secret is cheaper: plaintext, or bcrypt at a lower cost.
    fn pads_with_dummy(&self, secret: &Secret) -> bool {
        self.dummy.bcrypt_cost() > secret.bcrypt_cost()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_records() {
        let store = CredentialStore::from_json_str(
            r#"[
                {"path": "/srv/alice", "user": "alice", "password": "secret"},
                {"path": "/srv/bob", "user": "bob", "password": "hunter2"}
            ]"#,
        )
        .unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.lookup("alice").unwrap().path, "/srv/alice");
        assert_eq!(store.lookup("bob").unwrap().password, "hunter2");
        assert!(store.lookup("carol").is_none());
    }

    #[test]
    fn test_duplicate_user_last_wins() {
        let store = CredentialStore::from_json_str(
            r#"[
                {"path": "/srv/bob-a", "user": "bob", "password": "a"},
                {"path": "/srv/bob-b", "user": "bob", "password": "b"}
            ]"#,
        )
        .unwrap();
        assert_eq!(store.len(), 1);
        let record = store.lookup("bob").unwrap();
        assert_eq!(record.path, "/srv/bob-b");
        assert!(store.verify("bob", "b").is_ok());
        assert!(matches!(
            store.verify("bob", "a"),
            Err(AuthFailure::BadPassword(_))
        ));
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let result =
            CredentialStore::from_json_str(r#"[{"user": "alice", "password": "secret"}]"#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        assert!(matches!(
            CredentialStore::from_json_str("{not json"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            CredentialStore::from_json_str(r#"{"user": "alice"}"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_invalid_username_is_rejected() {
        for name in ["", "al ice", "bob\n", "tab\tname"] {
            let records = vec![CredentialRecord {
                path: "/srv".to_string(),
                user: name.to_string(),
                password: "x".to_string(),
            }];
            assert!(matches!(
                CredentialStore::from_records(records),
                Err(ConfigError::InvalidRecord(_))
            ));
        }
    }

    #[test]
    fn test_empty_list_is_valid() {
        let store = CredentialStore::from_json_str("[]").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"path": "/srv/alice", "user": "alice", "password": "secret"}}]"#
        )
        .unwrap();
        let store = CredentialStore::load_from_file(file.path()).unwrap();
        assert_eq!(store.lookup("alice").unwrap().path, "/srv/alice");
    }

    #[test]
    fn test_unreadable_file() {
        let result = CredentialStore::load_from_file("/nonexistent/users.json");
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_verify_is_idempotent() {
        let store = CredentialStore::from_json_str(
            r#"[{"path": "/srv/alice", "user": "alice", "password": "secret"}]"#,
        )
        .unwrap();
        for _ in 0..3 {
            assert_eq!(store.verify("alice", "secret").unwrap().path, "/srv/alice");
            assert!(matches!(
                store.verify("mallory", "secret"),
                Err(AuthFailure::UnknownUser(_))
            ));
        }
    }

    #[test]
    fn test_dummy_follows_slowest_secret() {
        let hashed = bcrypt::hash("pw", 5).unwrap();
        let records = vec![
            CredentialRecord {
                path: "/srv/a".to_string(),
                user: "a".to_string(),
                password: "plain".to_string(),
            },
            CredentialRecord {
                path: "/srv/b".to_string(),
                user: "b".to_string(),
                password: hashed,
            },
        ];
        let store = CredentialStore::from_records(records).unwrap();
        assert_eq!(store.dummy.bcrypt_cost(), Some(5));
        assert!(store.verify("b", "pw").is_ok());
        assert!(store.verify("a", "plain").is_ok());
    }

    fn mixed_store(cost: u32) -> CredentialStore {
        let records = vec![
            CredentialRecord {
                path: "/srv/plain".to_string(),
                user: "plainuser".to_string(),
                password: "plain".to_string(),
            },
            CredentialRecord {
                path: "/srv/hash".to_string(),
                user: "hashuser".to_string(),
                password: bcrypt::hash("pw", cost).unwrap(),
            },
        ];
        CredentialStore::from_records(records).unwrap()
    }

    #[test]
    fn test_cheap_secrets_are_padded_on_reject() {
        let store = mixed_store(5);
        assert!(store.pads_with_dummy(&Secret::parse("plain")));
        assert!(store.pads_with_dummy(&Secret::parse(&bcrypt::hash("pw", 4).unwrap())));
        assert!(!store.pads_with_dummy(&Secret::parse(&bcrypt::hash("pw", 5).unwrap())));

        let plain_only = CredentialStore::from_json_str(
            r#"[{"path": "/srv/alice", "user": "alice", "password": "secret"}]"#,
        )
        .unwrap();
        assert!(!plain_only.pads_with_dummy(&Secret::parse("secret")));
    }

    #[test]
    fn test_reject_time_does_not_reveal_known_user() {
        let store = mixed_store(8);
        let time_rejects = |user: &str| {
            let start = std::time::Instant::now();
            for _ in 0..3 {
                assert!(store.verify(user, "wrong").is_err());
            }
            start.elapsed()
        };

        let known = time_rejects("plainuser");
        let unknown = time_rejects("nosuchuser");
        // Both paths run the cost-8 dummy; without it the known reject is
        // thousands of times faster.
        assert!(known * 3 >= unknown, "known {:?}, unknown {:?}", known, unknown);
    }
}
