//! Admin step-up challenge credentials.
//!
//! Loaded once at startup from a static JSON document of the form
//! `{"pass": [{"uid": "...", "nom": "...", "question": "...",
//! "reponse": "..."}]}` (field names preserved from the historical
//! credential file). The file's absence is non-fatal: the challenge step is
//! simply skipped for every badge.
//!
//! # Security
//! Answers are compared in constant time (after ASCII case folding) so an
//! attacker cannot learn a prefix from response timing.

use crate::error::StoreResult;
use badgegate_core::CardUid;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use subtle::ConstantTimeEq;
use tracing::info;

/// One challenge entry tied to an admin badge UID.
#[derive(Debug, Clone, Deserialize)]
pub struct Challenge {
    pub uid: CardUid,
    #[serde(rename = "nom", default)]
    pub name: String,
    #[serde(default)]
    pub question: String,
    #[serde(rename = "reponse", default)]
    pub answer: String,
}

#[derive(Debug, Deserialize)]
struct ChallengeFile {
    #[serde(default)]
    pass: Vec<Challenge>,
}

/// In-memory challenge map, never persisted by the running terminal.
#[derive(Debug, Default)]
pub struct AdminChallenges {
    map: HashMap<CardUid, Challenge>,
}

impl AdminChallenges {
    /// An empty map (no badge is challenged).
    #[must_use]
    pub fn empty() -> Self {
        AdminChallenges::default()
    }

    /// Load the credential file. A missing file yields the empty map; a
    /// present-but-malformed file is an error the operator must fix.
    pub fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "no challenge file, admin step-up disabled");
            return Ok(AdminChallenges::empty());
        }
        let contents = std::fs::read_to_string(path)?;
        let file: ChallengeFile = serde_json::from_str(&contents)?;
        let map = file
            .pass
            .into_iter()
            .map(|entry| (entry.uid.clone(), entry))
            .collect();
        Ok(AdminChallenges { map })
    }

    /// Whether `uid` carries a challenge.
    #[must_use]
    pub fn contains(&self, uid: &CardUid) -> bool {
        self.map.contains_key(uid)
    }

    /// The question to ask for `uid`, if any.
    #[must_use]
    pub fn question(&self, uid: &CardUid) -> Option<&str> {
        self.map.get(uid).map(|c| c.question.as_str())
    }

    /// Check an answer. Badges without a challenge always verify; otherwise
    /// the match is case-insensitive and constant-time.
    #[must_use]
    pub fn verify(&self, uid: &CardUid, answer: &str) -> bool {
        match self.map.get(uid) {
            None => true,
            Some(challenge) => {
                let expected = challenge.answer.trim().to_ascii_lowercase();
                let given = answer.trim().to_ascii_lowercase();
                expected.as_bytes().ct_eq(given.as_bytes()).into()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid() -> CardUid {
        "250-152-169-174-101".parse().unwrap()
    }

    fn sample() -> AdminChallenges {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pass.json");
        std::fs::write(
            &path,
            r#"{"pass": [{"uid": "250-152-169-174-101", "nom": "Admin",
                "question": "First pet?", "reponse": "Rex"}]}"#,
        )
        .unwrap();
        AdminChallenges::load(&path).unwrap()
    }

    #[test]
    fn missing_file_is_non_fatal() {
        let challenges = AdminChallenges::load("/nonexistent/pass.json").unwrap();
        assert!(!challenges.contains(&uid()));
        assert!(challenges.verify(&uid(), "anything"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pass.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(AdminChallenges::load(&path).is_err());
    }

    #[test]
    fn answer_match_is_case_insensitive() {
        let challenges = sample();
        assert!(challenges.contains(&uid()));
        assert_eq!(challenges.question(&uid()), Some("First pet?"));
        assert!(challenges.verify(&uid(), "rex"));
        assert!(challenges.verify(&uid(), " REX "));
        assert!(!challenges.verify(&uid(), "Fido"));
    }

    #[test]
    fn unchallenged_uid_always_verifies() {
        let challenges = sample();
        let other: CardUid = "1-2-3".parse().unwrap();
        assert!(challenges.verify(&other, ""));
    }
}
