//! Participant records and identity types
//!
//! This module defines the participant record as stored by the roster
//! backend, together with the identifier, gender, and photo reference
//! types the rest of the engine builds on. Records are owned by the
//! backend; the engine only reads them and issues explicit partial
//! updates through the roster repository.

use std::{fmt::Display, str::FromStr};

use enum_map::Enum;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use uuid::Uuid;

/// A unique identifier for participants in the roster
///
/// Every participant record carries a stable ID that outlives individual
/// game sessions. IDs serialize as UUID strings.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, DeserializeFromStr, SerializeDisplay,
)]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random participant ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for Id {
    /// Creates a new random participant ID (same as `new()`)
    fn default() -> Self {
        Self::new()
    }
}

impl Display for Id {
    /// Formats the ID as a UUID string
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for Id {
    type Err = uuid::Error;

    /// Parses an ID from a UUID string
    ///
    /// # Errors
    ///
    /// Returns a `uuid::Error` if the string is not a valid UUID.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

/// Gender of a participant as recorded by the roster backend
///
/// The backend stores single-letter tags, so the enum serializes as
/// `"m"` and `"f"`. The round selector uses the gender to balance the
/// candidates shown next to a photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
pub enum Gender {
    /// Male participant, stored as `"m"`
    #[serde(rename = "m")]
    Male,
    /// Female participant, stored as `"f"`
    #[serde(rename = "f")]
    Female,
}

impl Gender {
    /// Returns the other gender
    pub fn opposite(self) -> Self {
        match self {
            Self::Male => Self::Female,
            Self::Female => Self::Male,
        }
    }
}

impl Display for Gender {
    /// Formats the gender as a lowercase English word
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Male => write!(f, "male"),
            Self::Female => write!(f, "female"),
        }
    }
}

/// Reference to a participant's photo
///
/// The engine never loads image data; it only passes this reference
/// through to the presentation layer. Serializes as a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhotoRef(String);

impl PhotoRef {
    /// Creates a photo reference from a URL or storage key
    pub fn new(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    /// Returns the referenced location
    pub fn location(&self) -> &str {
        &self.0
    }
}

/// A participant record as stored by the roster backend
///
/// Progress fields keep the backend's original names on the wire:
/// `tentativasJogadas` for attempts played, `possuiBonus` for the bonus
/// flag, and `scoreFinal` for the finals score. Fields a participant may
/// lack before their first game default to zero values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Stable identifier assigned by the backend
    pub id: Id,
    /// Display name shown as an answer candidate
    pub name: String,
    /// National ID number, digits only
    #[serde(rename = "nationalId")]
    pub national_id: String,
    /// Company the participant belongs to
    pub company: String,
    /// Recorded gender, absent for incomplete registrations
    pub gender: Option<Gender>,
    /// Photo reference, absent for incomplete registrations
    pub photo: Option<PhotoRef>,
    /// Correct answers accumulated in the current or last game
    #[serde(default)]
    pub score: u32,
    /// Attempts consumed in the current or last game
    #[serde(rename = "tentativasJogadas", default)]
    pub attempts_played: u32,
    /// Whether a one-time bonus attempt is still available
    #[serde(rename = "possuiBonus", default)]
    pub has_bonus: bool,
    /// Score achieved in the finals, if the participant played them
    #[serde(rename = "scoreFinal")]
    pub final_score: Option<u32>,
}

impl Participant {
    /// Whether this participant can appear in a candidate pool
    ///
    /// A candidate needs both a photo to be featured and a recorded
    /// gender for balanced selection.
    pub fn is_eligible(&self) -> bool {
        self.photo.is_some() && self.gender.is_some()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn complete_participant() -> Participant {
        Participant {
            id: Id::new(),
            name: "Ana Souza".to_string(),
            national_id: "12345678900".to_string(),
            company: "Simetria".to_string(),
            gender: Some(Gender::Female),
            photo: Some(PhotoRef::new("photos/ana.jpg")),
            score: 0,
            attempts_played: 0,
            has_bonus: false,
            final_score: None,
        }
    }

    #[test]
    fn test_id_string_round_trip() {
        let id = Id::new();
        let parsed: Id = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_id_rejects_invalid_strings() {
        assert!("not-a-uuid".parse::<Id>().is_err());
    }

    #[test]
    fn test_gender_wire_tags() {
        assert_eq!(serde_json::to_string(&Gender::Male).unwrap(), "\"m\"");
        assert_eq!(serde_json::to_string(&Gender::Female).unwrap(), "\"f\"");

        let parsed: Gender = serde_json::from_str("\"f\"").unwrap();
        assert_eq!(parsed, Gender::Female);
    }

    #[test]
    fn test_gender_opposite() {
        assert_eq!(Gender::Male.opposite(), Gender::Female);
        assert_eq!(Gender::Female.opposite(), Gender::Male);
    }

    #[test]
    fn test_eligibility_requires_photo_and_gender() {
        let complete = complete_participant();
        assert!(complete.is_eligible());

        let mut without_photo = complete_participant();
        without_photo.photo = None;
        assert!(!without_photo.is_eligible());

        let mut without_gender = complete_participant();
        without_gender.gender = None;
        assert!(!without_gender.is_eligible());
    }

    #[test]
    fn test_participant_deserializes_backend_names() {
        let id = Id::new();
        let record = serde_json::json!({
            "id": id.to_string(),
            "name": "Bruno Lima",
            "nationalId": "98765432100",
            "company": "GC",
            "gender": "m",
            "photo": "photos/bruno.jpg",
            "score": 3,
            "tentativasJogadas": 5,
            "possuiBonus": true,
            "scoreFinal": 9,
        });

        let participant: Participant = serde_json::from_value(record).unwrap();
        assert_eq!(participant.id, id);
        assert_eq!(participant.gender, Some(Gender::Male));
        assert_eq!(participant.score, 3);
        assert_eq!(participant.attempts_played, 5);
        assert!(participant.has_bonus);
        assert_eq!(participant.final_score, Some(9));
    }

    #[test]
    fn test_participant_defaults_for_fresh_records() {
        let record = serde_json::json!({
            "id": Id::new().to_string(),
            "name": "Carla Dias",
            "nationalId": "11122233344",
            "company": "Simetria",
            "gender": "f",
            "photo": "photos/carla.jpg",
            "scoreFinal": null,
        });

        let participant: Participant = serde_json::from_value(record).unwrap();
        assert_eq!(participant.score, 0);
        assert_eq!(participant.attempts_played, 0);
        assert!(!participant.has_bonus);
        assert_eq!(participant.final_score, None);
    }

    #[test]
    fn test_participant_serializes_backend_names() {
        let participant = complete_participant();
        let value = serde_json::to_value(&participant).unwrap();

        assert!(value.get("tentativasJogadas").is_some());
        assert!(value.get("possuiBonus").is_some());
        assert!(value.get("nationalId").is_some());
        assert!(value.get("attempts_played").is_none());
    }
}
