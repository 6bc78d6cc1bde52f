use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const EVENT_ID_PREFIX: &str = "EVT";
pub const EVENT_ID_FIELD: &str = "event_id";
const EVENT_ID_SUFFIX_LEN: usize = 6;
const EVENT_ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub type EventDocument = Map<String, Value>;

// No collision check against stored events.
pub fn generate_event_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    let suffix: String = (0..EVENT_ID_SUFFIX_LEN)
        .map(|_| EVENT_ID_ALPHABET[rng.gen_range(0..EVENT_ID_ALPHABET.len())] as char)
        .collect();
    format!("{}{}", EVENT_ID_PREFIX, suffix)
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CreateEventResponse {
    pub message: String,
    pub event_id: String,
}

impl CreateEventResponse {
    pub fn created(event_id: String) -> Self {
        Self {
            message: "Event created".to_string(),
            event_id,
        }
    }
}

/// Typed view over the fields events are expected to carry. Stored documents
/// are never validated against it; every field is optional.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct EventRecord {
    pub event_id: Option<String>,
    pub event_name: Option<String>,
    pub location: Option<String>,
    pub date: Option<String>,
    pub description: Option<String>,
    pub sponsorship: Option<String>,
    pub organizer: Option<String>,
    pub contact: Option<String>,
}

pub const EVENT_FIELDS: [&str; 7] = [
    "event_name",
    "location",
    "date",
    "description",
    "sponsorship",
    "organizer",
    "contact",
];

impl EventRecord {
    pub fn from_document(doc: &EventDocument) -> Self {
        let field = |key: &str| -> Option<String> {
            match doc.get(key)? {
                Value::Null => None,
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            }
        };
        Self {
            event_id: field("event_id"),
            event_name: field("event_name"),
            location: field("location"),
            date: field("date"),
            description: field("description"),
            sponsorship: field("sponsorship"),
            organizer: field("organizer"),
            contact: field("contact"),
        }
    }

    pub fn summary_line(&self) -> String {
        let unknown = "-";
        format!(
            "{} | {} | {} | {}",
            self.event_id.as_deref().unwrap_or(unknown),
            self.event_name.as_deref().unwrap_or(unknown),
            self.date.as_deref().unwrap_or(unknown),
            self.location.as_deref().unwrap_or(unknown),
        )
    }
}
