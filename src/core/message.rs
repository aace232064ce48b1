use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::ChatError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    pub fn is_user(self) -> bool {
        self == Role::User
    }

    pub fn is_assistant(self) -> bool {
        self == Role::Assistant
    }
}

impl AsRef<str> for Role {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<&str> for Role {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "system" => Ok(Role::System),
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            _ => Err(format!("invalid message role: {value}")),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        value.as_str().to_string()
    }
}

/// The two media tags understood in user input: `<image:...>` and `<video:...>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn tag(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "image" => Some(MediaKind::Image),
            "video" => Some(MediaKind::Video),
            _ => None,
        }
    }
}

/// Where a media locator points. Nothing is checked on disk or over the
/// network until a backend actually loads the media.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MediaSource {
    LocalPath(String),
    RemoteUrl(String),
}

impl MediaSource {
    /// Classifies a locator by scheme prefix only.
    pub fn from_locator(locator: &str) -> Self {
        if is_remote_locator(locator) {
            MediaSource::RemoteUrl(locator.to_string())
        } else {
            MediaSource::LocalPath(locator.to_string())
        }
    }

    pub fn locator(&self) -> &str {
        match self {
            MediaSource::LocalPath(path) => path,
            MediaSource::RemoteUrl(url) => url,
        }
    }

    pub fn local_path(&self) -> Option<&Path> {
        match self {
            MediaSource::LocalPath(path) => Some(Path::new(path)),
            MediaSource::RemoteUrl(_) => None,
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, MediaSource::RemoteUrl(_))
    }
}

fn is_remote_locator(locator: &str) -> bool {
    let lowered = locator.get(..8).unwrap_or(locator).to_ascii_lowercase();
    lowered.starts_with("http://") || lowered.starts_with("https://")
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaReference {
    kind: MediaKind,
    source: MediaSource,
    raw_token: String,
}

impl MediaReference {
    pub fn new(kind: MediaKind, locator: &str, raw_token: impl Into<String>) -> Self {
        Self {
            kind,
            source: MediaSource::from_locator(locator),
            raw_token: raw_token.into(),
        }
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn source(&self) -> &MediaSource {
        &self.source
    }

    pub fn locator(&self) -> &str {
        self.source.locator()
    }

    /// The tag exactly as the user typed it, e.g. `<image:/tmp/cat.png>`.
    pub fn raw_token(&self) -> &str {
        &self.raw_token
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ContentPartRecord", into = "ContentPartRecord")]
pub enum ContentPart {
    Text(String),
    Image(MediaReference),
    Video(MediaReference),
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text(text.into())
    }

    /// Wraps a reference in the variant matching its kind.
    pub fn media(reference: MediaReference) -> Self {
        match reference.kind() {
            MediaKind::Image => ContentPart::Image(reference),
            MediaKind::Video => ContentPart::Video(reference),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ContentPart::Text(_) => "text",
            ContentPart::Image(_) => MediaKind::Image.tag(),
            ContentPart::Video(_) => MediaKind::Video.tag(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentPart::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_media(&self) -> Option<&MediaReference> {
        match self {
            ContentPart::Image(reference) | ContentPart::Video(reference) => Some(reference),
            ContentPart::Text(_) => None,
        }
    }
}

/// Flat record form of a content part: `{"type": "image", "locator": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ContentPartRecord {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    locator: Option<String>,
}

impl From<ContentPart> for ContentPartRecord {
    fn from(part: ContentPart) -> Self {
        match part {
            ContentPart::Text(text) => ContentPartRecord {
                kind: "text".to_string(),
                text: Some(text),
                locator: None,
            },
            ContentPart::Image(reference) | ContentPart::Video(reference) => ContentPartRecord {
                kind: reference.kind().tag().to_string(),
                text: None,
                locator: Some(reference.locator().to_string()),
            },
        }
    }
}

impl TryFrom<ContentPartRecord> for ContentPart {
    type Error = String;

    fn try_from(record: ContentPartRecord) -> Result<Self, Self::Error> {
        if record.kind == "text" {
            return record
                .text
                .map(ContentPart::Text)
                .ok_or_else(|| "text part is missing its text".to_string());
        }

        let kind = MediaKind::from_tag(&record.kind)
            .ok_or_else(|| format!("invalid content part type: {}", record.kind))?;
        let locator = record
            .locator
            .filter(|locator| !locator.is_empty())
            .ok_or_else(|| format!("{} part is missing its locator", record.kind))?;
        let raw_token = format!("<{}:{}>", kind.tag(), locator);
        Ok(ContentPart::media(MediaReference::new(
            kind, &locator, raw_token,
        )))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    role: Role,
    content: Vec<ContentPart>,
}

impl Message {
    /// Assembles a message from resolved parts, keeping their order.
    pub fn build(role: Role, parts: Vec<ContentPart>) -> Result<Self, ChatError> {
        if parts.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        Ok(Self {
            role,
            content: parts,
        })
    }

    /// A single-text-part message; used for generated replies and system headers.
    pub fn from_text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            content: vec![ContentPart::Text(text.into())],
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &[ContentPart] {
        &self.content
    }

    pub fn is_user(&self) -> bool {
        self.role.is_user()
    }

    pub fn is_assistant(&self) -> bool {
        self.role.is_assistant()
    }

    /// Text parts concatenated in order, media skipped.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(ContentPart::as_text)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Text with media rendered back as their original tags.
    pub fn transcript_text(&self) -> String {
        self.content
            .iter()
            .map(|part| match part {
                ContentPart::Text(text) => text.as_str(),
                ContentPart::Image(reference) | ContentPart::Video(reference) => {
                    reference.raw_token()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn media(&self) -> impl Iterator<Item = &MediaReference> {
        self.content.iter().filter_map(ContentPart::as_media)
    }
}
