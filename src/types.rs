use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// Users and roles

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub display_name: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserDetail {
    pub id: i64,
    pub username: String,
    pub display_name: Option<String>,
    pub is_active: bool,
    pub joined: String,
    pub modified: Option<String>,
    pub last_active: String,
}

/// Login lookup row; never serialized.
#[derive(Debug, Clone, FromRow)]
pub struct UserCredentials {
    pub id: i64,
    pub username: String,
    pub hashed_password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserCreate {
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(alias = "hashed_passcode")]
    pub password: String,
    #[serde(default)]
    pub roles: Vec<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub permissions: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoleCreate {
    pub name: String,
    #[serde(default)]
    pub permissions: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoleUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub permissions: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionSet {
    pub permissions: i64,
}

/// Plain acknowledgement body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub detail: String,
}

impl Message {
    pub fn new(detail: impl Into<String>) -> Self {
        Self { detail: detail.into() }
    }
}

// Lexicon

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "sl")]
    Slovene,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Slovene => "sl",
        }
    }

    pub fn other(&self) -> Language {
        match self {
            Language::English => Language::Slovene,
            Language::Slovene => Language::English,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Language::English),
            "sl" | "slovene" | "slovenian" => Ok(Language::Slovene),
            other => Err(format!("unknown language '{}', expected 'en' or 'sl'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct EntryMinimal {
    pub id: i64,
    pub lemma: String,
    pub description: Option<String>,
    pub language: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct EntryRow {
    pub id: i64,
    pub lemma: String,
    pub description: Option<String>,
    pub language: String,
    pub alt_form: Option<String>,
    pub created: String,
    pub modified: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Link {
    pub id: i64,
    pub title: Option<String>,
    pub url: String,
    pub entry_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TranslationState {
    pub id: i64,
    pub label: String,
}

/// An entry with everything hanging off it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub id: i64,
    pub lemma: String,
    pub description: Option<String>,
    pub language: String,
    pub alt_form: Option<String>,
    pub created: String,
    pub modified: Option<String>,
    pub suggestions: Vec<EntryMinimal>,
    pub relations: Vec<EntryMinimal>,
    pub links: Vec<Link>,
    pub categories: Vec<Category>,
}

impl From<EntryRow> for Entry {
    fn from(row: EntryRow) -> Self {
        Entry {
            id: row.id,
            lemma: row.lemma,
            description: row.description,
            language: row.language,
            alt_form: row.alt_form,
            created: row.created,
            modified: row.modified,
            suggestions: Vec::new(),
            relations: Vec::new(),
            links: Vec::new(),
            categories: Vec::new(),
        }
    }
}

/// An entry together with its translation, if any.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryPair {
    pub original: Entry,
    pub translation: Option<Entry>,
    pub translation_state: Option<TranslationState>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EntryCreate {
    #[serde(alias = "word")]
    pub lemma: String,
    #[serde(default)]
    pub description: Option<String>,
    pub language: String,
    #[serde(default)]
    pub alt_form: Option<String>,
}

/// Body for the language-scoped endpoints, where the language comes from the path.
#[derive(Debug, Clone, Deserialize)]
pub struct ScopedEntryCreate {
    #[serde(alias = "word")]
    pub lemma: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub alt_form: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryUpdate {
    #[serde(default, alias = "word")]
    pub lemma: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub alt_form: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinkCreate {
    #[serde(default)]
    pub title: Option<String>,
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinkUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuggestionCreate {
    pub child_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranslationCreate {
    pub translation_id: i64,
    #[serde(default)]
    pub state_id: Option<i64>,
    #[serde(default)]
    pub state_label: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelationCreate {
    pub related_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryCreate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranslationStateCreate {
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryList {
    pub entries: Vec<EntryMinimal>,
    pub full_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryList {
    pub categories: Vec<Category>,
    pub full_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationStateList {
    pub translation_states: Vec<TranslationState>,
    pub full_count: i64,
}

/// One row of a full search: either side may be missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPair {
    pub english: Option<EntryMinimal>,
    pub slovene: Option<EntryMinimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPairList {
    pub entries: Vec<SearchPair>,
    pub full_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecentEntry {
    pub id: i64,
    pub lemma: String,
    pub description: Option<String>,
    pub language: String,
    pub created: String,
    pub modified: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i64,
    pub table_name: String,
    pub action: String,
    pub record_id: i64,
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventList {
    pub events: Vec<Event>,
    pub full_count: i64,
}
