//! User profiles stored in the `users` collection

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::store::{Document, Store};

/// Collection of profile documents, keyed by user id
pub const USERS: &str = "users";

/// Languages offered by the create-profile form
pub const LANGUAGES: [&str; 5] = ["English", "Spanish", "French", "German", "Chinese"];

/// A user's profile. Every field is free text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub username: String,
    pub date_of_birth: String,
    /// The last language picked, despite the plural name
    pub languages: String,
    pub bio: String,
}

impl UserProfile {
    fn from_document(doc: &Document) -> Result<Self> {
        Ok(Self {
            username: doc.string_or("username", "")?,
            date_of_birth: doc.string_or("dateOfBirth", "")?,
            languages: doc.string_or("languages", "")?,
            bio: doc.string_or("bio", "")?,
        })
    }

    fn to_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("username".into(), Value::String(self.username.clone()));
        fields.insert("dateOfBirth".into(), Value::String(self.date_of_birth.clone()));
        fields.insert("languages".into(), Value::String(self.languages.clone()));
        fields.insert("bio".into(), Value::String(self.bio.clone()));
        fields
    }
}

/// Format a picked date the way the profile stores it, e.g. `March 05, 2001`
pub fn format_date_of_birth(date: NaiveDate) -> String {
    date.format("%B %d, %Y").to_string()
}

/// Load the profile of `user_id`; `Error::NotFound` when none was saved yet
pub async fn load_profile(store: &dyn Store, user_id: &str) -> Result<UserProfile> {
    let doc = store
        .get_document(USERS, user_id)
        .await
        .map_err(Error::into_fetch)?
        .ok_or_else(|| Error::not_found(format!("profile of {}", user_id)))?;

    UserProfile::from_document(&doc).map_err(Error::into_fetch)
}

/// Whether `user_id` has saved a profile
pub async fn profile_exists(store: &dyn Store, user_id: &str) -> Result<bool> {
    Ok(store
        .get_document(USERS, user_id)
        .await
        .map_err(Error::into_fetch)?
        .is_some())
}

/// Save the profile of `user_id`, replacing any previous one entirely
pub async fn save_profile(store: &dyn Store, user_id: &str, profile: &UserProfile) -> Result<()> {
    store
        .set_document(USERS, user_id, profile.to_fields())
        .await
        .map_err(Error::into_fetch)
}
