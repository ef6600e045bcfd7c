//! Document database access through the Firestore REST API

mod filter;
mod memory;
mod query;
mod value;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::auth::{SharedSession, TokenRefresher};
use crate::config::{BackendConfig, ClientOptions};
use crate::error::{Error, Result};
use crate::fetch::Fetch;

pub use filter::*;
pub use memory::*;
pub use query::*;
pub use value::*;

/// The document store capabilities the app relies on.
///
/// Collections are slash-separated paths, so a sub-collection reads
/// `categories/{categoryId}/courses`.
#[async_trait]
pub trait Store: Send + Sync {
    /// List every document of a collection, in the backend's order
    async fn list_documents(&self, collection: &str) -> Result<Vec<Document>>;

    /// Read one document; `Ok(None)` when it does not exist
    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    /// Replace a document's fields entirely, creating it when missing
    async fn set_document(&self, collection: &str, id: &str, fields: Map<String, Value>)
        -> Result<()>;

    /// Documents whose `field OP value` holds, ordered by `field` ascending
    async fn query_range(
        &self,
        collection: &str,
        field: &str,
        op: FilterOperator,
        value: Value,
    ) -> Result<Vec<Document>>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<RawDocument>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// Client for the Firestore REST API
#[derive(Clone)]
pub struct FirestoreClient {
    /// `{firestore_url}/projects/{project}/databases/{database}/documents`
    documents_url: String,

    /// The web API key of the project
    key: String,

    /// HTTP client
    client: Client,

    /// Session whose ID token authorizes requests
    session: SharedSession,

    /// Renews the session's ID token once it expires
    refresher: TokenRefresher,
}

impl FirestoreClient {
    /// Create a new FirestoreClient
    pub fn new(
        config: &BackendConfig,
        options: &ClientOptions,
        client: Client,
        session: SharedSession,
    ) -> Self {
        Self {
            documents_url: format!(
                "{}/projects/{}/databases/{}/documents",
                options.firestore_url, config.project_id, options.database_id
            ),
            key: config.api_key.clone(),
            refresher: TokenRefresher::new(config, options, client.clone()),
            client,
            session,
        }
    }

    async fn token(&self) -> Result<Option<String>> {
        self.session.live_token(&self.refresher).await
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/{}", self.documents_url, encode_path(collection))
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}", self.collection_url(collection), urlencoding::encode(id))
    }

    /// `runQuery` is issued against the parent document of the collection
    fn run_query_url(&self, collection: &str) -> (String, String) {
        let collection = collection.trim_matches('/');
        match collection.rsplit_once('/') {
            Some((parent, collection_id)) => (
                format!("{}/{}:runQuery", self.documents_url, encode_path(parent)),
                collection_id.to_string(),
            ),
            None => (
                format!("{}:runQuery", self.documents_url),
                collection.to_string(),
            ),
        }
    }
}

/// Percent-encode every segment of a slash-separated document path.
/// Document ids may hold `#`, `?`, `%` or spaces.
fn encode_path(path: &str) -> String {
    path.trim_matches('/')
        .split('/')
        .map(urlencoding::encode)
        .collect::<Vec<_>>()
        .join("/")
}

#[async_trait]
impl Store for FirestoreClient {
    async fn list_documents(&self, collection: &str) -> Result<Vec<Document>> {
        let url = self.collection_url(collection);
        let token = self.token().await?;
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut fetch = Fetch::get(&self.client, &url)
                .query("key", &self.key)
                .maybe_bearer_auth(token.as_deref());
            if let Some(page) = &page_token {
                fetch = fetch.query("pageToken", page);
            }

            let page = fetch
                .execute::<ListDocumentsResponse>()
                .await?
                .map_err(|e| Error::fetch(format!("listing {}: {}", collection, e)))?;

            documents.extend(page.documents.iter().map(RawDocument::decode));
            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        debug!("Listed {} documents from {}", documents.len(), collection);
        Ok(documents)
    }

    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let url = self.document_url(collection, id);
        let token = self.token().await?;

        let result = Fetch::get(&self.client, &url)
            .query("key", &self.key)
            .maybe_bearer_auth(token.as_deref())
            .execute::<RawDocument>()
            .await?;

        match result {
            Ok(raw) => Ok(Some(raw.decode())),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(Error::fetch(format!("reading {}/{}: {}", collection, id, e))),
        }
    }

    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<()> {
        let url = self.document_url(collection, id);
        let body = json!({ "fields": encode_fields(&fields) });
        let token = self.token().await?;

        // PATCH without an update mask replaces the whole document
        Fetch::patch(&self.client, &url)
            .query("key", &self.key)
            .maybe_bearer_auth(token.as_deref())
            .json(&body)?
            .execute::<RawDocument>()
            .await?
            .map_err(|e| Error::fetch(format!("writing {}/{}: {}", collection, id, e)))?;

        debug!("Wrote document {}/{}", collection, id);
        Ok(())
    }

    async fn query_range(
        &self,
        collection: &str,
        field: &str,
        op: FilterOperator,
        value: Value,
    ) -> Result<Vec<Document>> {
        let (url, collection_id) = self.run_query_url(collection);
        let query = StructuredQuery::new(&collection_id).filter(field, op, &value);
        let token = self.token().await?;

        let rows = Fetch::post(&self.client, &url)
            .query("key", &self.key)
            .maybe_bearer_auth(token.as_deref())
            .json(&query.to_request())?
            .execute::<Vec<RunQueryResponse>>()
            .await?
            .map_err(|e| Error::fetch(format!("querying {}: {}", collection, e)))?;

        Ok(rows
            .iter()
            .filter_map(|row| row.document.as_ref())
            .map(RawDocument::decode)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Auth, FirebaseAuth, Session};
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DOCS: &str = "/projects/demo/databases/(default)/documents";

    fn client_for(server: &MockServer) -> FirestoreClient {
        client_with_session(server, SharedSession::new())
    }

    fn client_with_session(server: &MockServer, session: SharedSession) -> FirestoreClient {
        let config = BackendConfig::new("demo", "web-key").unwrap();
        let options = ClientOptions::default().with_base_url(&server.uri());
        FirestoreClient::new(&config, &options, Client::new(), session)
    }

    fn expired_session() -> SharedSession {
        let mut session = Session::new("stale".into(), "refresh-1".into(), "u1".into(), 3600);
        session.expires_at = Some(0);
        let shared = SharedSession::new();
        shared.set(Some(session));
        shared
    }

    #[tokio::test]
    async fn test_list_documents_follows_pages() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("{}/categories", DOCS)))
            .and(query_param("pageToken", "p2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "documents": [
                    { "name": "projects/demo/databases/(default)/documents/categories/sci",
                      "fields": { "title": { "stringValue": "Science" } } }
                ]
            })))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("{}/categories", DOCS)))
            .and(query_param("key", "web-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "documents": [
                    { "name": "projects/demo/databases/(default)/documents/categories/math",
                      "fields": { "title": { "stringValue": "Math" } } }
                ],
                "nextPageToken": "p2"
            })))
            .mount(&mock_server)
            .await;

        let docs = client_for(&mock_server).list_documents("categories").await.unwrap();

        let ids: Vec<_> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["math", "sci"]);
        assert_eq!(docs[1].fields["title"], "Science");
    }

    #[tokio::test]
    async fn test_empty_collection_lists_nothing() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("{}/categories/math/courses", DOCS)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&mock_server)
            .await;

        let docs = client_for(&mock_server)
            .list_documents("categories/math/courses")
            .await
            .unwrap();
        assert!(docs.is_empty());
    }

    #[tokio::test]
    async fn test_get_missing_document_is_none() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("{}/users/nobody", DOCS)))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": { "code": 404, "message": "Document not found", "status": "NOT_FOUND" }
            })))
            .mount(&mock_server)
            .await;

        let doc = client_for(&mock_server).get_document("users", "nobody").await.unwrap();
        assert!(doc.is_none());
    }

    #[tokio::test]
    async fn test_permission_denied_is_a_fetch_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("{}/users/u1", DOCS)))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": { "code": 403, "message": "Missing or insufficient permissions.", "status": "PERMISSION_DENIED" }
            })))
            .mount(&mock_server)
            .await;

        let result = client_for(&mock_server).get_document("users", "u1").await;
        assert!(matches!(result, Err(Error::Fetch(_))));
    }

    #[tokio::test]
    async fn test_set_document_sends_typed_fields() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path(format!("{}/users/u1", DOCS)))
            .and(body_json(json!({
                "fields": {
                    "username": { "stringValue": "ada" },
                    "bio": { "stringValue": "" }
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "projects/demo/databases/(default)/documents/users/u1",
                "fields": {}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let fields = json!({ "username": "ada", "bio": "" });
        client_for(&mock_server)
            .set_document("users", "u1", fields.as_object().unwrap().clone())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_query_range_posts_to_parent_document() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("{}/categories/sci:runQuery", DOCS)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "document": {
                    "name": "projects/demo/databases/(default)/documents/categories/sci/courses/c1",
                    "fields": { "courseName": { "stringValue": "Science 101" } } },
                  "readTime": "2024-01-01T00:00:00Z" },
                { "readTime": "2024-01-01T00:00:00Z" }
            ])))
            .mount(&mock_server)
            .await;

        let docs = client_for(&mock_server)
            .query_range("categories/sci/courses", "courseName", FilterOperator::Gte, json!("Sci"))
            .await
            .unwrap();

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "c1");
        assert_eq!(docs[0].fields["courseName"], "Science 101");
    }

    #[tokio::test]
    async fn test_reserved_characters_in_ids_are_encoded() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("{}/categories/c%231/courses", DOCS)))
            .and(query_param("key", "web-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "documents": [
                    { "name": "projects/demo/databases/(default)/documents/categories/c#1/courses/alg",
                      "fields": { "courseName": { "stringValue": "Algebra" } } }
                ]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path(format!("{}/categories/c%231:runQuery", DOCS)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("{}/categories/c%231/courses/a%20b", DOCS)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "projects/demo/databases/(default)/documents/categories/c#1/courses/a b",
                "fields": {}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let docs = client.list_documents("categories/c#1/courses").await.unwrap();
        assert_eq!(docs[0].id, "alg");

        let matches = client
            .query_range("categories/c#1/courses", "courseName", FilterOperator::Gte, json!("A"))
            .await
            .unwrap();
        assert!(matches.is_empty());

        let doc = client.get_document("categories/c#1/courses", "a b").await.unwrap();
        assert!(doc.is_some());
    }

    #[tokio::test]
    async fn test_expired_session_is_refreshed_before_the_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .and(query_param("key", "web-key"))
            .and(body_json(json!({ "grant_type": "refresh_token", "refresh_token": "refresh-1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id_token": "fresh",
                "refresh_token": "refresh-2",
                "expires_in": "3600",
                "token_type": "Bearer",
                "user_id": "u1",
                "project_id": "demo"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("{}/users/u1", DOCS)))
            .and(header("authorization", "Bearer fresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "projects/demo/databases/(default)/documents/users/u1",
                "fields": { "username": { "stringValue": "ada" } }
            })))
            .expect(2)
            .mount(&mock_server)
            .await;

        let session = expired_session();
        let client = client_with_session(&mock_server, session.clone());

        let doc = client.get_document("users", "u1").await.unwrap().unwrap();
        assert_eq!(doc.fields["username"], "ada");
        assert_eq!(session.token().as_deref(), Some("fresh"));
        assert_eq!(session.get().unwrap().refresh_token, "refresh-2");

        // the renewed token is reused without another refresh
        client.get_document("users", "u1").await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_refresh_signs_the_user_out() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "code": 400, "message": "TOKEN_EXPIRED", "status": "INVALID_ARGUMENT" }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("{}/users/u1", DOCS)))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": { "code": 404, "message": "Document not found", "status": "NOT_FOUND" }
            })))
            .mount(&mock_server)
            .await;

        let session = expired_session();
        let config = BackendConfig::new("demo", "web-key").unwrap();
        let options = ClientOptions::default().with_base_url(&mock_server.uri());
        let auth = FirebaseAuth::new(&config, &options, Client::new(), session.clone());
        let client = client_with_session(&mock_server, session.clone());
        assert_eq!(auth.current_user_id().as_deref(), Some("u1"));

        assert!(client.get_document("users", "u1").await.unwrap().is_none());
        assert!(session.get().is_none());
        assert!(auth.current_user_id().is_none());
    }
}
