//! Document operations through the Firestore REST API

mod filter;
mod query;
mod value;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::auth::TokenProvider;
use crate::config::{ClientOptions, FirebaseConfig};
use crate::error::Error;
use crate::fetch::{api_error, Fetch};
use crate::gateway::DocumentStore;

pub use filter::*;
pub use query::*;
pub use value::{FieldValue, Fields};

use value::{decode_fields, encode_fields, WireValue};

/// A document read from a collection
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Last segment of the document path
    pub id: String,

    pub fields: Fields,
}

impl Document {
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }
}

#[derive(Debug, Deserialize)]
struct WireDocument {
    name: String,
    #[serde(default)]
    fields: BTreeMap<String, WireValue>,
}

impl WireDocument {
    fn into_document(self) -> Result<Document, Error> {
        let id = self
            .name
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        let fields = decode_fields(self.fields).map_err(|e| Error::malformed(&id, e))?;
        Ok(Document { id, fields })
    }
}

#[derive(Debug, Deserialize)]
struct RunQueryItem {
    #[serde(default)]
    document: Option<WireDocument>,
}

/// Client for Firestore documents
pub struct FirestoreClient {
    /// Project identifier
    project_id: String,

    /// HTTP client
    client: Client,

    /// Source of the bearer token
    tokens: TokenProvider,

    /// Client options
    options: ClientOptions,
}

impl FirestoreClient {
    /// Create a new FirestoreClient
    pub(crate) fn new(
        config: &FirebaseConfig,
        client: Client,
        tokens: TokenProvider,
        options: ClientOptions,
    ) -> Self {
        Self {
            project_id: config.project_id.clone(),
            client,
            tokens,
            options,
        }
    }

    /// Resource name of the database root
    fn documents_root(&self) -> String {
        format!("projects/{}/databases/(default)/documents", self.project_id)
    }

    fn get_url(&self, suffix: &str) -> String {
        format!(
            "{}/v1/{}{}",
            self.options.firestore_url,
            self.documents_root(),
            suffix
        )
    }

    fn document_url(&self, collection: &str, id: &str) -> Result<String, Error> {
        check_segment(collection)?;
        check_segment(id)?;
        Ok(self.get_url(&format!("/{}/{}", collection, id)))
    }

    /// Run a structured query
    pub async fn run_query(&self, query: &Query) -> Result<Vec<Document>, Error> {
        let url = self.get_url(":runQuery");
        let body = json!({ "structuredQuery": query.to_structured_query()? });
        let token = self.tokens.bearer().await?;

        let items = Fetch::post(&self.client, &url)
            .maybe_bearer_auth(token.as_deref())
            .timeout(self.options.request_timeout)
            .json(&body)?
            .execute::<Vec<RunQueryItem>>()
            .await
            .map_err(database_error)?;

        items
            .into_iter()
            .filter_map(|item| item.document)
            .map(WireDocument::into_document)
            .collect()
    }

    /// Fetch one document, `None` when it does not exist
    ///
    /// An id that cannot name a document (empty, or containing `/`) reads as absent.
    pub async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, Error> {
        check_segment(collection)?;
        if check_segment(id).is_err() {
            return Ok(None);
        }
        let url = self.document_url(collection, id)?;
        let token = self.tokens.bearer().await?;

        let response = Fetch::get(&self.client, &url)
            .maybe_bearer_auth(token.as_deref())
            .timeout(self.options.request_timeout)
            .execute_raw()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(database_error(api_error(response).await));
        }

        let document = response.json::<WireDocument>().await?;
        document.into_document().map(Some)
    }

    /// Create a document with a generated id
    ///
    /// Top-level [`FieldValue::ServerTimestamp`] fields are sent as
    /// `REQUEST_TIME` transforms so the stored value is the commit time.
    pub async fn add(&self, collection: &str, fields: Fields) -> Result<String, Error> {
        check_segment(collection)?;
        let id = Uuid::new_v4().simple().to_string();
        let name = format!("{}/{}/{}", self.documents_root(), collection, id);

        let (transforms, values): (Vec<_>, Vec<_>) = fields
            .into_iter()
            .partition(|(_, v)| matches!(v, FieldValue::ServerTimestamp));
        let values: Fields = values.into_iter().collect();

        let mut write = json!({
            "update": { "name": name, "fields": encode_fields(&values)? },
            "currentDocument": { "exists": false },
        });
        if !transforms.is_empty() {
            write["updateTransforms"] = transforms
                .iter()
                .map(|(field, _)| json!({ "fieldPath": field, "setToServerValue": "REQUEST_TIME" }))
                .collect();
        }

        let url = self.get_url(":commit");
        let token = self.tokens.bearer().await?;

        Fetch::post(&self.client, &url)
            .maybe_bearer_auth(token.as_deref())
            .timeout(self.options.request_timeout)
            .json(&json!({ "writes": [write] }))?
            .execute_empty()
            .await
            .map_err(database_error)?;

        Ok(id)
    }

    /// Delete a document
    pub async fn delete(&self, collection: &str, id: &str) -> Result<(), Error> {
        let url = self.document_url(collection, id)?;
        let token = self.tokens.bearer().await?;

        Fetch::delete(&self.client, &url)
            .maybe_bearer_auth(token.as_deref())
            .timeout(self.options.request_timeout)
            .execute_empty()
            .await
            .map_err(database_error)
    }
}

fn check_segment(segment: &str) -> Result<(), Error> {
    if segment.is_empty() || segment.contains('/') {
        return Err(Error::database(format!("invalid path segment: {:?}", segment)));
    }
    Ok(())
}

fn database_error(err: Error) -> Error {
    match err {
        Error::Api { status, message } => Error::database(format!("{} ({})", message, status)),
        other => other,
    }
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    async fn get_docs(&self, query: &Query) -> Result<Vec<Document>, Error> {
        self.run_query(query).await
    }

    async fn get_doc(&self, collection: &str, id: &str) -> Result<Option<Document>, Error> {
        self.get(collection, id).await
    }

    async fn add_doc(&self, collection: &str, fields: Fields) -> Result<String, Error> {
        self.add(collection, fields).await
    }

    async fn delete_doc(&self, collection: &str, id: &str) -> Result<(), Error> {
        self.delete(collection, id).await
    }
}
