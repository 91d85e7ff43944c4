//! Cloud Firestore backend over the REST v1 API.
//!
//! Firestore's streaming listen protocol is not exposed over plain REST, so
//! the live feed polls a structured query and pushes a snapshot whenever the
//! ordered result changes. Writes go through `documents:commit` so the open
//! time is stamped by the server (`REQUEST_TIME`), never by this client.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Method, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::error::{Result, StoreError};
use super::{FeedProducer, Snapshot, Subscription, TicketStore};
use crate::auth::{AuthProvider, FirebaseAuth};
use crate::ticket::{Document, ServerTimestamp, TicketFields};

/// Public Firestore REST endpoint.
pub const DEFAULT_FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum number of attempts for transient failures.
const MAX_RETRIES: u32 = 3;

/// Base delay between retries in milliseconds.
const RETRY_DELAY_MS: u64 = 500;

const AUTO_ID_LEN: usize = 20;
const AUTO_ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

const FIELD_NAMES: &str = "names";
const FIELD_LOCATION: &str = "location";
const FIELD_ISSUE: &str = "issue";

/// A Firestore typed value. Only the kinds tickets use are modelled.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Value {
    #[serde(default)]
    string_value: Option<String>,
    #[serde(default)]
    timestamp_value: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FirestoreDocument {
    name: String,
    #[serde(default)]
    fields: HashMap<String, Value>,
    #[serde(default)]
    create_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RunQueryItem {
    #[serde(default)]
    document: Option<FirestoreDocument>,
}

/// Ticket store backed by Cloud Firestore.
#[derive(Debug, Clone)]
pub struct FirestoreStore {
    client: Client,
    /// `projects/{p}/databases/(default)/documents`
    database_path: String,
    /// `{base}/projects/{p}/databases/(default)/documents`
    documents_url: String,
    auth: Arc<FirebaseAuth>,
    poll_interval: Duration,
}

impl FirestoreStore {
    /// Create a store for `project_id`.
    ///
    /// `base_url` is usually [`DEFAULT_FIRESTORE_URL`]; point it at the
    /// emulator for local testing.
    pub fn new(
        base_url: &str,
        project_id: &str,
        auth: Arc<FirebaseAuth>,
        poll_interval: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(StoreError::Network)?;

        let database_path = format!("projects/{}/databases/(default)/documents", project_id);
        let documents_url = format!("{}/{}", base_url.trim_end_matches('/'), database_path);

        info!(project_id, poll_secs = poll_interval.as_secs(), "Firestore store ready");
        Ok(Self {
            client,
            database_path,
            documents_url,
            auth,
            poll_interval,
        })
    }

    /// Run the ordered collection query once.
    #[instrument(skip(self))]
    pub async fn query(&self, collection: &str, order_key: &str) -> Result<Vec<Document>> {
        let url = format!("{}:runQuery", self.documents_url);
        let body = run_query_body(collection, order_key);
        let response = self.send(Method::POST, &url, Some(&body)).await?;

        let items: Vec<RunQueryItem> = serde_json::from_value(response)
            .map_err(|e| StoreError::InvalidResponse(format!("runQuery: {}", e)))?;

        let documents: Vec<Document> = items
            .into_iter()
            .filter_map(|item| item.document)
            .map(decode_document)
            .collect::<Result<_>>()?;
        debug!(count = documents.len(), "Query returned documents");
        Ok(documents)
    }

    /// Send a request with the signed-in user's token.
    ///
    /// Retries transient failures with exponential backoff and refreshes the
    /// ID token once if it was rejected.
    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<serde_json::Value> {
        let mut attempts = 0;
        let mut refreshed = false;

        loop {
            attempts += 1;
            debug!("Request attempt {}/{}", attempts, MAX_RETRIES);

            match self.execute(method.clone(), url, body).await {
                Ok(value) => return Ok(value),
                Err(StoreError::Unauthorized) if !refreshed => {
                    refreshed = true;
                    attempts -= 1;
                    warn!("ID token rejected, refreshing");
                    self.auth.refresh().await.map_err(|e| {
                        error!(error = %e, "Token refresh failed");
                        StoreError::Unauthorized
                    })?;
                }
                Err(e) if e.is_retryable() && attempts < MAX_RETRIES => {
                    let delay = retry_delay(attempts);
                    warn!(
                        "Request failed (attempt {}), retrying in {}ms: {}",
                        attempts, delay, e
                    );
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<serde_json::Value> {
        let user = self.auth.current_user().ok_or(StoreError::NotSignedIn)?;

        let mut request = self
            .client
            .request(method, url)
            .bearer_auth(&user.id_token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        handle_response(response).await
    }

    fn document_name(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.database_path, collection, id)
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.documents_url, collection, id)
    }
}

#[async_trait]
impl TicketStore for FirestoreStore {
    async fn subscribe(&self, collection: &str, order_key: &str) -> Result<Subscription> {
        let (subscription, producer) = Subscription::channel();
        let store = self.clone();
        let collection = collection.to_string();
        let order_key = order_key.to_string();

        tokio::spawn(async move {
            poll_feed(store, &collection, &order_key, producer).await;
            debug!(collection = %collection, "Firestore feed stopped");
        });

        Ok(subscription)
    }

    #[instrument(skip(self, fields))]
    async fn create(&self, collection: &str, fields: TicketFields) -> Result<()> {
        let id = auto_id();
        let name = self.document_name(collection, &id);
        let url = format!("{}:commit", self.documents_url);
        let body = commit_create_body(&name, &fields);

        self.send(Method::POST, &url, Some(&body)).await?;
        info!(id = %id, "Ticket created");
        Ok(())
    }

    #[instrument(skip(self, fields))]
    async fn update(&self, collection: &str, id: &str, fields: TicketFields) -> Result<()> {
        let url = format!(
            "{}?updateMask.fieldPaths={}&updateMask.fieldPaths={}&updateMask.fieldPaths={}&currentDocument.exists=true",
            self.document_url(collection, id),
            FIELD_NAMES,
            FIELD_LOCATION,
            FIELD_ISSUE
        );
        let body = json!({ "fields": encode_fields(&fields) });

        self.send(Method::PATCH, &url, Some(&body)).await?;
        info!("Ticket updated");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let url = self.document_url(collection, id);
        self.send(Method::DELETE, &url, None).await?;
        info!("Ticket deleted");
        Ok(())
    }
}

/// Poll the query and push a snapshot on the first result and on every change.
async fn poll_feed(store: FirestoreStore, collection: &str, order_key: &str, producer: FeedProducer) {
    let FeedProducer { tx, mut cancelled } = producer;
    let mut interval = tokio::time::interval(store.poll_interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut last: Option<Vec<Document>> = None;

    loop {
        tokio::select! {
            _ = &mut cancelled => return,
            _ = interval.tick() => {}
        }

        let result = tokio::select! {
            _ = &mut cancelled => return,
            result = store.query(collection, order_key) => result,
        };

        let item = match result {
            Ok(documents) if last.as_ref() == Some(&documents) => continue,
            Ok(documents) => {
                last = Some(documents.clone());
                Ok(Snapshot::new(documents))
            }
            Err(e) => {
                error!(error = %e, "Feed query failed");
                Err(e)
            }
        };
        let failed = item.is_err();

        tokio::select! {
            _ = &mut cancelled => return,
            sent = tx.send(item) => {
                if sent.is_err() {
                    return;
                }
            }
        }

        if failed {
            return;
        }
    }
}

async fn handle_response(response: Response) -> Result<serde_json::Value> {
    let status = response.status();
    let url = response.url().path().to_string();

    if status.is_success() {
        return response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| StoreError::InvalidResponse(format!("Failed to parse response: {}", e)));
    }

    let text = response.text().await.unwrap_or_default();
    debug!(status = %status, body = %text, "Store request failed");
    Err(StoreError::from_status(status, &format!("{} {}", url, text.trim())))
}

fn retry_delay(attempt: u32) -> u64 {
    RETRY_DELAY_MS * 2u64.pow(attempt.saturating_sub(1))
}

/// A 20-character document id in the style Firestore clients generate.
fn auto_id() -> String {
    let mut random = Vec::with_capacity(32);
    for _ in 0..2 {
        let uuid = Uuid::new_v4();
        // Bytes 6 and 8 carry the version and variant bits.
        random.extend(
            uuid.as_bytes()
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != 6 && *i != 8)
                .map(|(_, b)| *b),
        );
    }

    random
        .iter()
        .take(AUTO_ID_LEN)
        .map(|b| AUTO_ID_ALPHABET[*b as usize % AUTO_ID_ALPHABET.len()] as char)
        .collect()
}

fn encode_fields(fields: &TicketFields) -> serde_json::Value {
    json!({
        FIELD_NAMES: { "stringValue": fields.names },
        FIELD_LOCATION: { "stringValue": fields.location },
        FIELD_ISSUE: { "stringValue": fields.issue },
    })
}

fn run_query_body(collection: &str, order_key: &str) -> serde_json::Value {
    json!({
        "structuredQuery": {
            "from": [{ "collectionId": collection }],
            "orderBy": [{
                "field": { "fieldPath": order_key },
                "direction": "ASCENDING"
            }]
        }
    })
}

fn commit_create_body(document_name: &str, fields: &TicketFields) -> serde_json::Value {
    json!({
        "writes": [{
            "update": {
                "name": document_name,
                "fields": encode_fields(fields)
            },
            "updateTransforms": [{
                "fieldPath": crate::store::TIME_OPEN_FIELD,
                "setToServerValue": "REQUEST_TIME"
            }],
            "currentDocument": { "exists": false }
        }]
    })
}

fn decode_document(doc: FirestoreDocument) -> Result<Document> {
    let id = doc
        .name
        .rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| StoreError::InvalidResponse(format!("bad document name: {}", doc.name)))?
        .to_string();

    let string = |key: &str| {
        doc.fields
            .get(key)
            .and_then(|v| v.string_value.clone())
            .unwrap_or_default()
    };
    let fields = TicketFields::new(string(FIELD_NAMES), string(FIELD_LOCATION), string(FIELD_ISSUE));

    let time_open = match doc
        .fields
        .get(crate::store::TIME_OPEN_FIELD)
        .and_then(|v| v.timestamp_value.as_deref())
    {
        Some(raw) => ServerTimestamp::Final(parse_timestamp(raw)?),
        None => {
            let estimate = match doc.create_time.as_deref() {
                Some(raw) => parse_timestamp(raw)?,
                None => Utc::now(),
            };
            ServerTimestamp::Pending { estimate }
        }
    };

    Ok(Document {
        id,
        fields,
        time_open,
    })
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StoreError::InvalidResponse(format!("bad timestamp {}: {}", raw, e)))
}
