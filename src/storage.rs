use serde_json::{Map, Value};
use std::{
    collections::BTreeMap,
    io,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tokio::{fs, sync::Mutex};
use tracing::{debug, info};
use uuid::Uuid;

pub const CAR_LOGS: &str = "car_logs";
pub const VISITORS: &str = "visitors";
pub const SLOTS: &str = "slots";
pub const AUTHORIZED_PLATES: &str = "authorized_plates";

/// Field holding the store-assigned identifier of every document.
pub const ID_FIELD: &str = "_id";

pub type Document = Map<String, Value>;

type Collections = BTreeMap<String, Vec<Document>>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("store file {} is not a valid document store: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to encode store: {0}")]
    Encode(serde_json::Error),
}

/// File-backed document store holding named collections of JSON documents.
///
/// A value of this type only exists after [`DocumentStore::connect`] has
/// loaded the backing file, so holders never see a half-initialized store.
#[derive(Debug)]
pub struct DocumentStore {
    path: PathBuf,
    collections: Mutex<Collections>,
}

impl DocumentStore {
    pub async fn connect(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let collections = load_collections(&path).await?;
        info!(
            path = %path.display(),
            collections = collections.len(),
            "document store connected"
        );

        Ok(Self {
            path,
            collections: Mutex::new(collections),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn find_all(&self, collection: &str) -> Vec<Document> {
        let collections = self.collections.lock().await;
        collections.get(collection).cloned().unwrap_or_default()
    }

    /// First document whose string `field` equals `value`, ignoring ASCII case.
    pub async fn find_one_ci(&self, collection: &str, field: &str, value: &str) -> Option<Document> {
        let collections = self.collections.lock().await;
        collections
            .get(collection)?
            .iter()
            .find(|doc| {
                doc.get(field)
                    .and_then(Value::as_str)
                    .is_some_and(|candidate| candidate.eq_ignore_ascii_case(value))
            })
            .cloned()
    }

    /// Appends `document` under a fresh id and persists the store.
    ///
    /// On a failed write the document is removed again before returning.
    pub async fn insert_one(&self, collection: &str, mut document: Document) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        document.insert(ID_FIELD.to_string(), Value::String(id.clone()));

        let mut collections = self.collections.lock().await;
        let created = !collections.contains_key(collection);
        collections.entry(collection.to_string()).or_default().push(document);

        if let Err(err) = persist_collections(&self.path, &collections).await {
            if created {
                collections.remove(collection);
            } else if let Some(docs) = collections.get_mut(collection) {
                docs.pop();
            }
            return Err(err);
        }

        debug!(collection, id = %id, "document inserted");
        Ok(id)
    }

    pub async fn collection_counts(&self) -> BTreeMap<String, usize> {
        let collections = self.collections.lock().await;
        collections
            .iter()
            .map(|(name, docs)| (name.clone(), docs.len()))
            .collect()
    }
}

async fn load_collections(path: &Path) -> Result<Collections, StoreError> {
    match fs::read(path).await {
        Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
            path: path.to_path_buf(),
            source,
        }),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Collections::default()),
        Err(err) => Err(err.into()),
    }
}

/// Writes a sibling temp file and renames it over the store, so the live
/// file is either the old or the new contents, never a partial write.
async fn persist_collections(path: &Path, collections: &Collections) -> Result<(), StoreError> {
    let payload = serde_json::to_vec_pretty(collections).map_err(StoreError::Encode)?;
    let staging = staging_path(path);

    let written = match fs::write(&staging, payload).await {
        Ok(()) => fs::rename(&staging, path).await,
        Err(err) => Err(err),
    };
    if let Err(err) = written {
        let _ = fs::remove_file(&staging).await;
        return Err(err.into());
    }
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
