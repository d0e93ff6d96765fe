//! services/api/src/adapters/file_store.rs
//!
//! This module contains the record store adapter, the concrete implementation
//! of the `RecordStore` port. The whole marketplace lives in a single JSON
//! document mapping usernames to artisan records.
//!
//! Every read-modify-write cycle holds one async mutex, so writers inside this
//! process are serialized. Writes land in a sibling temp file that is renamed
//! over the document, so a crash never leaves it truncated.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use kalakriti_core::domain::{
    ArtisanRecord, CatalogEntry, NewProduct, ProductId, ProductRecord, ProfileUpdate,
};
use kalakriti_core::ports::{RecordStore, StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::credentials::{hash_password, verify_password};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A JSON file adapter that implements the `RecordStore` port.
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Creates a new `FileStore` backed by the document at `path`. Nothing is
    /// read or written until the first operation.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Creates the store and makes sure the document's directory exists.
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let store = Self::new(path);
        if let Some(parent) = store.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Io(format!("creating {}: {}", parent.display(), e)))?;
        }
        let artisans = store.read_document().await;
        info!(
            path = %store.path.display(),
            artisans = artisans.len(),
            "Record store opened"
        );
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the document for display. Any failure reads as an empty store.
    async fn read_document(&self) -> BTreeMap<String, StoredArtisan> {
        self.read_document_for_update().await.unwrap_or_else(|e| {
            error!(path = %self.path.display(), error = %e, "Failed to read record store document");
            BTreeMap::new()
        })
    }

    /// Reads the document ahead of a write. A missing file or invalid JSON is
    /// an empty store; any other I/O failure is an error so nothing is overwritten.
    async fn read_document_for_update(&self) -> StoreResult<BTreeMap<String, StoredArtisan>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Record store document not found, starting empty");
                return Ok(BTreeMap::new());
            }
            Err(e) => {
                return Err(StoreError::Io(format!("reading {}: {}", self.path.display(), e)));
            }
        };

        match serde_json::from_str(&raw) {
            Ok(document) => Ok(document),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Record store document is not valid JSON, treating as empty");
                Ok(BTreeMap::new())
            }
        }
    }

    /// Serializes the document with four-space indentation and swaps it into place.
    async fn write_document(&self, document: &BTreeMap<String, StoredArtisan>) -> StoreResult<()> {
        let mut bytes = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut bytes, formatter);
        document
            .serialize(&mut serializer)
            .map_err(|e| StoreError::Io(format!("serializing record store: {}", e)))?;

        let tmp_path = self.temp_path();
        let io_err = |e: std::io::Error| StoreError::Io(format!("writing {}: {}", self.path.display(), e));

        let mut file = tokio::fs::File::create(&tmp_path).await.map_err(io_err)?;
        file.write_all(&bytes).await.map_err(io_err)?;
        file.sync_all().await.map_err(io_err)?;
        drop(file);
        tokio::fs::rename(&tmp_path, &self.path).await.map_err(io_err)?;

        debug!(path = %self.path.display(), bytes = bytes.len(), "Record store saved");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "database.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Runs one serialized load-modify-save cycle. Nothing is written when
    /// `change` fails.
    async fn modify<T, F>(&self, change: F) -> StoreResult<T>
    where
        F: FnOnce(&mut BTreeMap<String, ArtisanRecord>) -> StoreResult<T> + Send,
        T: Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut artisans = to_domain_map(self.read_document_for_update().await?);
        let outcome = change(&mut artisans)?;
        self.write_document(&from_domain_map(&artisans)).await?;
        Ok(outcome)
    }
}

//=========================================================================================
// "Impure" Document Record Structs
//=========================================================================================

/// An artisan as laid out in the JSON document. The username is the map key.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct StoredArtisan {
    password_hash: String,
    name: String,
    craft: String,
    art_description: String,
    products: BTreeMap<String, StoredProduct>,
}

impl StoredArtisan {
    fn to_domain(self, username: String) -> ArtisanRecord {
        ArtisanRecord {
            username,
            password_hash: self.password_hash,
            display_name: self.name,
            craft_type: self.craft,
            story_text: self.art_description,
            products: self
                .products
                .into_iter()
                .map(|(id, product)| (id, product.to_domain()))
                .collect(),
        }
    }

    fn from_domain(artisan: &ArtisanRecord) -> Self {
        Self {
            password_hash: artisan.password_hash.clone(),
            name: artisan.display_name.clone(),
            craft: artisan.craft_type.clone(),
            art_description: artisan.story_text.clone(),
            products: artisan
                .products
                .iter()
                .map(|(id, product)| (id.clone(), StoredProduct::from_domain(product)))
                .collect(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct StoredProduct {
    name: String,
    price: f64,
    materials: String,
    description_story: String,
    description_bullets: String,
    description_social: String,
    craft_type: String,
}

impl StoredProduct {
    fn to_domain(self) -> ProductRecord {
        ProductRecord {
            name: self.name,
            price: self.price,
            materials: self.materials,
            craft_type: self.craft_type,
            description_story: self.description_story,
            description_bullets: self.description_bullets,
            description_social: self.description_social,
        }
    }

    fn from_domain(product: &ProductRecord) -> Self {
        Self {
            name: product.name.clone(),
            price: product.price,
            materials: product.materials.clone(),
            description_story: product.description_story.clone(),
            description_bullets: product.description_bullets.clone(),
            description_social: product.description_social.clone(),
            craft_type: product.craft_type.clone(),
        }
    }
}

fn to_domain_map(document: BTreeMap<String, StoredArtisan>) -> BTreeMap<String, ArtisanRecord> {
    document
        .into_iter()
        .map(|(username, stored)| {
            let artisan = stored.to_domain(username.clone());
            (username, artisan)
        })
        .collect()
}

fn from_domain_map(artisans: &BTreeMap<String, ArtisanRecord>) -> BTreeMap<String, StoredArtisan> {
    artisans
        .iter()
        .map(|(username, artisan)| (username.clone(), StoredArtisan::from_domain(artisan)))
        .collect()
}

fn validate_product(product: &NewProduct) -> StoreResult<()> {
    if product.name.trim().is_empty() {
        return Err(StoreError::InvalidProduct("a product name is required".to_string()));
    }
    if !product.price.is_finite() || product.price < 0.0 {
        return Err(StoreError::InvalidProduct(format!(
            "price must be a non-negative amount, got {}",
            product.price
        )));
    }
    Ok(())
}

fn matches_search(product: &ProductRecord, needle: &str) -> bool {
    product.name.to_lowercase().contains(needle) || product.craft_type.to_lowercase().contains(needle)
}

//=========================================================================================
// `RecordStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl RecordStore for FileStore {
    async fn load(&self) -> BTreeMap<String, ArtisanRecord> {
        to_domain_map(self.read_document().await)
    }

    async fn save(&self, artisans: &BTreeMap<String, ArtisanRecord>) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        self.write_document(&from_domain_map(artisans)).await
    }

    async fn register(&self, username: &str, password: &str) -> StoreResult<()> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(StoreError::MissingCredentials);
        }
        let password_hash = hash_password(password)?;

        self.modify(|artisans| {
            if artisans.contains_key(username) {
                return Err(StoreError::UsernameTaken);
            }
            artisans.insert(username.to_string(), ArtisanRecord::new(username, password_hash));
            Ok(())
        })
        .await?;

        info!(username, "Artisan registered");
        Ok(())
    }

    async fn authenticate(&self, username: &str, password: &str) -> StoreResult<ArtisanRecord> {
        let mut artisans = self.load().await;
        let artisan = artisans.remove(username).ok_or(StoreError::InvalidCredentials)?;
        if !verify_password(password, &artisan.password_hash) {
            warn!(username, "Rejected login attempt");
            return Err(StoreError::InvalidCredentials);
        }
        Ok(artisan)
    }

    async fn get_artisan(&self, username: &str) -> StoreResult<ArtisanRecord> {
        self.load()
            .await
            .remove(username)
            .ok_or_else(|| StoreError::UnknownArtisan(username.to_string()))
    }

    async fn update_profile(&self, username: &str, update: ProfileUpdate) -> StoreResult<ArtisanRecord> {
        let updated = self
            .modify(|artisans| {
                let artisan = artisans
                    .get_mut(username)
                    .ok_or_else(|| StoreError::UnknownArtisan(username.to_string()))?;
                if let Some(display_name) = update.display_name {
                    artisan.display_name = display_name;
                }
                if let Some(craft_type) = update.craft_type {
                    artisan.craft_type = craft_type;
                }
                if let Some(story_text) = update.story_text {
                    artisan.story_text = story_text;
                }
                Ok(artisan.clone())
            })
            .await?;

        info!(username, "Profile saved");
        Ok(updated)
    }

    async fn add_product(&self, username: &str, product: NewProduct) -> StoreResult<ProductId> {
        validate_product(&product)?;

        let product_id = self
            .modify(|artisans| {
                let artisan = artisans
                    .get_mut(username)
                    .ok_or_else(|| StoreError::UnknownArtisan(username.to_string()))?;

                let mut product_id = Uuid::new_v4().to_string();
                while artisan.products.contains_key(&product_id) {
                    product_id = Uuid::new_v4().to_string();
                }

                let record = ProductRecord {
                    name: product.name,
                    price: product.price,
                    materials: product.materials,
                    craft_type: artisan.craft_type.clone(),
                    description_story: product.description_story,
                    description_bullets: product.description_bullets,
                    description_social: product.description_social,
                };
                artisan.products.insert(product_id.clone(), record);
                Ok(product_id)
            })
            .await?;

        info!(username, %product_id, "Product added");
        Ok(product_id)
    }

    async fn list_products(&self, username: &str) -> StoreResult<Vec<(ProductId, ProductRecord)>> {
        let artisan = self.get_artisan(username).await?;
        Ok(artisan.products.into_iter().collect())
    }

    async fn catalog(&self, search: Option<&str>) -> Vec<CatalogEntry> {
        let needle = search
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        let mut entries = Vec::new();
        for (username, artisan) in self.load().await {
            let artisan_name = if artisan.display_name.trim().is_empty() {
                username.clone()
            } else {
                artisan.display_name.clone()
            };
            let artisan_story = if artisan.story_text.trim().is_empty() {
                "No story provided.".to_string()
            } else {
                artisan.story_text.clone()
            };

            for (product_id, product) in artisan.products {
                if let Some(needle) = needle.as_deref() {
                    if !matches_search(&product, needle) {
                        continue;
                    }
                }
                entries.push(CatalogEntry {
                    product_id,
                    artisan_username: username.clone(),
                    artisan_name: artisan_name.clone(),
                    artisan_story: artisan_story.clone(),
                    product,
                });
            }
        }
        entries
    }
}
