//! crates/kalakriti_core/src/domain.rs
//!
//! Defines the pure, core data structures for the marketplace.
//! These structs are independent of the on-disk document or any wire format.

use std::collections::BTreeMap;

/// Opaque identifier of a product. Generated by the record store.
pub type ProductId = String;

/// An artisan account together with its profile and product listings.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArtisanRecord {
    pub username: String,
    /// Digest of the chosen password. Never the clear-text credential.
    pub password_hash: String,
    pub display_name: String,
    pub craft_type: String,
    pub story_text: String,
    pub products: BTreeMap<ProductId, ProductRecord>,
}

impl ArtisanRecord {
    /// A freshly registered artisan: empty profile, no products.
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            ..Default::default()
        }
    }

    /// The AI tools need both a name and a story to work with.
    pub fn profile_complete(&self) -> bool {
        !self.display_name.trim().is_empty() && !self.story_text.trim().is_empty()
    }
}

/// A single listed product, owned by exactly one artisan.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductRecord {
    pub name: String,
    pub price: f64,
    pub materials: String,
    /// Copied from the owning artisan when the product is created.
    pub craft_type: String,
    pub description_story: String,
    /// Newline-joined `- item` lines, see [`render_bullets`].
    pub description_bullets: String,
    pub description_social: String,
}

/// What a caller supplies when listing a new product. The store fills in
/// the id and the craft type.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    pub materials: String,
    pub description_story: String,
    pub description_bullets: String,
    pub description_social: String,
}

/// A partial profile edit. `None` leaves the stored value untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub craft_type: Option<String>,
    pub story_text: Option<String>,
}

/// One product in the public marketplace listing, joined with its artisan.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub product_id: ProductId,
    pub artisan_username: String,
    pub artisan_name: String,
    pub artisan_story: String,
    pub product: ProductRecord,
}

//=========================================================================================
// Generated Content
//=========================================================================================

/// Three description styles for a product listing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductDescriptions {
    pub story_driven: String,
    pub bullet_points: Vec<String>,
    pub social_caption: String,
}

/// A short social-media campaign. Three posts are requested but not enforced.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SocialPlan {
    pub plan_title: String,
    pub posts: Vec<SocialPost>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SocialPost {
    pub day_title: String,
    pub suggested_image: String,
    pub caption: String,
}

/// Joins bullet points into the single string stored on a product.
pub fn render_bullets(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}
