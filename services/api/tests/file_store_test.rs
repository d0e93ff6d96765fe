//! Integration tests for the JSON document record store.

use api_lib::adapters::FileStore;
use kalakriti_core::{NewProduct, ProfileUpdate, RecordStore, StoreError};
use tempfile::TempDir;

fn product(name: &str, price: f64, materials: &str) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        price,
        materials: materials.to_string(),
        description_story: String::new(),
        description_bullets: String::new(),
        description_social: String::new(),
    }
}

async fn open_store(dir: &TempDir) -> FileStore {
    FileStore::open(dir.path().join("database.json"))
        .await
        .expect("store should open")
}

#[tokio::test]
async fn registered_artisan_can_list_added_product() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    store.register("priya", "secret").await.unwrap();
    store
        .update_profile(
            "priya",
            ProfileUpdate {
                display_name: Some("Priya".to_string()),
                craft_type: Some("Weaving".to_string()),
                story_text: Some("I weave with my grandmother's loom.".to_string()),
            },
        )
        .await
        .unwrap();
    store
        .add_product("priya", product("Blue Scarf", 450.0, "Cotton"))
        .await
        .unwrap();

    let products = store.list_products("priya").await.unwrap();
    assert_eq!(products.len(), 1);
    let (_, scarf) = &products[0];
    assert_eq!(scarf.name, "Blue Scarf");
    assert_eq!(scarf.price, 450.0);
    assert_eq!(scarf.craft_type, "Weaving");
}

#[tokio::test]
async fn taken_username_leaves_document_unchanged() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    store.register("priya", "first").await.unwrap();
    let before = std::fs::read_to_string(store.path()).unwrap();

    let result = store.register("priya", "second").await;
    assert!(matches!(result, Err(StoreError::UsernameTaken)));

    let after = std::fs::read_to_string(store.path()).unwrap();
    assert_eq!(before, after);
    assert!(store.authenticate("priya", "first").await.is_ok());
}

#[tokio::test]
async fn empty_credentials_are_rejected() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    assert!(matches!(store.register("", "pw").await, Err(StoreError::MissingCredentials)));
    assert!(matches!(store.register("ravi", "").await, Err(StoreError::MissingCredentials)));
    assert!(store.load().await.is_empty());
}

#[tokio::test]
async fn authenticate_checks_the_password() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    store.register("ravi", "clay-pots").await.unwrap();

    let artisan = store.authenticate("ravi", "clay-pots").await.unwrap();
    assert_eq!(artisan.username, "ravi");
    assert_ne!(artisan.password_hash, "clay-pots");

    assert!(matches!(
        store.authenticate("ravi", "wrong").await,
        Err(StoreError::InvalidCredentials)
    ));
    assert!(matches!(
        store.authenticate("nobody", "clay-pots").await,
        Err(StoreError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn identical_products_get_distinct_ids() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    store.register("meera", "pw").await.unwrap();

    let first = store.add_product("meera", product("Vase", 100.0, "Clay")).await.unwrap();
    let second = store.add_product("meera", product("Vase", 100.0, "Clay")).await.unwrap();

    assert_ne!(first, second);
    assert_eq!(store.list_products("meera").await.unwrap().len(), 2);
}

#[tokio::test]
async fn invalid_products_are_rejected() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    store.register("meera", "pw").await.unwrap();

    for bad in [product(" ", 10.0, ""), product("Vase", -1.0, ""), product("Vase", f64::NAN, "")] {
        assert!(matches!(
            store.add_product("meera", bad).await,
            Err(StoreError::InvalidProduct(_))
        ));
    }
    assert!(matches!(
        store.add_product("ghost", product("Vase", 1.0, "")).await,
        Err(StoreError::UnknownArtisan(_))
    ));
    assert!(store.list_products("meera").await.unwrap().is_empty());
}

#[tokio::test]
async fn profile_update_keeps_credentials_and_products() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    store.register("priya", "secret").await.unwrap();
    store.add_product("priya", product("Shawl", 900.0, "Wool")).await.unwrap();

    let updated = store
        .update_profile(
            "priya",
            ProfileUpdate {
                display_name: Some("Priya".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.display_name, "Priya");
    assert_eq!(updated.products.len(), 1);
    assert!(store.authenticate("priya", "secret").await.is_ok());
}

#[tokio::test]
async fn missing_or_corrupt_document_loads_empty() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    assert!(store.load().await.is_empty());

    std::fs::write(store.path(), "{ not json").unwrap();
    assert!(store.load().await.is_empty());

    // A later write replaces the broken document.
    store.register("ravi", "pw").await.unwrap();
    assert_eq!(store.load().await.len(), 1);
}

#[tokio::test]
async fn document_keeps_the_original_field_names() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    let legacy = r#"{
        "asha": {
            "password_hash": "x",
            "name": "Asha",
            "craft": "Pottery",
            "art_description": "Clay from the river bank.",
            "products": {
                "p1": { "name": "Bowl", "price": 250.0 }
            },
            "favourite_colour": "red"
        }
    }"#;
    std::fs::write(store.path(), legacy).unwrap();

    let artisans = store.load().await;
    let asha = &artisans["asha"];
    assert_eq!(asha.display_name, "Asha");
    assert_eq!(asha.products["p1"].materials, "");

    store.save(&artisans).await.unwrap();
    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(written["asha"]["craft"], "Pottery");
    assert_eq!(written["asha"]["products"]["p1"]["price"], 250.0);
}

#[tokio::test]
async fn catalog_filters_by_name_or_craft() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    for (user, craft) in [("asha", "Pottery"), ("priya", "Weaving")] {
        store.register(user, "pw").await.unwrap();
        store
            .update_profile(
                user,
                ProfileUpdate {
                    craft_type: Some(craft.to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }
    store.add_product("asha", product("Bowl", 250.0, "Clay")).await.unwrap();
    store.add_product("priya", product("Blue Scarf", 450.0, "Cotton")).await.unwrap();

    let all = store.catalog(None).await;
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].artisan_username, "asha");
    assert_eq!(all[0].artisan_name, "asha");
    assert_eq!(all[0].artisan_story, "No story provided.");

    let weaving = store.catalog(Some("WEAV")).await;
    assert_eq!(weaving.len(), 1);
    assert_eq!(weaving[0].product.name, "Blue Scarf");

    let by_name = store.catalog(Some("bowl")).await;
    assert_eq!(by_name.len(), 1);
    assert!(store.catalog(Some("jewellery")).await.is_empty());
}

#[tokio::test]
async fn saves_leave_no_temp_file_behind() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    store.register("ravi", "pw").await.unwrap();

    let names: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["database.json".to_string()]);
}

#[tokio::test]
async fn concurrent_registrations_are_all_kept() {
    let dir = TempDir::new().unwrap();
    let store = std::sync::Arc::new(open_store(&dir).await);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move { store.register(&format!("artisan{}", i), "pw").await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(store.load().await.len(), 8);
}

#[tokio::test]
async fn unreadable_document_is_never_overwritten() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    let mut bytes = br#"{"asha": {"password_hash": "x", "name": "Asha "#.to_vec();
    bytes.push(0xff);
    bytes.extend_from_slice(br#""}}"#);
    std::fs::write(store.path(), &bytes).unwrap();

    let result = store.register("ravi", "pw").await;
    assert!(matches!(result, Err(StoreError::Io(_))));
    assert_eq!(std::fs::read(store.path()).unwrap(), bytes);
}
