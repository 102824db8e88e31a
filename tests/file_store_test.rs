use anyhow::Result;
use content_model::utils::validation::Validate;
use content_model::{AppConfig, Fields, JsonFileStore, ModelClass, QueryType, SharedStore};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;

fn fields(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {}", other),
    }
}

#[tokio::test]
async fn test_models_persist_across_store_instances() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("content.json");

    let store: SharedStore = Arc::new(JsonFileStore::open(&path).await?);
    let posts = ModelClass::named(store, "Post");
    let mut post = posts.get_new();
    post.set("title", "Persisted");
    post.save().await?;
    let id = post.uuid().expect("saved post has uuid");

    let raw: Vec<Value> = serde_json::from_str(&tokio::fs::read_to_string(&path).await?)?;
    assert_eq!(raw.len(), 1);
    assert_eq!(raw[0]["title"], json!("Persisted"));

    let reopened: SharedStore = Arc::new(JsonFileStore::open(&path).await?);
    let posts = ModelClass::named(reopened, "Post");
    let mut loaded = posts.find_by_id(id).await?;
    assert_eq!(loaded.get("title"), Some(&json!("Persisted")));

    loaded.delete().await?;
    let remaining = posts.find_where(Fields::new(), QueryType::And).await?;
    assert!(remaining.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_store_from_toml_config() -> Result<()> {
    let temp_dir = TempDir::new()?;
    // backslashes would be escapes inside the TOML string
    let data_path = temp_dir
        .path()
        .join("data.json")
        .to_string_lossy()
        .replace('\\', "/");

    let config = AppConfig::from_toml_str(&format!(
        r#"
[store]
backend = "file"
path = "{}"

[query]
default_query_type = "OR"
"#,
        data_path
    ))?;
    config.validate()?;

    let store = config.open_store().await?;
    let tags = ModelClass::named(store, "Tag");
    tags.create(fields(json!({"label": "rust"}))).await?;
    tags.create(fields(json!({"label": "php"}))).await?;

    let found = tags
        .find_where(
            fields(json!({"label": "rust", "color": "red"})),
            config.query_type(),
        )
        .await?;
    assert_eq!(found.len(), 1);
    assert!(std::path::Path::new(&data_path).exists());
    Ok(())
}
