mod helpers;

use std::io::Write;

use helpers::TestDb;
use tempfile::NamedTempFile;
use tessera::errors::TesseraError;
use tessera::schema::SchemaError;
use tessera::settings::Settings;
use tessera::CmsContext;

fn settings_for(db: &TestDb) -> Settings {
    let mut settings = Settings::default();
    settings.database.url = db.url().to_string();
    settings
}

#[tokio::test]
async fn test_bootstrap_registers_builtins_and_extra_definitions() {
    let test_db = TestDb::new().await;
    let mut defs = NamedTempFile::new().unwrap();
    write!(
        defs,
        r#"[{{ "type_name": "Post", "members": [
            {{ "kind": "field", "name": "Title", "type": "string", "storage": "not null" }}
        ] }}]"#
    )
    .unwrap();

    let mut settings = settings_for(&test_db);
    settings.schema.definitions = Some(defs.path().to_path_buf());

    let ctx = CmsContext::bootstrap(&settings).await.unwrap();
    assert_eq!(ctx.schema.resolve("user").as_deref(), Some("users"));
    assert_eq!(ctx.schema.resolve("post").as_deref(), Some("posts"));
    assert!(ctx.capabilities.has_store());
    assert_eq!(ctx.capabilities.next_bit(), ctx.capabilities.builtin_count());
}

#[tokio::test]
async fn test_bootstrap_reloads_persisted_capabilities() {
    let test_db = TestDb::new().await;
    let settings = settings_for(&test_db);

    let first = CmsContext::bootstrap(&settings).await.unwrap();
    let cap = first.capabilities.register("ViewPosts").await.unwrap();

    let second = CmsContext::bootstrap(&settings).await.unwrap();
    assert_eq!(second.capabilities.lookup("ViewPosts"), Some(cap));
}

#[tokio::test]
async fn test_bootstrap_missing_definitions_file() {
    let test_db = TestDb::new().await;
    let mut settings = settings_for(&test_db);
    settings.schema.definitions = Some("/nonexistent/tessera/missing.json".into());

    let err = CmsContext::bootstrap(&settings).await.unwrap_err();
    assert!(matches!(
        err,
        TesseraError::Schema(SchemaError::DefinitionLoad { .. })
    ));
}
