use admin::entity::EntityKind;
use admin::error::AdminError;
use admin::pipeline;
use common::storage::{DocumentStore, Filter};

use crate::support::{TestEnv, blogs_input};

#[tokio::test]
async fn seeds_and_reports_every_step() {
    let env = TestEnv::new();
    let file = env.write_json("blogs.json", &blogs_input(&["First Post", "Second Post"]));
    let mut out = Vec::new();

    pipeline::seed(&env.store, EntityKind::Blogs, &file, &mut out)
        .await
        .unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Setting up collections and indexes..."), "{text}");
    assert!(text.contains("Verifying inserted blogs:"), "{text}");
    assert!(text.contains("Current database state:"), "{text}");
    assert!(text.ends_with("blog setup completed successfully!\n"), "{text}");
    assert_eq!(
        env.store
            .count("blogs", &Filter::exists("blogId"))
            .await
            .unwrap(),
        2
    );
}

#[tokio::test]
async fn failed_load_still_verifies_then_fails() {
    let env = TestEnv::new();
    let mut out = Vec::new();

    let err = pipeline::seed(&env.store, EntityKind::Projects, &env.missing_file(), &mut out)
        .await
        .unwrap_err();

    assert!(matches!(err, AdminError::Input(_)));
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Error: Input error"), "{text}");
    assert!(text.contains("Verifying inserted projects:"), "{text}");
    assert!(text.contains("Total projects in database: 1"), "{text}");
    assert!(text.contains("Current database state:"), "{text}");
    assert!(!text.contains("setup completed successfully"), "{text}");
    // Bootstrap ran before the load failed.
    assert_eq!(env.store.collection_names().await.unwrap().len(), 6);
}
