use admin::entity::EntityKind;
use admin::{loader, verify};
use bson::doc;
use common::storage::{DocumentStore, Filter};
use serde_json::json;

use crate::support::{TestEnv, blogs_input, projects_input};

#[tokio::test]
async fn counts_real_documents_separately_from_placeholders() {
    let env = TestEnv::new();
    env.store
        .insert_one("blogs", doc! { "title": "Sample Blogs", "placeholder": true })
        .await
        .unwrap();
    env.store
        .insert_one("blogs", doc! { "title": "Real", "blogId": "abcdefghij" })
        .await
        .unwrap();

    let report = verify::verify(&env.store, EntityKind::Blogs).await.unwrap();

    assert_eq!(report.total, 2);
    assert_eq!(report.real, 1);
    assert_eq!(report.samples.len(), 1);
    assert_eq!(report.samples[0].title, "Real");
}

#[tokio::test]
async fn samples_at_most_three_loaded_blogs() {
    let env = TestEnv::bootstrapped().await;
    let file = env.write_json("blogs.json", &blogs_input(&["A", "B", "C", "D", "E"]));
    loader::load_kind(&env.store, EntityKind::Blogs, &file)
        .await
        .unwrap();

    let report = verify::verify(&env.store, EntityKind::Blogs).await.unwrap();

    assert_eq!(report.total, 5);
    assert_eq!(report.real, 5);
    assert_eq!(report.samples.len(), 3);
    assert_eq!(
        report.samples[0].details,
        ["Subject: Rust", "Assets: 1 items", "Cover Image: Yes"]
    );
    let text = report.to_string();
    assert!(text.contains("Real blogs (with blogId): 5"), "{text}");
    assert!(text.contains("ID: "), "{text}");
}

#[tokio::test]
async fn verification_is_read_only() {
    let env = TestEnv::bootstrapped().await;
    let before = env.store.find("projects", &Filter::All, None).await.unwrap();

    verify::verify(&env.store, EntityKind::Projects).await.unwrap();
    verify::inspect_state(&env.store, EntityKind::Projects)
        .await
        .unwrap();

    let after = env.store.find("projects", &Filter::All, None).await.unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn state_counts_documents_with_assets_and_card_assets() {
    let env = TestEnv::bootstrapped().await;
    let file = env.write_json(
        "projects.json",
        &json!({ "featuredProjects": [
            { "title": "With card", "cardasset": ["card.png"] },
            {
                "title": "With both",
                "assets": ["a.png"],
                "cardasset": [{ "url": "https://cdn/b.png" }]
            },
            { "title": "Bare" }
        ]}),
    );
    loader::load_kind(&env.store, EntityKind::Projects, &file)
        .await
        .unwrap();

    let state = verify::inspect_state(&env.store, EntityKind::Projects)
        .await
        .unwrap();

    assert_eq!(state.total, 3);
    assert_eq!(state.with_assets, 1);
    assert_eq!(state.with_card_assets, 2);
    assert_eq!(state.entries[1].card_assets, ["https://cdn/b.png"]);
    assert!(state.to_string().contains("Projects with non-empty cardasset: 2"));
}

#[tokio::test]
async fn projects_verification_reports_card_assets() {
    let env = TestEnv::new();
    let file = env.write_json("projects.json", &projects_input(&["Folio"]));
    loader::load_kind(&env.store, EntityKind::Projects, &file)
        .await
        .unwrap();

    let report = verify::verify(&env.store, EntityKind::Projects).await.unwrap();

    assert_eq!(
        report.samples[0].details,
        [
            "Assets: 0 items",
            "Cardassets: 1 items",
            "First cardasset: https://cdn.example.com/Folio.png"
        ]
    );
}

#[tokio::test]
async fn sample_heading_counts_what_is_shown() {
    let env = TestEnv::bootstrapped().await;
    let file = env.write_json("blogs.json", &blogs_input(&["Only Post"]));
    loader::load_kind(&env.store, EntityKind::Blogs, &file)
        .await
        .unwrap();

    let text = verify::verify(&env.store, EntityKind::Blogs)
        .await
        .unwrap()
        .to_string();

    assert!(text.contains("First 1 blogs:"), "{text}");
}
