use std::collections::HashSet;

use admin::entity::EntityKind;
use admin::error::AdminError;
use admin::loader;
use bson::doc;
use common::storage::{DocumentStore, Filter};
use serde_json::json;

use crate::support::{TestEnv, blogs_input, projects_input};

mod blogs {
    use super::*;

    #[tokio::test]
    async fn loads_every_valid_record_and_removes_placeholders() {
        let env = TestEnv::bootstrapped().await;
        let file = env.write_json(
            "blogs.json",
            &blogs_input(&["First Post", "Second Post", "Third"]),
        );

        let report = loader::load_kind(&env.store, EntityKind::Blogs, &file)
            .await
            .unwrap();

        assert_eq!(report.inserted, 3);
        assert_eq!(report.placeholders_removed, 1);
        assert_eq!(env.store.count("blogs", &Filter::All).await.unwrap(), 3);
        assert_eq!(
            env.store
                .count("blogs", &Filter::exists("blogId"))
                .await
                .unwrap(),
            3
        );
        assert_eq!(
            env.store
                .count("blogs", &Filter::eq("placeholder", true))
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn stored_blog_carries_defaults_and_derived_fields() {
        let env = TestEnv::new();
        let file = env.write_json(
            "blogs.json",
            &json!({ "blogs": [{ "title": "Async Rust (Part 1.5)" }] }),
        );

        loader::load_kind(&env.store, EntityKind::Blogs, &file)
            .await
            .unwrap();

        let blog = env
            .store
            .find_one("blogs", &Filter::All)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(blog.get_str("slug").unwrap(), "async-rust-part-1-5");
        assert_eq!(blog.get_str("blogId").unwrap().len(), 10);
        assert_eq!(blog.get_str("tagline").unwrap(), "");
        assert!(blog.get_array("tags").unwrap().is_empty());
        assert!(!blog.get_bool("featured").unwrap());
        assert_eq!(
            blog.get_datetime("created_at").unwrap(),
            blog.get_datetime("updated_at").unwrap()
        );
    }

    #[tokio::test]
    async fn removes_legacy_sample_documents() {
        let env = TestEnv::new();
        env.store
            .insert_one("blogs", doc! { "title": "Sample Blogs", "slug": "sample-blogs" })
            .await
            .unwrap();
        let file = env.write_json("blogs.json", &blogs_input(&["Real"]));

        let report = loader::load_kind(&env.store, EntityKind::Blogs, &file)
            .await
            .unwrap();

        assert_eq!(report.placeholders_removed, 1);
        let titles: Vec<_> = env
            .store
            .find("blogs", &Filter::All, None)
            .await
            .unwrap()
            .iter()
            .map(|d| d.get_str("title").unwrap().to_string())
            .collect();
        assert_eq!(titles, ["Real"]);
    }

    #[tokio::test]
    async fn skips_invalid_records_and_inserts_the_rest() {
        let env = TestEnv::new();
        let file = env.write_json(
            "blogs.json",
            &json!({ "blogs": [
                { "title": "Good" },
                { "subject": "no title" },
                { "title": "Bad date", "datetime": "2024-13-45" }
            ]}),
        );

        let report = loader::load_kind(&env.store, EntityKind::Blogs, &file)
            .await
            .unwrap();

        assert_eq!(report.inserted, 1);
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(report.skipped[0].index, 1);
        assert_eq!(report.skipped[1].index, 2);
        assert!(report.to_string().contains("Skipped record #1"));
    }

    #[tokio::test]
    async fn missing_array_inserts_nothing() {
        let env = TestEnv::bootstrapped().await;
        let file = env.write_json("blogs.json", &json!({ "featuredProjects": [] }));

        let report = loader::load_kind(&env.store, EntityKind::Blogs, &file)
            .await
            .unwrap();

        assert_eq!(report.inserted, 0);
        assert!(report.to_string().ends_with("No blogs found to insert"));
    }
}

mod projects {
    use super::*;

    #[tokio::test]
    async fn loads_featured_projects_with_card_preview() {
        let env = TestEnv::bootstrapped().await;
        let file = env.write_json(
            "projects.json",
            &projects_input(&["Folio", "C++ Engine", "Compiler", "Shell"]),
        );

        let report = loader::load_kind(&env.store, EntityKind::Projects, &file)
            .await
            .unwrap();

        assert_eq!(report.inserted, 4);
        assert_eq!(report.preview.len(), 3);
        assert_eq!(
            report.preview[0].detail.as_deref(),
            Some("Card: https://cdn.example.com/Folio.png")
        );

        let engine = env
            .store
            .find_one("projects", &Filter::eq("title", "C++ Engine"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(engine.get_str("slug").unwrap(), "c-plus-plus-engine");
        assert!(engine.get_bool("featured").unwrap());
        let link = engine.get_array("links").unwrap()[0].as_document().unwrap();
        assert_eq!(link.get_str("platform").unwrap(), "github");
    }

    #[tokio::test]
    async fn identifiers_are_unique_across_loads() {
        let env = TestEnv::bootstrapped().await;
        let titles: Vec<String> = (0..40).map(|i| format!("Project {i}")).collect();
        let titles: Vec<&str> = titles.iter().map(String::as_str).collect();
        let file = env.write_json("projects.json", &projects_input(&titles));

        loader::load_kind(&env.store, EntityKind::Projects, &file)
            .await
            .unwrap();
        loader::load_kind(&env.store, EntityKind::Projects, &file)
            .await
            .unwrap();

        let ids = env
            .store
            .distinct_strings("projects", "projectId")
            .await
            .unwrap();
        assert_eq!(ids.len(), 80);
        assert_eq!(ids.iter().collect::<HashSet<_>>().len(), 80);
    }

    #[tokio::test]
    async fn reloading_reports_slug_collisions() {
        let env = TestEnv::new();
        let file = env.write_json("projects.json", &projects_input(&["Folio"]));

        loader::load_kind(&env.store, EntityKind::Projects, &file)
            .await
            .unwrap();
        let report = loader::load_kind(&env.store, EntityKind::Projects, &file)
            .await
            .unwrap();

        assert_eq!(report.inserted, 1);
        assert_eq!(report.slug_collisions, ["folio"]);
    }
}

mod input_errors {
    use super::*;

    #[tokio::test]
    async fn missing_file_changes_nothing() {
        let env = TestEnv::bootstrapped().await;

        let err = loader::load_kind(&env.store, EntityKind::Blogs, &env.missing_file())
            .await
            .unwrap_err();

        assert!(matches!(err, AdminError::Input(ref msg) if msg.contains("not found")));
        // Placeholder is still there.
        assert_eq!(env.store.count("blogs", &Filter::All).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn malformed_json_changes_nothing() {
        let env = TestEnv::bootstrapped().await;
        let file = env.write_raw("projects.json", "{ \"featuredProjects\": [ {\"title\": ");

        let err = loader::load_kind(&env.store, EntityKind::Projects, &file)
            .await
            .unwrap_err();

        assert!(matches!(err, AdminError::Input(ref msg) if msg.contains("invalid JSON")));
        let projects = env.store.find("projects", &Filter::All, None).await.unwrap();
        assert_eq!(projects.len(), 1);
        assert!(projects[0].get_bool("placeholder").unwrap());
    }

    #[tokio::test]
    async fn wrong_array_type_changes_nothing() {
        let env = TestEnv::bootstrapped().await;
        let file = env.write_json("blogs.json", &json!({ "blogs": "not a list" }));

        let err = loader::load_kind(&env.store, EntityKind::Blogs, &file)
            .await
            .unwrap_err();

        assert!(matches!(err, AdminError::Input(_)));
        assert_eq!(
            env.store
                .count("blogs", &Filter::eq("placeholder", true))
                .await
                .unwrap(),
            1
        );
    }
}
