use admin::credentials::{self, AuthOutcome, USERS_COLLECTION};
use admin::transfer::{self, TransferOutcome};
use bson::spec::BinarySubtype;
use bson::{Binary, Bson, doc};
use common::storage::{DocumentStore, Filter};

use crate::support::TestEnv;

fn user(username: &str, password: &str) -> bson::Document {
    doc! { "username": username, "password": password }
}

#[tokio::test]
async fn copies_the_record_unchanged() {
    let env = TestEnv::new();
    let source = env.store.with_database("content_platform");
    source
        .insert_one(USERS_COLLECTION, user("site_admin", "$argon2id$hash"))
        .await
        .unwrap();
    let original = source
        .find_one(USERS_COLLECTION, &Filter::All)
        .await
        .unwrap()
        .unwrap();

    let report = transfer::move_user(&source, &env.store, "site_admin")
        .await
        .unwrap();

    assert_eq!(report.outcome, TransferOutcome::Copied);
    assert_eq!(report.to_string(), "User site_admin copied to Portfolio DB successfully!");
    let copied = env
        .store
        .find_one(USERS_COLLECTION, &Filter::eq("username", "site_admin"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(copied, original);
    assert_eq!(
        source.count(USERS_COLLECTION, &Filter::All).await.unwrap(),
        1,
        "source keeps its record"
    );
}

#[tokio::test]
async fn leaves_an_existing_destination_user_alone() {
    let env = TestEnv::new();
    let source = env.store.with_database("content_platform");
    source
        .insert_one(USERS_COLLECTION, user("site_admin", "source-hash"))
        .await
        .unwrap();
    env.store
        .insert_one(USERS_COLLECTION, user("site_admin", "destination-hash"))
        .await
        .unwrap();

    let report = transfer::move_user(&source, &env.store, "site_admin")
        .await
        .unwrap();

    assert_eq!(report.outcome, TransferOutcome::AlreadyPresent);
    let kept = env
        .store
        .find(USERS_COLLECTION, &Filter::All, None)
        .await
        .unwrap();
    assert_eq!(kept.len(), 1);
    assert_eq!(
        kept[0].get("password"),
        Some(&Bson::String("destination-hash".into()))
    );
}

#[tokio::test]
async fn reports_a_user_missing_from_the_source() {
    let env = TestEnv::new();
    let source = env.store.with_database("content_platform");

    let report = transfer::move_user(&source, &env.store, "ghost")
        .await
        .unwrap();

    assert_eq!(report.outcome, TransferOutcome::NotInSource);
    assert_eq!(report.to_string(), "User ghost not found in content_platform DB");
    assert_eq!(
        env.store.count(USERS_COLLECTION, &Filter::All).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn ensures_the_unique_index_in_every_case() {
    let env = TestEnv::new();
    let source = env.store.with_database("content_platform");

    transfer::move_user(&source, &env.store, "ghost")
        .await
        .unwrap();

    let indexes = env.store.index_names(USERS_COLLECTION).await.unwrap();
    assert!(indexes.contains(&"username_1".to_string()));
}

#[tokio::test]
async fn running_twice_copies_once() {
    let env = TestEnv::new();
    let source = env.store.with_database("content_platform");
    source
        .insert_one(USERS_COLLECTION, user("site_admin", "hash"))
        .await
        .unwrap();

    let first = transfer::move_user(&source, &env.store, "site_admin")
        .await
        .unwrap();
    let second = transfer::move_user(&source, &env.store, "site_admin")
        .await
        .unwrap();

    assert_eq!(first.outcome, TransferOutcome::Copied);
    assert_eq!(second.outcome, TransferOutcome::AlreadyPresent);
    assert_eq!(
        env.store.count(USERS_COLLECTION, &Filter::All).await.unwrap(),
        1
    );
}

#[tokio::test]
async fn migrated_bcrypt_user_can_authenticate() {
    let env = TestEnv::new();
    let source = env.store.with_database("content_platform");
    let hash = Binary {
        subtype: BinarySubtype::Generic,
        bytes: bcrypt::hash("legacy secret", 4).unwrap().into_bytes(),
    };
    source
        .insert_one(
            USERS_COLLECTION,
            doc! { "username": "site_admin", "password": hash },
        )
        .await
        .unwrap();

    transfer::move_user(&source, &env.store, "site_admin")
        .await
        .unwrap();

    let outcome = credentials::authenticate(&env.store, "site_admin", "legacy secret")
        .await
        .unwrap();
    assert_eq!(outcome, AuthOutcome::Authenticated);
    let rejected = credentials::authenticate(&env.store, "site_admin", "wrong")
        .await
        .unwrap();
    assert_eq!(rejected, AuthOutcome::WrongPassword);
}
