//! Behavior of identifier lists against an in-memory store

use std::sync::Arc;

use pdt_core::{
    Collection, DocumentPath, Error, IdentifierList, ListKind, MemoryStore, StoreOp,
    decode_listing,
};
use pdt_test_utils::{StaticVerifier, seeded_store};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;

fn repositories(verifier: StaticVerifier, force: bool) -> IdentifierList {
    IdentifierList::new(
        ListKind::Repositories,
        Some(DocumentPath::new("meta", "repositories")),
        Arc::new(verifier),
    )
    .with_force(force)
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

#[tokio::test]
async fn add_twice_without_force_is_a_duplicate() {
    let mut list = repositories(StaticVerifier::new(), false);

    list.add("https://example.com/a".to_string()).await.unwrap();
    let err = list.add("https://example.com/a".to_string()).await.unwrap_err();

    assert!(err.is_duplicate());
    assert_eq!(list.count(), 1);
}

#[tokio::test]
async fn add_twice_with_force_moves_the_item_to_the_end() {
    let mut list = repositories(StaticVerifier::new(), true);

    for url in ["https://example.com/a", "https://example.com/b", "https://example.com/a"] {
        list.add(url.to_string()).await.unwrap();
    }

    assert_eq!(list.items(), ["https://example.com/b", "https://example.com/a"]);
}

#[tokio::test]
async fn blank_item_is_rejected_before_verification() {
    let verifier = Arc::new(StaticVerifier::new());
    let mut list = IdentifierList::new(
        ListKind::ToolInfo,
        Some(DocumentPath::new("meta", "toolinfo")),
        verifier.clone(),
    );

    let err = list.add("   ".to_string()).await.unwrap_err();

    assert!(matches!(err, Error::Validation { .. }));
    assert!(verifier.checked().is_empty());
    assert!(!list.is_dirty());
}

#[tokio::test]
async fn unreachable_url_is_a_validation_error() {
    let verifier = StaticVerifier::new().with_unreachable("https://example.com/gone", 404);
    let mut list = repositories(verifier, false);

    let err = list.add("https://example.com/gone".to_string()).await.unwrap_err();

    assert!(err.to_string().contains("code: 404"));
    assert_eq!(list.count(), 0);
    assert!(!list.is_dirty());
}

#[tokio::test]
async fn removing_an_absent_item_changes_nothing() {
    let store = seeded_store(&[(ListKind::Repositories, &["https://example.com/a"])], &[]);
    let mut list = repositories(StaticVerifier::new(), false);
    list.fetch(store.as_ref()).await.unwrap();

    list.remove(&"https://example.com/zzz".to_string()).unwrap();

    assert_eq!(list.count(), 1);
    assert!(!list.is_dirty());
}

#[tokio::test]
async fn removing_a_blank_item_is_rejected() {
    let store = seeded_store(&[(ListKind::Repositories, &["https://example.com/a"])], &[]);
    let mut list = repositories(StaticVerifier::new(), false);
    list.fetch(store.as_ref()).await.unwrap();

    for blank in ["", "  "] {
        let err = list.remove(&blank.to_string()).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    assert_eq!(list.count(), 1);
    assert!(!list.is_dirty());
}

#[tokio::test]
async fn clean_commit_issues_no_writes() {
    let store = seeded_store(&[(ListKind::Repositories, &["https://example.com/a"])], &[]);
    let mut list = repositories(StaticVerifier::new(), false);
    list.fetch(store.as_ref()).await.unwrap();

    let report = list.commit(store.as_ref()).await.unwrap();

    assert!(report.is_empty());
    assert!(store.writes().is_empty());
}

#[tokio::test]
async fn commit_writes_the_whole_list_once() {
    let store = seeded_store(&[(ListKind::Repositories, &["https://example.com/a"])], &[]);
    let mut list = repositories(StaticVerifier::new(), false);
    list.fetch(store.as_ref()).await.unwrap();

    list.add("https://example.com/b".to_string()).await.unwrap();
    list.remove(&"https://example.com/a".to_string()).unwrap();
    list.commit(store.as_ref()).await.unwrap();

    assert_eq!(
        store.writes(),
        vec![StoreOp::Set("meta/repositories".to_string())]
    );
    assert_eq!(
        store.document(&DocumentPath::new("meta", "repositories")),
        Some(json!({"list": ["https://example.com/b"]}))
    );
    assert!(!list.is_dirty());
}

#[tokio::test]
async fn fetched_empty_list_is_not_refetched() {
    let store = seeded_store(&[], &[]);
    let mut list = repositories(StaticVerifier::new(), false);

    list.fetch(store.as_ref()).await.unwrap();
    list.fetch(store.as_ref()).await.unwrap();

    let gets = store
        .operations()
        .into_iter()
        .filter(|op| matches!(op, StoreOp::Get(_)))
        .count();
    assert_eq!(gets, 1);
    assert_eq!(list.count(), 0);
}

#[tokio::test]
async fn missing_document_is_not_found() {
    let store = MemoryStore::new();
    let mut list = repositories(StaticVerifier::new(), false);

    let err = list.fetch(&store).await.unwrap_err();

    assert_eq!(err.to_string(), "document \"meta/repositories\" does not exist");
}

#[test]
fn json_listing_round_trips() {
    let rt = runtime();
    let mut list = repositories(StaticVerifier::new(), false);
    rt.block_on(async {
        list.add("a".to_string()).await.unwrap();
        list.add("b".to_string()).await.unwrap();
    });

    let json = list.to_json().unwrap();
    let items: Vec<String> = decode_listing("repositories", &json).unwrap();

    assert_eq!(items, vec!["a".to_string(), "b".to_string()]);
}

proptest! {
    #[test]
    fn add_appends_exactly_one_new_item(
        existing in prop::collection::btree_set("[a-z]{1,12}", 0..8),
        extra in "[A-Z]{1,12}",
    ) {
        let rt = runtime();
        let mut list = repositories(StaticVerifier::new(), false);
        rt.block_on(async {
            for item in &existing {
                list.add(item.clone()).await.unwrap();
            }
        });
        let before = list.items().to_vec();

        rt.block_on(list.add(extra.clone())).unwrap();

        prop_assert_eq!(list.count(), before.len() + 1);
        prop_assert_eq!(&list.items()[..before.len()], &before[..]);
        prop_assert_eq!(list.items().last(), Some(&extra));
    }

    #[test]
    fn items_stay_unique_under_any_sequence(
        adds in prop::collection::vec("[a-c]", 0..20),
        force in any::<bool>(),
    ) {
        let rt = runtime();
        let mut list = repositories(StaticVerifier::new(), force);
        rt.block_on(async {
            for item in adds {
                let _ = list.add(item).await;
            }
        });

        let mut sorted = list.items().to_vec();
        sorted.sort();
        sorted.dedup();
        prop_assert_eq!(sorted.len(), list.count());
    }
}
