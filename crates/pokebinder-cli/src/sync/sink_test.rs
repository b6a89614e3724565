use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::json;

use pokebinder_core::{merge_prices, PriceEntry, Product};
use pokebinder_firestore::{FirestoreError, MemoryStore};

use super::*;

fn base_set() -> Group {
    Group {
        group_id: 604,
        name: "Base Set".to_owned(),
    }
}

fn product(value: serde_json::Value) -> Product {
    serde_json::from_value(value).expect("product fixture should deserialize")
}

fn price(id: u64, market: f64) -> PriceEntry {
    PriceEntry {
        product_id: id,
        low_price: None,
        mid_price: None,
        high_price: None,
        market_price: Some(market),
        direct_low_price: None,
        sub_type_name: Some("Normal".to_owned()),
    }
}

/// Rejects every document whose id is in `reject`; counts attempts.
struct FlakyStore {
    reject: &'static str,
    attempts: AtomicUsize,
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn upsert(
        &self,
        _collection: &str,
        document_id: &str,
        _document: &Document,
    ) -> Result<(), FirestoreError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if document_id == self.reject {
            return Err(FirestoreError::UnexpectedStatus {
                status: 500,
                url: format!("memory://cards/{document_id}"),
                body: "INTERNAL".to_owned(),
            });
        }
        Ok(())
    }
}

#[tokio::test]
async fn file_sink_writes_pretty_json_with_trailing_newline() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = FileSink::new(dir.path().join("sets"));
    let records = merge_prices(
        vec![product(json!({ "productId": 1, "name": "Alakazam" }))],
        &[price(1, 12.0)],
    );

    let written = sink.write_group(&base_set(), &records).await.unwrap();
    assert_eq!(written, 1);

    let text = std::fs::read_to_string(sink.output_dir().join("604-Base_Set.json")).unwrap();
    assert!(text.starts_with("[\n  {"), "expected pretty output, got: {text}");
    assert!(text.ends_with("]\n"));
}

#[tokio::test]
async fn file_sink_overwrites_previous_contents() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = FileSink::new(dir.path());
    let first = merge_prices(
        vec![
            product(json!({ "productId": 1, "name": "Alakazam" })),
            product(json!({ "productId": 2, "name": "Blastoise" })),
        ],
        &[],
    );
    let second = merge_prices(vec![product(json!({ "productId": 1, "name": "Alakazam" }))], &[]);

    sink.write_group(&base_set(), &first).await.unwrap();
    sink.write_group(&base_set(), &second).await.unwrap();

    let back: Vec<MergedRecord> =
        serde_json::from_str(&std::fs::read_to_string(sink.path_for(&base_set())).unwrap())
            .unwrap();
    assert_eq!(back, second);
}

#[tokio::test]
async fn document_sink_replaces_documents_on_rewrite() {
    let store = MemoryStore::new();
    let mut sink = DocumentStoreSink::new(&store, "cards");

    let first = merge_prices(
        vec![product(json!({ "productId": 7, "name": "Mew", "rarity": "Promo" }))],
        &[price(7, 80.0)],
    );
    let second = merge_prices(vec![product(json!({ "productId": 7, "name": "Mew" }))], &[]);

    sink.write_group(&base_set(), &first).await.unwrap();
    sink.write_group(&base_set(), &second).await.unwrap();

    let stored = store.get("cards", "7").unwrap();
    assert_eq!(stored, record_document(&second[0]).unwrap());
    assert!(!stored.contains_key("rarity"));
    assert_eq!(stored["prices"], json!([]));
}

#[tokio::test]
async fn document_sink_attempts_every_record_and_reports_failures() {
    let store = FlakyStore {
        reject: "2",
        attempts: AtomicUsize::new(0),
    };
    let mut sink = DocumentStoreSink::new(&store, "cards");
    let records = merge_prices(
        vec![
            product(json!({ "productId": 1 })),
            product(json!({ "productId": 2 })),
            product(json!({ "productId": 3 })),
        ],
        &[],
    );

    let err = sink.write_group(&base_set(), &records).await.unwrap_err();

    assert_eq!(store.attempts.load(Ordering::SeqCst), 3);
    assert!(err.to_string().contains("1 of 3"), "got: {err}");
}

#[test]
fn record_document_embeds_prices() {
    let records = merge_prices(
        vec![product(json!({ "productId": 5, "name": "Snorlax" }))],
        &[price(5, 2.5)],
    );
    let doc = record_document(&records[0]).unwrap();
    assert_eq!(doc["productId"], 5);
    assert_eq!(doc["prices"][0]["marketPrice"], 2.5);
}
