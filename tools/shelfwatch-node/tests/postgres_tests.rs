#![cfg(feature = "postgres-tests")]

//! Live PostgreSQL tests. Run with
//! `DATABASE_URL=postgres://... cargo test -p shelfwatch-node --features postgres-tests`.

use chrono::{Duration, Utc};
use shelfwatch_common::decay::Conditions;
use shelfwatch_common::product::{CreateProduct, Product, ProductId};
use shelfwatch_common::reading::SensorReading;
use shelfwatch_node::store::StoreError;
use shelfwatch_node::PgStore;

async fn connect() -> PgStore {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for postgres-tests");
    PgStore::connect(&url, 2).await.expect("connect")
}

fn yogurt(name: &str) -> Product {
    CreateProduct {
        name: name.into(),
        product_type: "yogurt".into(),
        batch_number: "Y-9".into(),
        quantity: 0.5,
        unit: "kg".into(),
    }
    .into_product(ProductId::generate(), Utc::now())
    .unwrap()
}

#[tokio::test]
async fn product_round_trip_and_condition_update() {
    let store = connect().await;
    let product = yogurt("Greek Yogurt");
    store.insert_product(&product).await.unwrap();

    let found = store.find_product(&product.id).await.unwrap().unwrap();
    assert_eq!(found.name, "Greek Yogurt");
    assert_eq!(found.conditions(), Some(Conditions::new(4.0, 50.0)));
    assert!((found.added_date - product.added_date).num_microseconds().unwrap().abs() < 1);

    assert!(store
        .update_product_condition(&product.id, Conditions::new(7.5, 66.0))
        .await
        .unwrap());
    let found = store.find_product(&product.id).await.unwrap().unwrap();
    assert_eq!(found.conditions(), Some(Conditions::new(7.5, 66.0)));

    assert!(store.delete_product(&product.id).await.unwrap());
}

#[tokio::test]
async fn readings_newest_first_and_cascade_delete() {
    let store = connect().await;
    let product = yogurt("Plain Yogurt");
    store.insert_product(&product).await.unwrap();

    let start = Utc::now();
    for i in 0..3 {
        let r = SensorReading::new(
            product.id.clone(),
            Conditions::new(4.0 + i as f64, 50.0),
            start + Duration::seconds(i),
        );
        store.insert_reading(&r).await.unwrap();
    }

    let readings = store.list_readings(&product.id, 2).await.unwrap();
    let temps: Vec<_> = readings.iter().map(|r| r.temperature).collect();
    assert_eq!(temps, [6.0, 5.0]);

    assert!(store.delete_product(&product.id).await.unwrap());
    assert!(store.find_product(&product.id).await.unwrap().is_none());
    assert!(store.list_readings(&product.id, 50).await.unwrap().is_empty());
    assert!(!store.delete_product(&product.id).await.unwrap());
}

#[tokio::test]
async fn reading_for_missing_product_is_rejected() {
    let store = connect().await;
    let r = SensorReading::new(ProductId::generate(), Conditions::new(4.0, 50.0), Utc::now());
    assert!(matches!(
        store.insert_reading(&r).await,
        Err(StoreError::UnknownProduct(_))
    ));
}

#[tokio::test]
async fn product_created_with_first_reading() {
    let store = connect().await;
    let product = yogurt("Skyr");
    let first = SensorReading::new(product.id.clone(), Conditions::new(4.0, 50.0), product.added_date);
    store.insert_product_with_reading(&product, &first).await.unwrap();

    assert!(store.find_product(&product.id).await.unwrap().is_some());
    let readings = store.list_readings(&product.id, 50).await.unwrap();
    assert_eq!(readings.len(), 1);
    assert_eq!(readings[0].id, first.id);

    // A reading that cannot be stored rolls the product back with it.
    let orphan = yogurt("Kefir");
    let stray = SensorReading::new(ProductId::generate(), Conditions::new(4.0, 50.0), Utc::now());
    assert!(store.insert_product_with_reading(&orphan, &stray).await.is_err());
    assert!(store.find_product(&orphan.id).await.unwrap().is_none());

    assert!(store.delete_product(&product.id).await.unwrap());
}

#[tokio::test]
async fn recorded_reading_becomes_latest_condition() {
    let store = connect().await;
    let product = yogurt("Labneh");
    store.insert_product(&product).await.unwrap();

    let r = SensorReading::new(product.id.clone(), Conditions::new(8.2, 63.4), Utc::now());
    store.record_reading(&r).await.unwrap();
    let found = store.find_product(&product.id).await.unwrap().unwrap();
    assert_eq!(found.conditions(), Some(Conditions::new(8.2, 63.4)));
    assert_eq!(store.list_readings(&product.id, 1).await.unwrap()[0].id, r.id);

    assert!(store.delete_product(&product.id).await.unwrap());
    let late = SensorReading::new(product.id.clone(), Conditions::new(9.0, 70.0), Utc::now());
    assert!(matches!(
        store.record_reading(&late).await,
        Err(StoreError::UnknownProduct(_))
    ));
    assert!(store.list_readings(&product.id, 50).await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_racing_readings_leaves_no_orphans() {
    let store = connect().await;
    let product = yogurt("Drinking Yogurt");
    store.insert_product(&product).await.unwrap();

    let writers: Vec<_> = (0..8)
        .map(|i| {
            let store = store.clone();
            let r = SensorReading::new(
                product.id.clone(),
                Conditions::new(4.0 + i as f64 / 10.0, 50.0),
                Utc::now(),
            );
            tokio::spawn(async move { store.record_reading(&r).await })
        })
        .collect();
    assert!(store.delete_product(&product.id).await.unwrap());

    for writer in writers {
        match writer.await.unwrap() {
            Ok(()) | Err(StoreError::UnknownProduct(_)) => {}
            Err(e) => panic!("unexpected store error: {e}"),
        }
    }
    assert!(store.find_product(&product.id).await.unwrap().is_none());
    assert!(store.list_readings(&product.id, 50).await.unwrap().is_empty());
}
