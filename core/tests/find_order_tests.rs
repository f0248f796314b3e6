// tests/find_order_tests.rs
mod common;

use common::*;
use orderflow::{OrderError, PageForm};
use serial_test::serial;

#[tokio::test]
#[serial]
async fn find_one_enriches_lines_but_keeps_price_snapshots() {
  let h = harness();
  let order = h
    .workflow
    .create(&caller(OWNER), request(&[(PLAIN, 2), (VARIANT_A, 1)]))
    .await
    .expect("order created");

  let mut repriced = h.catalog.get(PLAIN).expect("seeded");
  repriced.price = 99.0;
  h.catalog.upsert(vec![repriced]);

  let found = h.workflow.find_one(&caller(OWNER), order.id).await.expect("order found");

  assert_eq!(found.id, order.id);
  assert_eq!(found.order_lines.len(), 2);
  let plain = found
    .order_lines
    .iter()
    .find(|l| l.product_id == PLAIN)
    .expect("plain line");
  assert_eq!(plain.price, 25.0);
  assert_eq!(plain.product.as_ref().map(|p| p.price), Some(99.0));
  assert!(found.order_lines.iter().all(|l| l.product.is_some()));
  assert!((found.total_price - order.total_price).abs() < f64::EPSILON);
}

#[tokio::test]
#[serial]
async fn reads_never_push_stock() {
  let h = harness();
  let order = h
    .workflow
    .create(&caller(OWNER), request(&[(PLAIN, 1)]))
    .await
    .expect("order created");
  let snapshot = counters(&h.catalog, PLAIN);

  h.workflow.find_one(&caller(OWNER), order.id).await.expect("found");
  h.workflow
    .find_all(&caller(OWNER), PageForm::default())
    .await
    .expect("listed");

  assert_eq!(h.catalog.bulk_update_count(), 1);
  assert_eq!(counters(&h.catalog, PLAIN), snapshot);
}

#[tokio::test]
#[serial]
async fn find_one_checks_ownership_and_visibility() {
  let h = harness();
  let order = h
    .workflow
    .create(&caller(OWNER), request(&[(PLAIN, 1)]))
    .await
    .expect("order created");

  let err = h.workflow.find_one(&caller(STRANGER), order.id).await.unwrap_err();
  assert!(matches!(err, OrderError::PermissionDenied { .. }));

  let err = h.workflow.find_one(&caller(OWNER), 999).await.unwrap_err();
  assert!(matches!(err, OrderError::NotFound { order_id: 999 }));

  h.workflow.cancel(&caller(OWNER), order.id).await.expect("cancelled");
  let err = h.workflow.find_one(&caller(OWNER), order.id).await.unwrap_err();
  assert!(matches!(err, OrderError::NotFound { .. }));
}

#[tokio::test]
#[serial]
async fn find_all_pages_owner_orders_newest_first() {
  let h = harness();
  let mut created = Vec::new();
  for quantity in 1..=3 {
    let order = h
      .workflow
      .create(&caller(OWNER), request(&[(PLAIN, quantity), (VARIANT_B, 1)]))
      .await
      .expect("order created");
    created.push(order.id);
  }
  h.workflow
    .create(&caller(STRANGER), request(&[(PLAIN, 1)]))
    .await
    .expect("foreign order created");

  let lookups_before = h.catalog.lookup_count();
  let page = h
    .workflow
    .find_all(&caller(OWNER), PageForm { page: 1, size: 2 })
    .await
    .expect("first page");

  // One catalog lookup for the whole page.
  assert_eq!(h.catalog.lookup_count(), lookups_before + 1);
  assert_eq!(page.page_information.total_number_of_entities, 3);
  assert_eq!(page.page_information.total_number_of_pages, 2);
  let ids: Vec<_> = page.entities.iter().map(|o| o.id).collect();
  assert_eq!(ids, vec![created[2], created[1]]);
  for order in &page.entities {
    assert_eq!(order.created_by_user_id, OWNER);
    assert_eq!(order.order_lines.len(), 2);
    assert!(order.order_lines.iter().all(|l| l.product.is_some()));
  }

  let page = h
    .workflow
    .find_all(&caller(OWNER), PageForm { page: 2, size: 2 })
    .await
    .expect("second page");
  let ids: Vec<_> = page.entities.iter().map(|o| o.id).collect();
  assert_eq!(ids, vec![created[0]]);
}

#[tokio::test]
#[serial]
async fn empty_listing_skips_the_catalog() {
  let h = harness();
  let page = h
    .workflow
    .find_all(&caller(OWNER), PageForm::default())
    .await
    .expect("empty page");
  assert!(page.entities.is_empty());
  assert_eq!(page.page_information.total_number_of_entities, 0);
  assert_eq!(h.catalog.lookup_count(), 0);
}
