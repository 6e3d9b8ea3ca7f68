mod common;

use chrono::NaiveDate;
use common::{logged_in_client, page_body};
use serde_json::json;
use std::time::Duration;
use terramartz_admin::list::{FetchOutcome, ListController};
use terramartz_admin::services::{FaqFilter, SellerOrderFilter, UserFilter};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn faq(id: &str, question: &str) -> serde_json::Value {
    json!({"_id": id, "question": question, "answer": "Yes.", "isActive": true})
}

#[tokio::test]
async fn test_confirmed_delete_refetches_current_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/faqs/admin/all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(
            vec![faq("f1", "Do you deliver?"), faq("f2", "Can I return produce?")],
            1,
            10,
            2,
        )))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/faqs/f1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success", "data": null})))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/faqs/admin/all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(
            vec![faq("f2", "Can I return produce?")],
            1,
            10,
            1,
        )))
        .mount(&mock_server)
        .await;

    let list = ListController::new(logged_in_client(&mock_server).faqs());
    list.refresh().await.unwrap();
    assert_eq!(list.rows().len(), 2);

    let pending = list.request_delete("f1");
    assert!(pending.is_delete());
    let outcome = pending.confirm().await.unwrap();

    assert_eq!(outcome.refreshed.unwrap(), FetchOutcome::Applied);
    assert_eq!(list.rows().len(), 1);
    assert_eq!(list.rows()[0].id(), "f2");
    assert_eq!(list.total(), 1);
}

#[tokio::test]
async fn test_cancelled_delete_sends_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let list = ListController::new(logged_in_client(&mock_server).faqs());
    list.request_delete("f1").cancel();
}

#[tokio::test]
async fn test_faq_toggle_through_update() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/api/faqs/f4"))
        .and(body_json(json!({"isActive": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/faqs/admin/all"))
        .and(query_param("isActive", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(vec![], 1, 10, 0)))
        .mount(&mock_server)
        .await;

    let list = ListController::new(logged_in_client(&mock_server).faqs());
    list.set_filter(FaqFilter {
        is_active: Some(true),
        ..Default::default()
    })
    .await
    .unwrap();

    let outcome = list
        .request_update("f4", json!({"isActive": false}))
        .confirm()
        .await
        .unwrap();

    assert_eq!(outcome.response["status"], "success");
    assert!(outcome.refreshed.is_ok());
}

#[tokio::test]
async fn test_slow_earlier_page_does_not_win() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/admin/users"))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page_body(vec![json!({"_id": "u1"})], 1, 1, 2))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/admin/users"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page_body(vec![json!({"_id": "u2"})], 2, 1, 2)),
        )
        .mount(&mock_server)
        .await;

    let list = ListController::with_limit(logged_in_client(&mock_server).users(), 1);

    let (first, second) = tokio::join!(list.set_page(1), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        list.set_page(2).await
    });

    assert_eq!(first.unwrap(), FetchOutcome::Superseded);
    assert_eq!(second.unwrap(), FetchOutcome::Applied);
    assert_eq!(list.rows()[0].id(), "u2");
    assert_eq!(list.pagination().page, 2);
}

#[tokio::test]
async fn test_failed_fetch_keeps_previous_rows() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/admin/users"))
        .and(query_param("role", "staff"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "boom"})))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/admin/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(
            vec![json!({"_id": "u1", "role": "buyer"})],
            1,
            10,
            1,
        )))
        .mount(&mock_server)
        .await;

    let list = ListController::new(logged_in_client(&mock_server).users());
    list.refresh().await.unwrap();

    let err = list.set_filter(UserFilter::staff()).await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert_eq!(list.rows().len(), 1);
    assert_eq!(list.filter(), UserFilter::staff());
}

#[tokio::test]
async fn test_seller_orders_list() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/admin/seller-orders/s1/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(
            vec![json!({"_id": "o1", "status": "delivered", "paymentStatus": "paid", "totalAmount": 42.5})],
            1,
            10,
            1,
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let source = logged_in_client(&mock_server).seller_orders().orders_of("s1");
    let list = ListController::new(source);
    list.set_filter(SellerOrderFilter {
        status: Some("delivered".to_string()),
        start_date: NaiveDate::from_ymd_opt(2024, 5, 1),
        ..Default::default()
    })
    .await
    .unwrap();

    assert_eq!(list.rows()[0].payment_status.as_deref(), Some("paid"));
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(
        requests[0].url.query(),
        Some("status=delivered&startDate=2024-05-01&page=1&limit=10")
    );
}
