use super::mock::{CountingNavigator, MockTransport};
use super::*;
use crate::catalog::ProductDraft;
use crate::error::ApiErrorKind;
use crate::order::OrderStatus;
use crate::protocol::{
    ApproveOrderRequest, CancelOrderRequest, DeleteRequest, ListCustomersRequest,
    ListOrdersRequest, OrderDetailRequest, Products, UpdateRequest, UserAnalyticsRequest,
};
use crate::query::QueryKey;
use crate::session::MemoryStorage;
use crate::user::SessionUser;
use serde_json::json;
use std::rc::Rc;

const BASE: &str = "https://api.shop.test/api";

// =========================================================
// 辅助函数
// =========================================================

fn signed_in_store() -> SessionStore {
    let store = SessionStore::new(MemoryStorage::new());
    store.set(&Session {
        access_token: "tok-123".to_string(),
        refresh_token: "ref-456".to_string(),
        user: SessionUser {
            id: "1".to_string(),
            email: "admin@shop.gh".to_string(),
            role: "admin".to_string(),
        },
    });
    store
}

fn create_client(
    store: SessionStore,
) -> (
    GatewayClient<Rc<MockTransport>, CountingNavigator>,
    Rc<MockTransport>,
    CountingNavigator,
) {
    let transport = Rc::new(MockTransport::new());
    let navigator = CountingNavigator::default();
    let client = GatewayClient::new(
        format!("{}/", BASE),
        store,
        transport.clone(),
        navigator.clone(),
    )
    .with_shape_policy(ShapePolicy::Strict);
    (client, transport, navigator)
}

fn url(path: &str) -> String {
    format!("{}{}", BASE, path)
}

// =========================================================
// 凭据附加
// =========================================================

#[tokio::test]
async fn test_bearer_token_attached_when_session_exists() {
    let (client, transport, _) = create_client(signed_in_store());
    transport.mock_response(HttpMethod::Get, &url("/v1/list/"), 200, json!([]));

    client.call(&ListOrdersRequest).await.unwrap();

    let requests = transport.requests.borrow();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].header("Authorization"), Some("Bearer tok-123"));
    assert_eq!(requests[0].header("Content-Type"), Some("application/json"));
}

#[tokio::test]
async fn test_request_sent_unauthenticated_without_session() {
    let (client, transport, _) = create_client(SessionStore::new(MemoryStorage::new()));
    transport.mock_response(HttpMethod::Get, &url("/v1/list/"), 200, json!([]));

    client.call(&ListOrdersRequest).await.unwrap();

    let requests = transport.requests.borrow();
    assert_eq!(requests[0].header("Authorization"), None);
}

// =========================================================
// 401 处理
// =========================================================

#[tokio::test]
async fn test_unauthorized_clears_session_and_redirects_once() {
    let store = signed_in_store();
    let (client, transport, navigator) = create_client(store.clone());
    transport.mock_response(
        HttpMethod::Get,
        &url("/v1/list/"),
        401,
        json!({"detail": "Given token not valid for any token type"}),
    );

    let err = client.call(&ListOrdersRequest).await.unwrap_err();

    assert_eq!(err.kind, ApiErrorKind::Unauthorized);
    assert_eq!(err.message(), "Given token not valid for any token type");
    assert_eq!(store.get(), None);
    assert_eq!(navigator.redirects.get(), 1);
}

#[tokio::test]
async fn test_each_failing_call_redirects_exactly_once() {
    let (client, transport, navigator) = create_client(signed_in_store());
    transport.mock_response(HttpMethod::Get, &url("/v1/list/"), 401, json!({}));
    transport.mock_response(HttpMethod::Get, &url("/auth/users/all/"), 401, json!({}));

    let _ = client.call(&ListOrdersRequest).await;
    let _ = client.call(&ListCustomersRequest).await;

    assert_eq!(navigator.redirects.get(), 2);
    // 第二次请求时会话已被清除，因此不再携带 token
    let requests = transport.requests.borrow();
    assert_eq!(requests[1].header("Authorization"), None);
}

#[tokio::test]
async fn test_unauthorized_without_session_still_redirects() {
    let store = SessionStore::new(MemoryStorage::new());
    let (client, transport, navigator) = create_client(store.clone());
    transport.mock_response(HttpMethod::Get, &url("/auth/admin/analytics/users/"), 401, json!({}));

    let err = client.call(&UserAnalyticsRequest).await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(navigator.redirects.get(), 1);
    assert!(!store.is_present());
}

// =========================================================
// 其他错误透传
// =========================================================

#[tokio::test]
async fn test_validation_error_passes_through_with_server_message() {
    let store = signed_in_store();
    let (client, transport, navigator) = create_client(store.clone());
    transport.mock_response(
        HttpMethod::Post,
        &url("/v1/ord-1/approve/"),
        400,
        json!({"error": "Order is already cancelled"}),
    );

    let err = client
        .call(&ApproveOrderRequest {
            order_id: "ord-1".to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.kind, ApiErrorKind::Validation { status: 400 });
    assert_eq!(err.message(), "Order is already cancelled");
    assert!(store.is_present());
    assert_eq!(navigator.redirects.get(), 0);
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let (client, transport, navigator) = create_client(signed_in_store());
    transport.mock_response(HttpMethod::Get, &url("/v1/list/"), 503, json!(null));

    let err = client.call(&ListOrdersRequest).await.unwrap_err();

    assert_eq!(err.kind, ApiErrorKind::Server { status: 503 });
    assert_eq!(transport.requests.borrow().len(), 1);
    assert_eq!(navigator.redirects.get(), 0);
}

#[tokio::test]
async fn test_network_failure_keeps_session() {
    let store = signed_in_store();
    let (client, transport, navigator) = create_client(store.clone());
    transport.go_offline();

    let err = client.call(&ListOrdersRequest).await.unwrap_err();

    assert_eq!(err.kind, ApiErrorKind::Network);
    assert!(store.is_present());
    assert_eq!(navigator.redirects.get(), 0);
}

#[tokio::test]
async fn test_unexpected_shape_fails_under_strict_policy() {
    let (client, transport, _) = create_client(signed_in_store());
    transport.mock_response(HttpMethod::Get, &url("/v1/list/"), 200, json!({"orders": []}));

    let err = client.call(&ListOrdersRequest).await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::Shape);
}

#[tokio::test]
async fn test_unexpected_shape_is_empty_under_lenient_policy() {
    let (client, transport, _) = create_client(signed_in_store());
    let client = client.with_shape_policy(ShapePolicy::Lenient);
    transport.mock_response(HttpMethod::Get, &url("/v1/list/"), 200, json!({"orders": []}));

    let orders = client.call(&ListOrdersRequest).await.unwrap();
    assert!(orders.is_empty());
}

// =========================================================
// 业务请求
// =========================================================

#[tokio::test]
async fn test_list_orders_accepts_wrapped_and_paginated_shapes() {
    let (client, transport, _) = create_client(signed_in_store());
    transport.mock_response(
        HttpMethod::Get,
        &url("/v1/list/"),
        200,
        json!({"data": [{"order_id": "a", "status": "Approved"}]}),
    );
    let orders = client.call(&ListOrdersRequest).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].status, OrderStatus::Approved);

    transport.mock_response(
        HttpMethod::Get,
        &url("/v1/list/"),
        200,
        json!({"count": 2, "results": [{"order_id": "a"}, {"order_id": "b"}]}),
    );
    let orders = client.call(&ListOrdersRequest).await.unwrap();
    assert_eq!(orders.len(), 2);
}

#[tokio::test]
async fn test_order_detail_unwraps_data() {
    let (client, transport, _) = create_client(signed_in_store());
    transport.mock_response(
        HttpMethod::Get,
        &url("/v1/ord-9/"),
        200,
        json!({"data": {
            "order_id": "ord-9",
            "total_amount": "50.00",
            "order_items": [{"quantity": 1, "subtotal": "45.00"}]
        }}),
    );

    let order = client
        .call(&OrderDetailRequest {
            order_id: "ord-9".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(order.order_id, "ord-9");
    assert_eq!(order.order_items.len(), 1);
    assert!(order.total_discrepancy().is_some());
}

#[tokio::test]
async fn test_cancel_uses_patch_and_accepts_empty_body() {
    let (client, transport, _) = create_client(signed_in_store());
    transport.mock_response(HttpMethod::Patch, &url("/v1/ord-2/cancel/"), 204, json!(null));

    let request = CancelOrderRequest {
        order_id: "ord-2".to_string(),
    };
    client.call(&request).await.unwrap();

    assert_eq!(transport.requests.borrow()[0].method, HttpMethod::Patch);
    assert!(request.invalidates().contains(&QueryKey::Orders));
}

// =========================================================
// 登录 / 注销
// =========================================================

#[tokio::test]
async fn test_authenticate_stores_session() {
    let store = SessionStore::new(MemoryStorage::new());
    let (client, transport, _) = create_client(store.clone());
    transport.mock_response(
        HttpMethod::Post,
        &url("/auth/jwt/create/"),
        200,
        json!({
            "access": "new-access",
            "refresh": "new-refresh",
            "user": {"id": 3, "email": "ops@shop.gh", "role": "moderator"}
        }),
    );

    let session = client.authenticate(" ops@shop.gh ", "pw").await.unwrap();

    assert_eq!(store.get(), Some(session.clone()));
    assert_eq!(session.user.role, "moderator");

    let requests = transport.requests.borrow();
    let body: Value = serde_json::from_str(requests[0].body.as_deref().unwrap()).unwrap();
    assert_eq!(body, json!({"email": "ops@shop.gh", "password": "pw"}));
    assert_eq!(requests[0].header("Authorization"), None);
}

#[tokio::test]
async fn test_authenticate_rejects_empty_token() {
    let store = SessionStore::new(MemoryStorage::new());
    let (client, transport, _) = create_client(store.clone());
    transport.mock_response(HttpMethod::Post, &url("/auth/jwt/create/"), 200, json!({"access": ""}));

    let err = client.authenticate("a@b.c", "pw").await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::Decode);
    assert!(!store.is_present());
}

#[tokio::test]
async fn test_sign_out_clears_session_without_redirect() {
    let store = signed_in_store();
    let (client, _, navigator) = create_client(store.clone());

    client.sign_out();

    assert!(!store.is_present());
    assert_eq!(navigator.redirects.get(), 0);
}

// =========================================================
// 目录资源写操作
// =========================================================

#[tokio::test]
async fn test_update_and_delete_use_put_and_delete() {
    let (client, transport, _) = create_client(signed_in_store());
    transport.mock_response(HttpMethod::Put, &url("/products/5/"), 200, json!({"id": 5}));
    transport.mock_response(HttpMethod::Delete, &url("/products/5/"), 204, Value::Null);

    let update = UpdateRequest::<Products> {
        id: "5".to_string(),
        draft: ProductDraft {
            name: "Milk".to_string(),
            stock: 2,
            ..Default::default()
        },
    };
    client.call(&update).await.unwrap();
    client.call(&DeleteRequest::<Products>::new("5")).await.unwrap();

    let requests = transport.requests.borrow();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].method, HttpMethod::Put);
    let body: Value = serde_json::from_str(requests[0].body.as_deref().unwrap()).unwrap();
    assert_eq!(body["name"], json!("Milk"));
    assert_eq!(requests[1].method, HttpMethod::Delete);
    assert!(requests[1].body.is_none());
    assert_eq!(requests[1].header("Authorization"), Some("Bearer tok-123"));
}

#[tokio::test]
async fn test_delete_rejected_keeps_session() {
    let store = signed_in_store();
    let (client, transport, navigator) = create_client(store.clone());
    transport.mock_response(
        HttpMethod::Delete,
        &url("/products/9/"),
        403,
        json!({"detail": "You do not have permission to perform this action."}),
    );

    let err = client
        .call(&DeleteRequest::<Products>::new("9"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ApiErrorKind::Validation { status: 403 });
    assert!(err.message().starts_with("You do not have permission"));
    assert!(store.is_present());
    assert_eq!(navigator.redirects.get(), 0);
}
