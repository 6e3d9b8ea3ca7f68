#![allow(dead_code)]

use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use terramartz_admin::auth::claims::now_epoch_secs;
use terramartz_admin::config::{ClientOptions, TokenStorage};
use terramartz_admin::TerraMartz;
use wiremock::MockServer;

pub fn mint(claims: Value) -> String {
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"terramartz-test"),
    )
    .unwrap()
}

pub fn admin_token() -> String {
    mint(json!({"id": "admin-1", "role": "admin", "exp": now_epoch_secs() + 3600}))
}

pub fn expired_token() -> String {
    mint(json!({"id": "admin-1", "role": "admin", "exp": 1}))
}

/// A paged body holding `rows` as page `page` of size `limit`
pub fn page_body(rows: Vec<Value>, page: u32, limit: u32, total: u64) -> Value {
    json!({
        "status": "success",
        "page": page,
        "limit": limit,
        "total": total,
        "results": rows.len(),
        "data": rows,
    })
}

pub fn product(id: &str, name: &str, approved: Option<bool>) -> Value {
    let mut product = json!({
        "_id": id,
        "name": name,
        "price": 3.25,
        "category": "vegetables",
        "status": "active",
    });
    if let Some(approved) = approved {
        product["adminApproved"] = json!(approved);
    }
    product
}

pub fn client(server: &MockServer) -> TerraMartz {
    TerraMartz::new_with_options(&server.uri(), ClientOptions::default()).unwrap()
}

pub fn legacy_client(server: &MockServer) -> TerraMartz {
    let options = ClientOptions::default().with_token_storage(TokenStorage::Legacy(None));
    TerraMartz::new_with_options(&server.uri(), options).unwrap()
}

pub fn logged_in_client(server: &MockServer) -> TerraMartz {
    let client = client(server);
    client.session().set_token(&admin_token());
    client
}
