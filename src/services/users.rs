//! User and staff administration

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::ServiceContext;
use crate::envelope::{Paged, RecordKey};
use crate::error::Error;
use crate::list::ListSource;
use crate::query::{PagedQuery, Pagination, QueryBuilder};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(flatten)]
    pub key: RecordKey,

    #[serde(default)]
    pub first_name: Option<String>,

    #[serde(default)]
    pub last_name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    /// buyer, seller, admin or staff
    #[serde(default)]
    pub role: Option<String>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub created_at: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    pub fn id(&self) -> &str {
        self.key.as_str()
    }

    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(name), None) | (None, Some(name)) => name.clone(),
            (None, None) => self.email.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserFilter {
    pub search: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
}

impl UserFilter {
    /// Only staff accounts
    pub fn staff() -> Self {
        Self {
            role: Some("staff".to_string()),
            ..Default::default()
        }
    }
}

impl PagedQuery for UserFilter {
    fn to_query(&self, pagination: Pagination) -> QueryBuilder {
        let mut query = QueryBuilder::new();
        query
            .push_opt("search", self.search.as_deref())
            .push_opt("role", self.role.as_deref())
            .push_opt("status", self.status.as_deref())
            .paginate(pagination);
        query
    }
}

/// Client for `/api/admin/users`
#[derive(Debug, Clone)]
pub struct UsersService {
    ctx: ServiceContext,
}

impl UsersService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub async fn list(&self, filter: &UserFilter, pagination: Pagination) -> Result<Paged<User>, Error> {
        let url = self.ctx.url(&["api", "admin", "users"])?;
        let page = self
            .ctx
            .get(url)
            .query(filter.to_query(pagination))
            .execute::<Paged<User>>()
            .await?;
        page.validate()
    }

    /// Activate, suspend or ban an account
    pub async fn update_status(&self, id: &str, status: &str) -> Result<Value, Error> {
        let url = self.ctx.url(&["api", "admin", "users", id, "status"])?;
        self.ctx
            .patch(url)
            .json(&json!({ "status": status }))?
            .execute_value()
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<Value, Error> {
        let url = self.ctx.url(&["api", "admin", "users", id])?;
        self.ctx.delete(url).execute_value().await
    }
}

#[async_trait]
impl ListSource for UsersService {
    type Item = User;
    type Filter = UserFilter;

    async fn fetch(&self, filter: &UserFilter, pagination: Pagination) -> Result<Paged<User>, Error> {
        self.list(filter, pagination).await
    }

    async fn delete(&self, id: &str) -> Result<Value, Error> {
        UsersService::delete(self, id).await
    }

    /// Accepts `{"status": ...}`
    async fn update(&self, id: &str, payload: Value) -> Result<Value, Error> {
        match payload.get("status").and_then(Value::as_str) {
            Some(status) => self.update_status(id, status).await,
            None => Err(Error::general("user updates take a status")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staff_filter() {
        assert_eq!(
            UserFilter::staff()
                .to_query(Pagination::default())
                .to_query_string(),
            "role=staff&page=1&limit=10"
        );
    }

    #[test]
    fn test_display_name() {
        let user: User = serde_json::from_value(json!({
            "_id": "u1",
            "firstName": "Ada",
            "lastName": "Okafor",
            "email": "ada@example.com"
        }))
        .unwrap();
        assert_eq!(user.display_name(), "Ada Okafor");

        let anonymous: User = serde_json::from_value(json!({"id": "u2", "email": "x@y.z"})).unwrap();
        assert_eq!(anonymous.display_name(), "x@y.z");
        assert_eq!(anonymous.id(), "u2");
    }
}
