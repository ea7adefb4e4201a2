//! Request extractors that validate identifiers and bodies before any storage access.
//!
//! A resource's own id is checked first and reported as `invalid id`; ancestor
//! ids follow in path order (`invalid store id`, `invalid product id`), then the
//! `?id=` order query parameter (`invalid order id`).

use std::collections::HashMap;
use std::str::FromStr;

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Query, Request, rejection::JsonRejection},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use stockroom_core::{ItemId, OrderId, ProductId, StoreId};

use crate::error::AppError;

/// Which identifier failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    /// The addressed resource itself.
    Own,
    Store,
    Product,
    Order,
}

impl IdKind {
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Own => "invalid id",
            Self::Store => "invalid store id",
            Self::Product => "invalid product id",
            Self::Order => "invalid order id",
        }
    }

    fn reject(self) -> AppError {
        AppError::InvalidInput(self.message().to_string())
    }
}

/// Parse a raw identifier. Absent, blank and non-integer values are rejected.
///
/// # Errors
///
/// Returns `AppError::InvalidInput` carrying the message for `kind`.
pub fn parse_id<T: FromStr>(raw: Option<&str>, kind: IdKind) -> Result<T, AppError> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| kind.reject())
}

/// Raw path captures, looked up by name.
struct RawParams(HashMap<String, String>);

impl RawParams {
    async fn extract<S: Send + Sync>(parts: &mut Parts, state: &S) -> Self {
        // A failed capture behaves like a missing one so the per-id message wins.
        let params = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map(|Path(map)| map)
            .unwrap_or_default();
        Self(params)
    }

    fn id<T: FromStr>(&self, name: &str, kind: IdKind) -> Result<T, AppError> {
        parse_id(self.0.get(name).map(String::as_str), kind)
    }
}

/// `/stores/{storeid}`
#[derive(Debug, Clone, Copy)]
pub struct StorePath {
    pub store_id: StoreId,
}

impl<S: Send + Sync> FromRequestParts<S> for StorePath {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let raw = RawParams::extract(parts, state).await;
        Ok(Self {
            store_id: raw.id("storeid", IdKind::Own)?,
        })
    }
}

/// `/stores/{storeid}/products` and `/stores/{storeid}/orders`
#[derive(Debug, Clone, Copy)]
pub struct StoreScope {
    pub store_id: StoreId,
}

impl<S: Send + Sync> FromRequestParts<S> for StoreScope {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let raw = RawParams::extract(parts, state).await;
        Ok(Self {
            store_id: raw.id("storeid", IdKind::Store)?,
        })
    }
}

/// `/stores/{storeid}/products/{productid}`
#[derive(Debug, Clone, Copy)]
pub struct ProductPath {
    pub store_id: StoreId,
    pub product_id: ProductId,
}

impl<S: Send + Sync> FromRequestParts<S> for ProductPath {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let raw = RawParams::extract(parts, state).await;
        let product_id = raw.id("productid", IdKind::Own)?;
        Ok(Self {
            store_id: raw.id("storeid", IdKind::Store)?,
            product_id,
        })
    }
}

/// `/stores/{storeid}/products/{productid}/items`
#[derive(Debug, Clone, Copy)]
pub struct ProductScope {
    pub store_id: StoreId,
    pub product_id: ProductId,
}

impl<S: Send + Sync> FromRequestParts<S> for ProductScope {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let raw = RawParams::extract(parts, state).await;
        Ok(Self {
            store_id: raw.id("storeid", IdKind::Store)?,
            product_id: raw.id("productid", IdKind::Product)?,
        })
    }
}

/// `/stores/{storeid}/products/{productid}/items/{itemid}`
#[derive(Debug, Clone, Copy)]
pub struct ItemPath {
    pub store_id: StoreId,
    pub product_id: ProductId,
    pub item_id: ItemId,
}

impl<S: Send + Sync> FromRequestParts<S> for ItemPath {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let raw = RawParams::extract(parts, state).await;
        let item_id = raw.id("itemid", IdKind::Own)?;
        Ok(Self {
            store_id: raw.id("storeid", IdKind::Store)?,
            product_id: raw.id("productid", IdKind::Product)?,
            item_id,
        })
    }
}

/// `/stores/{storeid}/orders/{orderid}`
#[derive(Debug, Clone, Copy)]
pub struct OrderPath {
    pub store_id: StoreId,
    pub order_id: OrderId,
}

impl<S: Send + Sync> FromRequestParts<S> for OrderPath {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let raw = RawParams::extract(parts, state).await;
        let order_id = raw.id("orderid", IdKind::Own)?;
        Ok(Self {
            store_id: raw.id("storeid", IdKind::Store)?,
            order_id,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OrderQueryRaw {
    id: Option<String>,
}

/// The `?id={orderid}` query parameter of the assignment routes.
#[derive(Debug, Clone, Copy)]
pub struct OrderQuery {
    pub order_id: OrderId,
}

impl<S: Send + Sync> FromRequestParts<S> for OrderQuery {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let raw = Query::<OrderQueryRaw>::from_request_parts(parts, state)
            .await
            .map(|Query(q)| q.id)
            .unwrap_or_default();
        Ok(Self {
            order_id: parse_id(raw.as_deref(), IdKind::Order)?,
        })
    }
}

/// JSON request body whose rejections render as the failure envelope (422).
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Json::<T>::from_request(req, state)
            .await
            .map(|Json(value)| Self(value))
            .map_err(|rejection: JsonRejection| AppError::InvalidInput(rejection.body_text()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Request as HttpRequest;

    use super::*;

    #[test]
    fn test_parse_id_accepts_integers() {
        let id: StoreId = parse_id(Some("42"), IdKind::Store).unwrap();
        assert_eq!(id, StoreId::new(42));

        let id: OrderId = parse_id(Some(" 7 "), IdKind::Order).unwrap();
        assert_eq!(id, OrderId::new(7));
    }

    #[test]
    fn test_parse_id_rejects_missing_blank_and_garbage() {
        for raw in [None, Some(""), Some("   "), Some("abc"), Some("1.5"), Some("99999999999")] {
            let err = parse_id::<ProductId>(raw, IdKind::Product).unwrap_err();
            assert!(
                matches!(&err, AppError::InvalidInput(msg) if msg == "invalid product id"),
                "{raw:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_id_kind_messages() {
        assert_eq!(IdKind::Own.message(), "invalid id");
        assert_eq!(IdKind::Store.message(), "invalid store id");
        assert_eq!(IdKind::Product.message(), "invalid product id");
        assert_eq!(IdKind::Order.message(), "invalid order id");
    }

    #[tokio::test]
    async fn test_order_query_requires_id() {
        let (mut parts, ()) = HttpRequest::builder()
            .uri("/order?id=")
            .body(())
            .unwrap()
            .into_parts();
        let err = OrderQuery::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(msg) if msg == "invalid order id"));

        let (mut parts, ()) = HttpRequest::builder()
            .uri("/order?id=12")
            .body(())
            .unwrap()
            .into_parts();
        let query = OrderQuery::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(query.order_id, OrderId::new(12));
    }
}
