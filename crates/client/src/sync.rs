//! Sync coordinator.
//!
//! Every mutation follows the same path:
//!
//! 1. validate the draft locally; invalid drafts never reach the network
//! 2. mark the entity in flight (a second submit on the same entity fails
//!    with [`SyncError::InFlight`] until the first one settles)
//! 3. send the request with the session's bearer token
//! 4. on success, refetch the affected list in full
//!
//! Failures leave local state untouched. Updates merge the patch onto the
//! entity currently in the store and send the whole merged draft; the
//! backend applies last-write-wins.

use bazaar_core::models::{
    Address, AddressDraft, AddressPatch, MAX_ADDRESSES_PER_USER, Order, PasswordChange,
    PortfolioDraft, PortfolioItem, PortfolioPatch, Product, ProductDraft, ProductPatch,
    ProfileForm, UserProfile,
};
use bazaar_core::types::{AddressId, OrderId, OrderStatus, PortfolioItemId, ProductId};
use bazaar_core::validation::{FieldErrors, LocalePatterns, Validate};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::api::{self, ApiRequest, ApiResponse, HttpTransport, Method, Transport};
use crate::config::ClientConfig;
use crate::error::{ApiError, SyncError};
use crate::store::{Action, EntityKey, EntityKind, ListKind, Session, Store};

/// Issues API calls and keeps the [`Store`] in step with the backend.
pub struct SyncCoordinator<T> {
    transport: T,
    store: Store,
    patterns: LocalePatterns,
}

impl SyncCoordinator<HttpTransport> {
    /// Coordinator over HTTP with a fresh store.
    ///
    /// The store starts signed in when the configuration carries a token.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let transport = HttpTransport::new(config)?;
        let store = Store::new();
        if let Some(token) = &config.api_token {
            store.dispatch(Action::SessionStarted(Session::new(token.clone())));
        }
        Ok(Self::new(transport, store, config.patterns.clone()))
    }
}

impl<T: Transport> SyncCoordinator<T> {
    #[must_use]
    pub const fn new(transport: T, store: Store, patterns: LocalePatterns) -> Self {
        Self {
            transport,
            store,
            patterns,
        }
    }

    #[must_use]
    pub const fn store(&self) -> &Store {
        &self.store
    }

    #[must_use]
    pub const fn patterns(&self) -> &LocalePatterns {
        &self.patterns
    }

    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    // ─── Lists ──────────────────────────────────────────────────────────────

    /// Fetch a list in full and replace it in the store.
    ///
    /// The result is dropped if the store epoch moved while the request was
    /// outstanding, or if a newer refresh of the same list was issued.
    ///
    /// # Errors
    ///
    /// Returns the [`SyncError`] the request failed with; the list keeps its
    /// previous items and is marked failed.
    #[tracing::instrument(skip(self))]
    pub async fn refresh(&self, list: ListKind) -> Result<(), SyncError> {
        let ticket = self.store.begin_request(list);

        let loaded = match list {
            ListKind::Products => self
                .fetch("/products")
                .await
                .map(|items| Action::ProductsLoaded { ticket, items }),
            ListKind::Addresses => self
                .fetch("/addresses")
                .await
                .map(|items| Action::AddressesLoaded { ticket, items }),
            ListKind::Orders => self
                .fetch("/orders")
                .await
                .map(|items| Action::OrdersLoaded { ticket, items }),
            ListKind::Portfolio => self
                .fetch("/portfolio")
                .await
                .map(|items| Action::PortfolioLoaded { ticket, items }),
            ListKind::Profile => self
                .fetch("/profile")
                .await
                .map(|profile| Action::ProfileLoaded { ticket, profile }),
        };

        match loaded {
            Ok(action) => {
                if self.store.dispatch(action) {
                    tracing::info!(%list, "refreshed");
                }
                Ok(())
            }
            Err(error) => {
                self.store.dispatch(Action::ListFailed {
                    list,
                    ticket,
                    message: error.to_string(),
                });
                Err(error)
            }
        }
    }

    /// # Errors
    ///
    /// See [`Self::refresh`].
    pub async fn refresh_products(&self) -> Result<Vec<Product>, SyncError> {
        self.refresh(ListKind::Products).await?;
        Ok(self.store.read(|state| state.products.items.clone()))
    }

    /// # Errors
    ///
    /// See [`Self::refresh`].
    pub async fn refresh_addresses(&self) -> Result<Vec<Address>, SyncError> {
        self.refresh(ListKind::Addresses).await?;
        Ok(self.store.read(|state| state.addresses.items.clone()))
    }

    /// # Errors
    ///
    /// See [`Self::refresh`].
    pub async fn refresh_orders(&self) -> Result<Vec<Order>, SyncError> {
        self.refresh(ListKind::Orders).await?;
        Ok(self.store.read(|state| state.orders.items.clone()))
    }

    /// # Errors
    ///
    /// See [`Self::refresh`].
    pub async fn refresh_portfolio(&self) -> Result<Vec<PortfolioItem>, SyncError> {
        self.refresh(ListKind::Portfolio).await?;
        Ok(self.store.read(|state| state.portfolio.items.clone()))
    }

    /// # Errors
    ///
    /// See [`Self::refresh`].
    pub async fn refresh_profile(&self) -> Result<Option<UserProfile>, SyncError> {
        self.refresh(ListKind::Profile).await?;
        Ok(self.store.read(|state| state.profile.clone()))
    }

    // ─── Products ───────────────────────────────────────────────────────────

    /// # Errors
    ///
    /// [`SyncError::Validation`] for an invalid draft, otherwise whatever the
    /// request failed with.
    #[tracing::instrument(skip_all)]
    pub async fn create_product(&self, draft: &ProductDraft) -> Result<(), SyncError> {
        self.check(draft)?;
        let key = EntityKey::draft(EntityKind::Product);
        let body = encode(draft)?;
        self.submit(key, Method::Post, "/products".into(), Some(body), ListKind::Products)
            .await
    }

    /// # Errors
    ///
    /// [`SyncError::NotFound`] if the product is not in the store, then as
    /// [`Self::create_product`].
    #[tracing::instrument(skip(self, patch), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: &ProductId,
        patch: ProductPatch,
    ) -> Result<(), SyncError> {
        let key = EntityKey::new(EntityKind::Product, id.as_str());
        let mut draft = self
            .store
            .read(|state| state.product(id).map(Product::to_draft))
            .ok_or_else(|| SyncError::NotFound(key.clone()))?;
        patch.apply(&mut draft);
        self.check(&draft)?;
        let body = encode(&draft)?;
        self.submit(key, Method::Put, format!("/products/{id}"), Some(body), ListKind::Products)
            .await
    }

    /// # Errors
    ///
    /// Whatever the request failed with.
    #[tracing::instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), SyncError> {
        let key = EntityKey::new(EntityKind::Product, id.as_str());
        self.submit(key, Method::Delete, format!("/products/{id}"), None, ListKind::Products)
            .await
    }

    // ─── Addresses ──────────────────────────────────────────────────────────

    /// Add an address.
    ///
    /// The per-user limit is checked against the store before anything is
    /// sent; the address list is fetched first if it was never loaded.
    ///
    /// # Errors
    ///
    /// [`SyncError::Validation`] for an invalid draft or when the user
    /// already has the maximum number of addresses.
    #[tracing::instrument(skip_all)]
    pub async fn create_address(&self, draft: &AddressDraft) -> Result<(), SyncError> {
        self.check(draft)?;

        if !self.store.read(|state| state.addresses.is_loaded()) {
            self.refresh(ListKind::Addresses).await?;
        }
        let count = self.store.read(|state| state.addresses.items.len());
        if count >= MAX_ADDRESSES_PER_USER {
            tracing::debug!(count, "address limit reached");
            return Err(SyncError::Validation(FieldErrors::single(
                "address",
                format!("You can save at most {MAX_ADDRESSES_PER_USER} addresses"),
            )));
        }

        let key = EntityKey::draft(EntityKind::Address);
        let body = encode(draft)?;
        self.submit(key, Method::Post, "/addresses".into(), Some(body), ListKind::Addresses)
            .await
    }

    /// # Errors
    ///
    /// [`SyncError::NotFound`] if the address is not in the store, then as
    /// [`Self::create_address`].
    #[tracing::instrument(skip(self, patch), fields(address_id = %id))]
    pub async fn update_address(
        &self,
        id: &AddressId,
        patch: AddressPatch,
    ) -> Result<(), SyncError> {
        let key = EntityKey::new(EntityKind::Address, id.as_str());
        let mut draft = self
            .store
            .read(|state| state.address(id).map(Address::to_draft))
            .ok_or_else(|| SyncError::NotFound(key.clone()))?;
        patch.apply(&mut draft);
        self.check(&draft)?;
        let body = encode(&draft)?;
        self.submit(key, Method::Put, format!("/addresses/{id}"), Some(body), ListKind::Addresses)
            .await
    }

    /// # Errors
    ///
    /// Whatever the request failed with.
    #[tracing::instrument(skip(self), fields(address_id = %id))]
    pub async fn delete_address(&self, id: &AddressId) -> Result<(), SyncError> {
        let key = EntityKey::new(EntityKind::Address, id.as_str());
        self.submit(key, Method::Delete, format!("/addresses/{id}"), None, ListKind::Addresses)
            .await
    }

    // ─── Portfolio ──────────────────────────────────────────────────────────

    /// # Errors
    ///
    /// [`SyncError::Validation`] for an invalid draft, otherwise whatever the
    /// request failed with.
    #[tracing::instrument(skip_all)]
    pub async fn create_portfolio_item(&self, draft: &PortfolioDraft) -> Result<(), SyncError> {
        self.check(draft)?;
        let key = EntityKey::draft(EntityKind::PortfolioItem);
        let body = encode(draft)?;
        self.submit(key, Method::Post, "/portfolio".into(), Some(body), ListKind::Portfolio)
            .await
    }

    /// # Errors
    ///
    /// [`SyncError::NotFound`] if the item is not in the store, then as
    /// [`Self::create_portfolio_item`].
    #[tracing::instrument(skip(self, patch), fields(portfolio_item_id = %id))]
    pub async fn update_portfolio_item(
        &self,
        id: &PortfolioItemId,
        patch: PortfolioPatch,
    ) -> Result<(), SyncError> {
        let key = EntityKey::new(EntityKind::PortfolioItem, id.as_str());
        let mut draft = self
            .store
            .read(|state| state.portfolio_item(id).map(PortfolioItem::to_draft))
            .ok_or_else(|| SyncError::NotFound(key.clone()))?;
        patch.apply(&mut draft);
        self.check(&draft)?;
        let body = encode(&draft)?;
        self.submit(key, Method::Put, format!("/portfolio/{id}"), Some(body), ListKind::Portfolio)
            .await
    }

    /// # Errors
    ///
    /// Whatever the request failed with.
    #[tracing::instrument(skip(self), fields(portfolio_item_id = %id))]
    pub async fn delete_portfolio_item(&self, id: &PortfolioItemId) -> Result<(), SyncError> {
        let key = EntityKey::new(EntityKind::PortfolioItem, id.as_str());
        self.submit(key, Method::Delete, format!("/portfolio/{id}"), None, ListKind::Portfolio)
            .await
    }

    // ─── Orders ─────────────────────────────────────────────────────────────

    /// Move an order to a new status.
    ///
    /// # Errors
    ///
    /// [`SyncError::NotFound`] if the order is not in the store, otherwise
    /// whatever the request failed with.
    #[tracing::instrument(skip(self), fields(order_id = %id))]
    pub async fn update_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<(), SyncError> {
        let key = EntityKey::new(EntityKind::Order, id.as_str());
        if self.store.read(|state| state.order(id).is_none()) {
            return Err(SyncError::NotFound(key));
        }
        let body = serde_json::json!({ "orderStatus": status.as_str() });
        self.submit(key, Method::Put, format!("/orders/{id}/status"), Some(body), ListKind::Orders)
            .await
    }

    // ─── Profile ────────────────────────────────────────────────────────────

    /// # Errors
    ///
    /// [`SyncError::Validation`] for an invalid form, otherwise whatever the
    /// request failed with.
    #[tracing::instrument(skip_all)]
    pub async fn update_profile(&self, form: &ProfileForm) -> Result<(), SyncError> {
        self.check(form)?;
        let key = EntityKey::new(EntityKind::Profile, "me");
        self.submit(key, Method::Put, "/profile".into(), Some(encode(form)?), ListKind::Profile)
            .await
    }

    /// Change the signed-in user's password. Nothing is refetched.
    ///
    /// # Errors
    ///
    /// [`SyncError::Validation`] for an invalid form, otherwise whatever the
    /// request failed with (a wrong current password comes back as a field
    /// error from the server).
    #[tracing::instrument(skip_all)]
    pub async fn change_password(&self, change: &PasswordChange) -> Result<(), SyncError> {
        self.check(change)?;
        let key = EntityKey::new(EntityKind::Profile, "password");
        let body = encode(change)?;
        self.guarded(key, self.mutate(Method::Put, "/profile/password", Some(body)))
            .await?;
        tracing::info!("password changed");
        Ok(())
    }

    // ─── Plumbing ───────────────────────────────────────────────────────────

    /// Validate a draft against this coordinator's patterns.
    pub(crate) fn check<V: Validate>(&self, draft: &V) -> Result<(), SyncError> {
        let errors = draft.validate(&self.patterns);
        if errors.is_valid() {
            Ok(())
        } else {
            tracing::debug!(fields = errors.len(), "rejected by local validation");
            Err(SyncError::Validation(errors))
        }
    }

    /// Run `operation` with `key` marked in flight.
    ///
    /// The key is released when `operation` settles or when the returned
    /// future is dropped before that.
    pub(crate) async fn guarded<R>(
        &self,
        key: EntityKey,
        operation: impl Future<Output = Result<R, SyncError>>,
    ) -> Result<R, SyncError> {
        if !self.store.dispatch(Action::MutationStarted(key.clone())) {
            tracing::debug!(%key, "duplicate submission");
            return Err(SyncError::InFlight(key));
        }
        let _in_flight = InFlight {
            store: &self.store,
            key,
        };
        operation.await
    }

    /// Send a mutation and refetch `refetch` once it succeeds.
    ///
    /// A failed refetch does not fail the mutation; the list is marked
    /// failed in the store instead.
    async fn submit(
        &self,
        key: EntityKey,
        method: Method,
        path: String,
        body: Option<Value>,
        refetch: ListKind,
    ) -> Result<(), SyncError> {
        self.guarded(key, self.mutate(method, &path, body)).await?;
        if let Err(error) = self.refresh(refetch).await {
            tracing::warn!(list = %refetch, %error, "refetch after mutation failed");
        }
        Ok(())
    }

    /// Send an authenticated request and decode its payload.
    pub(crate) async fn send_authed<R: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<R, SyncError> {
        let response = self.exchange(self.authed(method, path, body)?).await?;
        api::decode(response).map_err(|error| self.fail(error))
    }

    /// Send an authenticated request whose payload is not needed.
    async fn mutate(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<(), SyncError> {
        let response = self.exchange(self.authed(method, path, body)?).await?;
        api::expect_success(response).map_err(|error| self.fail(error))
    }

    fn authed(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<ApiRequest, SyncError> {
        let Some(token) = self.store.token() else {
            tracing::debug!(path, "no session");
            return Err(SyncError::Unauthorized);
        };
        let request = ApiRequest::new(method, path).bearer(token);
        Ok(match body {
            Some(body) => request.json(body),
            None => request,
        })
    }

    /// Fetch a payload, with the session token when there is one.
    async fn fetch<R: DeserializeOwned>(&self, path: &str) -> Result<R, SyncError> {
        let mut request = ApiRequest::get(path);
        if let Some(token) = self.store.token() {
            request = request.bearer(token);
        }
        let response = self.exchange(request).await?;
        api::decode(response).map_err(|error| self.fail(error))
    }

    async fn exchange(&self, request: ApiRequest) -> Result<ApiResponse, SyncError> {
        self.transport
            .send(request)
            .await
            .map_err(|error| self.fail(error))
    }

    /// Log a failed exchange and end the session on 401.
    fn fail(&self, error: ApiError) -> SyncError {
        match &error {
            ApiError::Unauthorized => {
                tracing::warn!("session rejected by backend");
                self.store.dispatch(Action::SessionExpired);
            }
            ApiError::Status { status, .. } if *status >= 500 => {
                tracing::warn!(%error, "server error");
            }
            _ => tracing::debug!(%error, "request failed"),
        }
        SyncError::from(error)
    }
}

/// Marks a key in flight until dropped.
struct InFlight<'a> {
    store: &'a Store,
    key: EntityKey,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.store.dispatch(Action::MutationFinished(self.key.clone()));
    }
}

/// Serialize a request body.
pub(crate) fn encode(body: &impl Serialize) -> Result<Value, SyncError> {
    serde_json::to_value(body).map_err(|e| SyncError::from(ApiError::Encode(e.to_string())))
}
