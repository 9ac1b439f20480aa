//! Entity state store.
//!
//! An explicit, injectable container for everything the client has fetched.
//! State changes only through [`Store::dispatch`], which runs the reducer
//! and notifies every [`Store::subscribe`] receiver when something changed.
//!
//! # Stale results
//!
//! Each list request takes a [`ListTicket`] holding the store epoch it was
//! issued in and a per-list sequence number. Detaching a view or changing the
//! session bumps the epoch, and loaded/failed actions from an older epoch are
//! dropped, so a response that arrives after its view went away never lands
//! in state. Within one epoch, a result older than the newest request for the
//! same list is dropped too, so overlapping refreshes settle on the latest.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use bazaar_core::models::{Address, Order, PortfolioItem, Product, UserProfile};
use bazaar_core::types::{AddressId, OrderId, PortfolioItemId, ProductId, UserId};
use secrecy::SecretString;
use tokio::sync::watch;

/// A list the store keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ListKind {
    Products,
    Addresses,
    Orders,
    Portfolio,
    Profile,
}

impl ListKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Addresses => "addresses",
            Self::Orders => "orders",
            Self::Portfolio => "portfolio",
            Self::Profile => "profile",
        }
    }
}

impl std::fmt::Display for ListKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of entity a mutation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Product,
    Address,
    Order,
    PortfolioItem,
    Profile,
    Donation,
}

impl EntityKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Address => "address",
            Self::Order => "order",
            Self::PortfolioItem => "portfolio item",
            Self::Profile => "profile",
            Self::Donation => "donation",
        }
    }
}

/// Identifies one entity instance for the in-flight guard.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityKey {
    pub kind: EntityKind,
    pub id: String,
}

impl EntityKey {
    /// Key used while an entity without an id is being created.
    pub const NEW: &'static str = "new";

    #[must_use]
    pub fn new(kind: EntityKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    /// Key of a not-yet-created entity. One create per kind at a time.
    #[must_use]
    pub fn draft(kind: EntityKind) -> Self {
        Self::new(kind, Self::NEW)
    }
}

impl std::fmt::Display for EntityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind.as_str(), self.id)
    }
}

/// The signed-in session.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct Session {
    token: SecretString,
    user_id: Option<UserId>,
}

impl Session {
    #[must_use]
    pub const fn new(token: SecretString) -> Self {
        Self {
            token,
            user_id: None,
        }
    }

    #[must_use]
    pub fn with_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    #[must_use]
    pub const fn token(&self) -> &SecretString {
        &self.token
    }

    #[must_use]
    pub const fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"[REDACTED]")
            .field("user_id", &self.user_id)
            .finish()
    }
}

/// Load status of a list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

/// A fetched list and its load status.
#[derive(Debug, Clone)]
pub struct ListState<T> {
    pub status: LoadStatus,
    pub items: Vec<T>,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            status: LoadStatus::Idle,
            items: Vec::new(),
        }
    }
}

impl<T> ListState<T> {
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.status == LoadStatus::Loaded
    }

    fn replace(&mut self, items: Vec<T>) {
        self.items = items;
        self.status = LoadStatus::Loaded;
    }
}

/// Identifies one list request. Results carry it back to the reducer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListTicket {
    pub epoch: u64,
    pub request: u64,
}

/// Everything the store holds.
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    pub session: Option<Session>,
    /// Set when the backend ended the session; cleared by a new session.
    pub login_required: bool,
    pub epoch: u64,
    pub products: ListState<Product>,
    pub addresses: ListState<Address>,
    pub orders: ListState<Order>,
    pub portfolio: ListState<PortfolioItem>,
    pub profile: Option<UserProfile>,
    pub profile_status: LoadStatus,
    /// Entities with a mutation outstanding.
    pub in_flight: BTreeSet<EntityKey>,
    /// Sequence number of the last list request issued.
    pub request_seq: u64,
    /// Newest request issued per list.
    pub latest_requests: BTreeMap<ListKind, u64>,
}

impl StoreState {
    #[must_use]
    pub fn status(&self, list: ListKind) -> &LoadStatus {
        match list {
            ListKind::Products => &self.products.status,
            ListKind::Addresses => &self.addresses.status,
            ListKind::Orders => &self.orders.status,
            ListKind::Portfolio => &self.portfolio.status,
            ListKind::Profile => &self.profile_status,
        }
    }

    fn status_mut(&mut self, list: ListKind) -> &mut LoadStatus {
        match list {
            ListKind::Products => &mut self.products.status,
            ListKind::Addresses => &mut self.addresses.status,
            ListKind::Orders => &mut self.orders.status,
            ListKind::Portfolio => &mut self.portfolio.status,
            ListKind::Profile => &mut self.profile_status,
        }
    }

    /// Whether a mutation on `key` is outstanding. UIs disable the
    /// triggering control while this holds.
    #[must_use]
    pub fn is_in_flight(&self, key: &EntityKey) -> bool {
        self.in_flight.contains(key)
    }

    /// The newest request issued for `list`, or 0 if none was.
    #[must_use]
    pub fn latest_request(&self, list: ListKind) -> u64 {
        self.latest_requests.get(&list).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.products.items.iter().find(|product| &product.id == id)
    }

    #[must_use]
    pub fn address(&self, id: &AddressId) -> Option<&Address> {
        self.addresses.items.iter().find(|address| &address.id == id)
    }

    #[must_use]
    pub fn order(&self, id: &OrderId) -> Option<&Order> {
        self.orders.items.iter().find(|order| &order.id == id)
    }

    #[must_use]
    pub fn portfolio_item(&self, id: &PortfolioItemId) -> Option<&PortfolioItem> {
        self.portfolio.items.iter().find(|item| &item.id == id)
    }

    fn clear_data(&mut self) {
        self.products = ListState::default();
        self.addresses = ListState::default();
        self.orders = ListState::default();
        self.portfolio = ListState::default();
        self.profile = None;
        self.profile_status = LoadStatus::Idle;
        self.in_flight.clear();
    }
}

/// Every state transition the store accepts.
#[derive(Debug, Clone)]
pub enum Action {
    SessionStarted(Session),
    /// The backend rejected the token.
    SessionExpired,
    LoggedOut,
    /// Issues the next request number for `list`.
    ListRequested { list: ListKind, epoch: u64 },
    ProductsLoaded { ticket: ListTicket, items: Vec<Product> },
    AddressesLoaded { ticket: ListTicket, items: Vec<Address> },
    OrdersLoaded { ticket: ListTicket, items: Vec<Order> },
    PortfolioLoaded { ticket: ListTicket, items: Vec<PortfolioItem> },
    ProfileLoaded { ticket: ListTicket, profile: UserProfile },
    ListFailed {
        list: ListKind,
        ticket: ListTicket,
        message: String,
    },
    MutationStarted(EntityKey),
    MutationFinished(EntityKey),
    /// The view that requested data went away.
    ViewDetached,
}

/// Apply `action` to `state`. Returns whether anything changed.
fn reduce(state: &mut StoreState, action: Action) -> bool {
    match action {
        Action::SessionStarted(session) => {
            state.clear_data();
            state.session = Some(session);
            state.login_required = false;
            state.epoch += 1;
        }
        Action::SessionExpired => {
            state.clear_data();
            state.session = None;
            state.login_required = true;
            state.epoch += 1;
        }
        Action::LoggedOut => {
            state.clear_data();
            state.session = None;
            state.login_required = false;
            state.epoch += 1;
        }
        Action::ListRequested { list, epoch } => {
            if epoch != state.epoch {
                return false;
            }
            state.request_seq += 1;
            state.latest_requests.insert(list, state.request_seq);
            *state.status_mut(list) = LoadStatus::Loading;
        }
        Action::ProductsLoaded { ticket, items } => {
            if is_stale(state, ListKind::Products, ticket) {
                return false;
            }
            state.products.replace(items);
        }
        Action::AddressesLoaded { ticket, items } => {
            if is_stale(state, ListKind::Addresses, ticket) {
                return false;
            }
            state.addresses.replace(items);
        }
        Action::OrdersLoaded { ticket, items } => {
            if is_stale(state, ListKind::Orders, ticket) {
                return false;
            }
            state.orders.replace(items);
        }
        Action::PortfolioLoaded { ticket, items } => {
            if is_stale(state, ListKind::Portfolio, ticket) {
                return false;
            }
            state.portfolio.replace(items);
        }
        Action::ProfileLoaded { ticket, profile } => {
            if is_stale(state, ListKind::Profile, ticket) {
                return false;
            }
            state.profile = Some(profile);
            state.profile_status = LoadStatus::Loaded;
        }
        Action::ListFailed {
            list,
            ticket,
            message,
        } => {
            if is_stale(state, list, ticket) {
                return false;
            }
            *state.status_mut(list) = LoadStatus::Failed(message);
        }
        Action::MutationStarted(key) => return state.in_flight.insert(key),
        Action::MutationFinished(key) => return state.in_flight.remove(&key),
        Action::ViewDetached => {
            state.epoch += 1;
            for list in [
                ListKind::Products,
                ListKind::Addresses,
                ListKind::Orders,
                ListKind::Portfolio,
                ListKind::Profile,
            ] {
                let status = state.status_mut(list);
                if *status == LoadStatus::Loading {
                    *status = LoadStatus::Idle;
                }
            }
        }
    }
    true
}

fn is_stale(state: &StoreState, list: ListKind, ticket: ListTicket) -> bool {
    if ticket.epoch != state.epoch {
        tracing::debug!(
            %list,
            epoch = ticket.epoch,
            current = state.epoch,
            "dropping stale result"
        );
        return true;
    }
    let latest = state.latest_request(list);
    if ticket.request < latest {
        tracing::debug!(%list, request = ticket.request, latest, "dropping superseded result");
        return true;
    }
    false
}

/// Shared handle to the store. Clones observe and update the same state.
#[derive(Clone)]
pub struct Store {
    sender: Arc<watch::Sender<StoreState>>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// An empty store with no session.
    #[must_use]
    pub fn new() -> Self {
        Self::with_state(StoreState::default())
    }

    #[must_use]
    pub fn with_state(state: StoreState) -> Self {
        Self {
            sender: Arc::new(watch::Sender::new(state)),
        }
    }

    /// Apply an action. Returns whether the state changed.
    ///
    /// `MutationStarted` returns `false` when the key is already in flight,
    /// which is how callers detect a duplicate submission.
    pub fn dispatch(&self, action: Action) -> bool {
        self.sender.send_if_modified(|state| reduce(state, action))
    }

    /// A copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> StoreState {
        self.sender.borrow().clone()
    }

    /// Read the current state without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&StoreState) -> R) -> R {
        f(&self.sender.borrow())
    }

    /// A receiver notified after every change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.sender.subscribe()
    }

    /// Mark `list` loading and issue a ticket for the request.
    ///
    /// The epoch and sequence number are read in the same update that
    /// records the request.
    pub fn begin_request(&self, list: ListKind) -> ListTicket {
        let mut ticket = ListTicket::default();
        self.sender.send_if_modified(|state| {
            ticket.epoch = state.epoch;
            let changed = reduce(
                state,
                Action::ListRequested {
                    list,
                    epoch: state.epoch,
                },
            );
            ticket.request = state.latest_request(list);
            changed
        });
        ticket
    }

    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.read(|state| state.epoch)
    }

    /// The bearer token of the current session.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.read(|state| state.session.as_ref().map(|session| session.token().clone()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bazaar_core::types::Category;
    use rust_decimal_macros::dec;

    fn product(id: &str) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            description: String::new(),
            category: Category::Art,
            subcategory: "prints".into(),
            price: dec!(100),
            sale_price: None,
            total_stock: 1,
            image: None,
            seller_id: None,
        }
    }

    fn signed_in() -> Store {
        let store = Store::new();
        store.dispatch(Action::SessionStarted(Session::new(SecretString::from(
            "token-123",
        ))));
        store
    }

    #[test]
    fn test_load_replaces_items() {
        let store = signed_in();
        let ticket = store.begin_request(ListKind::Products);
        assert_eq!(store.snapshot().products.status, LoadStatus::Loading);

        store.dispatch(Action::ProductsLoaded {
            ticket,
            items: vec![product("p1"), product("p2")],
        });
        store.dispatch(Action::ProductsLoaded {
            ticket,
            items: vec![product("p3")],
        });

        let state = store.snapshot();
        assert!(state.products.is_loaded());
        assert_eq!(state.products.items.len(), 1);
        assert!(state.product(&ProductId::new("p3")).is_some());
    }

    #[test]
    fn test_results_after_detach_are_ignored() {
        let store = signed_in();
        let orders = store.begin_request(ListKind::Orders);
        let products = store.begin_request(ListKind::Products);
        store.dispatch(Action::ViewDetached);

        let changed = store.dispatch(Action::ProductsLoaded {
            ticket: products,
            items: vec![product("p1")],
        });
        assert!(!changed);

        let failed = store.dispatch(Action::ListFailed {
            list: ListKind::Orders,
            ticket: orders,
            message: "boom".into(),
        });
        assert!(!failed);

        let state = store.snapshot();
        assert!(state.products.items.is_empty());
        assert_eq!(state.orders.status, LoadStatus::Idle);
    }

    #[test]
    fn test_superseded_result_is_ignored() {
        let store = signed_in();
        let first = store.begin_request(ListKind::Products);
        let second = store.begin_request(ListKind::Products);
        assert!(second.request > first.request);
        assert_eq!(first.epoch, second.epoch);

        assert!(store.dispatch(Action::ProductsLoaded {
            ticket: second,
            items: vec![product("new")],
        }));
        assert!(!store.dispatch(Action::ProductsLoaded {
            ticket: first,
            items: vec![product("old")],
        }));
        assert!(!store.dispatch(Action::ListFailed {
            list: ListKind::Products,
            ticket: first,
            message: "timed out".into(),
        }));

        let state = store.snapshot();
        assert!(state.products.is_loaded());
        assert!(state.product(&ProductId::new("new")).is_some());
        assert!(state.product(&ProductId::new("old")).is_none());
    }

    #[test]
    fn test_requests_for_other_lists_do_not_supersede() {
        let store = signed_in();
        let products = store.begin_request(ListKind::Products);
        store.begin_request(ListKind::Orders);

        assert!(store.dispatch(Action::ProductsLoaded {
            ticket: products,
            items: vec![product("p1")],
        }));
    }

    #[test]
    fn test_session_expired_clears_everything() {
        let store = signed_in();
        let ticket = store.begin_request(ListKind::Products);
        store.dispatch(Action::ProductsLoaded {
            ticket,
            items: vec![product("p1")],
        });
        store.dispatch(Action::MutationStarted(EntityKey::draft(EntityKind::Product)));
        store.dispatch(Action::SessionExpired);

        let state = store.snapshot();
        assert!(state.session.is_none());
        assert!(state.login_required);
        assert!(state.products.items.is_empty());
        assert!(state.in_flight.is_empty());
        assert!(store.token().is_none());
    }

    #[test]
    fn test_duplicate_mutation_is_rejected() {
        let store = signed_in();
        let key = EntityKey::new(EntityKind::Product, "p1");

        assert!(store.dispatch(Action::MutationStarted(key.clone())));
        assert!(!store.dispatch(Action::MutationStarted(key.clone())));
        assert!(store.snapshot().is_in_flight(&key));

        assert!(store.dispatch(Action::MutationFinished(key.clone())));
        assert!(store.dispatch(Action::MutationStarted(key)));
    }

    #[test]
    fn test_failure_keeps_items() {
        let store = signed_in();
        let ticket = store.begin_request(ListKind::Products);
        store.dispatch(Action::ProductsLoaded {
            ticket,
            items: vec![product("p1")],
        });
        store.dispatch(Action::ListFailed {
            list: ListKind::Products,
            ticket,
            message: "HTTP error".into(),
        });

        let state = store.snapshot();
        assert_eq!(state.products.status, LoadStatus::Failed("HTTP error".into()));
        assert_eq!(state.products.items.len(), 1);
    }

    #[test]
    fn test_debug_redacts_token() {
        let session = Session::new(SecretString::from("token-123")).with_user(UserId::new("u1"));
        let debug = format!("{session:?}");
        assert!(!debug.contains("token-123"));
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let store = signed_in();
        let mut receiver = store.subscribe();

        store.dispatch(Action::LoggedOut);
        receiver.changed().await.unwrap();
        assert!(receiver.borrow_and_update().session.is_none());

        // No-op actions do not notify.
        store.dispatch(Action::MutationFinished(EntityKey::draft(EntityKind::Address)));
        assert!(!receiver.has_changed().unwrap());
    }
}
