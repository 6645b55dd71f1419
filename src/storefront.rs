//! Storefront
//!
//! The single owned context behind every purchaser-facing operation: the
//! session, the live cart, the checkout flow and the ports they talk to.
//! Adding to the cart while nobody is logged in parks the selection until
//! the next successful login, which replays it exactly once.

use std::{sync::Arc, time::Duration};

use jiff::civil::{Date, Time};
use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    admin::AdminReview,
    cart::{AddOutcome, Cart, CartError, CartLine, LineId, QuantityChange, Selection},
    catalog::{
        Catalog, CatalogError, CatalogGood, GoodsFilter, VenueFilter, VenueOffering,
        VenueSelection,
    },
    checkout::{Checkout, CheckoutError, CheckoutStep, PaymentProof},
    clock::{Clock, SystemClock},
    config::{ConfigError, StorefrontConfig},
    invoice::{self, DirectorySink, DocumentRenderer, DocumentSink, InvoiceError, RenderedDocument, TypstRenderer},
    messaging::{self, LogMessenger, Messenger},
    notify::{LogNotifier, NoticeKind, Notification, Notifier},
    orders::{Order, OrderId, OrderStore},
    search_history::SearchHistory,
    session::{Actor, AuthError, Credentials, Session},
    storage::{FileStore, KeyValueStore, MemoryStore, StorageError},
};

/// Notice shown after a selection goes into the cart.
pub const ADDED_NOTICE: &str = "Berhasil masuk keranjang!";

/// Storefront errors
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Wrapped session error
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Wrapped catalog error
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Wrapped cart error
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Wrapped checkout error
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// Wrapped storage error
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Wrapped document error
    #[error(transparent)]
    Invoice(#[from] InvoiceError),

    /// Wrapped configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The order is not among the actor's orders
    #[error("Pesanan #{0} tidak ditemukan.")]
    OrderNotFound(OrderId),
}

/// Outcome of an add-to-cart request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddResult {
    /// The selection is in the cart
    Added(AddOutcome),

    /// Nobody is logged in; the selection waits for the next login
    AuthenticationRequired,
}

/// Every side-effect port the storefront calls through.
#[derive(Debug, Clone)]
pub struct Ports {
    /// Persisted collections
    pub storage: Arc<dyn KeyValueStore>,

    /// Outbound chat handoff
    pub messenger: Arc<dyn Messenger>,

    /// Transient notices
    pub notifier: Arc<dyn Notifier>,

    /// Current time
    pub clock: Arc<dyn Clock>,

    /// Document format
    pub renderer: Arc<dyn DocumentRenderer>,

    /// Document destination
    pub sink: Arc<dyn DocumentSink>,
}

impl Ports {
    /// File-backed storage and document output from the configured
    /// directories, logging handoffs.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created.
    pub fn from_config(config: &StorefrontConfig) -> Result<Self, StorageError> {
        Ok(Self {
            storage: Arc::new(FileStore::open(&config.data_dir)?),
            sink: Arc::new(DirectorySink::new(&config.output_dir)),
            ..Self::in_memory()
        })
    }

    /// Nothing persisted, handoffs logged, documents written to the
    /// current directory.
    pub fn in_memory() -> Self {
        Self {
            storage: Arc::new(MemoryStore::new()),
            messenger: Arc::new(LogMessenger),
            notifier: Arc::new(LogNotifier),
            clock: Arc::new(SystemClock),
            renderer: Arc::new(TypstRenderer),
            sink: Arc::new(DirectorySink::new(".")),
        }
    }
}

/// Storefront
#[derive(Debug)]
pub struct Storefront {
    config: StorefrontConfig,
    catalog: Catalog,
    session: Session,
    cart: Cart,
    checkout: Checkout,
    pending_add: Option<Selection>,
    orders: Arc<OrderStore>,
    goods_history: SearchHistory,
    venue_history: SearchHistory,
    ports: Ports,
}

impl Storefront {
    /// Storefront over `catalog`, talking to `ports`.
    pub fn new(config: StorefrontConfig, catalog: Catalog, ports: Ports) -> Self {
        let orders = Arc::new(OrderStore::new(
            Arc::clone(&ports.storage),
            config.keys.orders.clone(),
        ));
        let goods_history =
            SearchHistory::new(Arc::clone(&ports.storage), config.keys.goods_history.clone());
        let venue_history =
            SearchHistory::new(Arc::clone(&ports.storage), config.keys.venue_history.clone());

        Self {
            session: Session::new(config.identity.clone()),
            config,
            catalog,
            cart: Cart::new(),
            checkout: Checkout::new(),
            pending_add: None,
            orders,
            goods_history,
            venue_history,
            ports,
        }
    }

    /// Bundled catalog and file-backed ports from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded or the data directory
    /// cannot be created.
    pub fn open(config: StorefrontConfig) -> Result<Self, StorefrontError> {
        let catalog = Catalog::bundled()?;
        let ports = Ports::from_config(&config)?;

        Ok(Self::new(config, catalog, ports))
    }

    /// Configuration in use.
    pub fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    /// Catalog
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Current actor.
    pub fn actor(&self) -> &Actor {
        self.session.actor()
    }

    /// Live cart.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Checkout flow.
    pub fn checkout(&self) -> &Checkout {
        &self.checkout
    }

    /// Selection waiting for a login, if any.
    pub fn pending_add(&self) -> Option<&Selection> {
        self.pending_add.as_ref()
    }

    /// Goods search history.
    pub fn goods_history(&self) -> &SearchHistory {
        &self.goods_history
    }

    /// Venue search history.
    pub fn venue_history(&self) -> &SearchHistory {
        &self.venue_history
    }

    /// Goods matching `filter`. A non-blank search term goes into the goods
    /// history.
    pub fn search_goods(&self, filter: &GoodsFilter) -> Vec<&CatalogGood> {
        remember(&self.goods_history, &filter.search);

        self.catalog.find_goods(filter)
    }

    /// Venues matching `filter`. A non-blank search term goes into the venue
    /// history.
    pub fn search_venues(&self, filter: &VenueFilter) -> Vec<&VenueOffering> {
        remember(&self.venue_history, &filter.search);

        self.catalog.find_venues(filter)
    }

    /// Logs in and replays a parked selection.
    ///
    /// Returns the outcome of the replay, if there was one.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Auth`] for a blank name; the parked
    /// selection stays parked.
    pub fn login(&mut self, credentials: Credentials) -> Result<Option<AddOutcome>, StorefrontError> {
        self.session.login(credentials)?;

        Ok(self.replay_pending_add())
    }

    /// Registers and replays a parked selection.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Auth`] when a field is missing; the parked
    /// selection stays parked.
    pub fn register(
        &mut self,
        credentials: Credentials,
    ) -> Result<Option<AddOutcome>, StorefrontError> {
        self.session.register(credentials)?;

        Ok(self.replay_pending_add())
    }

    /// Logs out, emptying the cart and resetting checkout.
    pub fn logout(&mut self) {
        self.session.logout();
        self.cart.clear();
        self.checkout.reset();
        self.pending_add = None;
    }

    /// Adds a selection, or parks it when nobody is logged in.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Cart`] when a venue configuration or
    /// officiant is already in the cart; the cart is left unchanged and a
    /// duplicate notice is shown.
    pub fn add_to_cart(
        &mut self,
        selection: impl Into<Selection>,
    ) -> Result<AddResult, StorefrontError> {
        let selection = selection.into();

        if !self.session.actor().is_authenticated() {
            info!(item = %selection.id(), "add parked until login");

            self.pending_add = Some(selection);

            return Ok(AddResult::AuthenticationRequired);
        }

        match self.cart.add(selection) {
            Ok(outcome) => {
                self.notify(NoticeKind::AddedToCart, ADDED_NOTICE);
                Ok(AddResult::Added(outcome))
            }
            Err(err @ CartError::AlreadyInCart { .. }) => {
                self.notify(NoticeKind::Duplicate, err.to_string());
                Err(err.into())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Adds a catalog good by id.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Catalog`] for unknown ids.
    pub fn add_good(&mut self, id: u32) -> Result<AddResult, StorefrontError> {
        let good = self.catalog.good(id)?.clone();

        self.add_to_cart(good)
    }

    /// Adds a configured venue.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Cart`] when the same configuration is
    /// already in the cart.
    pub fn add_venue(&mut self, selection: VenueSelection) -> Result<AddResult, StorefrontError> {
        self.add_to_cart(selection)
    }

    /// Adds an officiant by id.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Catalog`] for unknown ids and
    /// [`StorefrontError::Cart`] when the officiant is already in the cart.
    pub fn add_officiant(&mut self, id: u32) -> Result<AddResult, StorefrontError> {
        let officiant = self.catalog.officiant(id)?.clone();

        self.add_to_cart(officiant)
    }

    /// Changes the quantity of a good. Venue and officiant lines are left alone.
    pub fn update_quantity(&mut self, id: &LineId, delta: i64) -> QuantityChange {
        self.cart.update_quantity(id, delta)
    }

    /// Removes a line of any kind.
    pub fn remove_from_cart(&mut self, id: &LineId) -> Option<CartLine> {
        self.cart.remove(id)
    }

    /// Live cart total.
    ///
    /// # Errors
    ///
    /// Returns an error on a money arithmetic error.
    pub fn cart_total(&self) -> Result<Money<'static, Currency>, StorefrontError> {
        Ok(self.cart.total()?)
    }

    /// Opens checkout from the review step. The schedule survives reopening.
    pub fn open_checkout(&mut self) {
        self.checkout.open();
    }

    /// Chooses the ceremony date and time.
    pub fn set_schedule(&mut self, date: Date, time: Time) {
        self.checkout.set_event_date(date);
        self.checkout.set_event_time(time);
    }

    /// Moves to the payment proof step.
    ///
    /// # Errors
    ///
    /// Fails with a validation notice when nobody is logged in, the cart is
    /// empty or the schedule is incomplete.
    pub fn proceed_to_payment(&mut self) -> Result<OrderId, StorefrontError> {
        let result = self
            .checkout
            .proceed(self.session.actor(), &self.cart, self.ports.clock.as_ref())
            .cloned();

        self.validated(result)
    }

    /// Goes back to the review step.
    pub fn back_to_review(&mut self) {
        self.checkout.back();
    }

    /// Attaches the transfer proof.
    ///
    /// # Errors
    ///
    /// Fails outside the proof step.
    pub fn attach_proof(&mut self, proof: PaymentProof) -> Result<(), StorefrontError> {
        let result = self.checkout.attach_proof(proof);

        self.validated(result)
    }

    /// Finalises the order: persists it, issues the pending document, hands
    /// the confirmation to the merchant and empties the cart.
    ///
    /// The document and the message are best-effort and never fail the
    /// submission.
    ///
    /// # Errors
    ///
    /// Fails with a validation notice when the proof is missing, and with
    /// [`StorefrontError::Storage`] when the order cannot be persisted; the
    /// cart is kept in both cases.
    pub fn submit_order(&mut self) -> Result<Order, StorefrontError> {
        let result =
            self.checkout
                .build_order(self.session.actor(), &self.cart, self.ports.clock.as_ref());
        let order = self.validated(result)?;

        self.orders.append(order.clone())?;

        match invoice::generate(&order, self.ports.renderer.as_ref()) {
            Ok(document) => {
                if let Err(err) = self.ports.sink.save(&document) {
                    warn!(file = %document.file_name, error = %err, "document not saved");
                }
            }
            Err(err) => warn!(order = %order.id, error = %err, "pending document skipped"),
        }

        self.ports
            .messenger
            .send(&messaging::checkout_confirmation(&self.config.merchant_whatsapp, &order));

        self.cart.clear();
        self.checkout.mark_submitted(order.id.clone());

        Ok(order)
    }

    /// Current checkout step.
    pub fn checkout_step(&self) -> &CheckoutStep {
        self.checkout.step()
    }

    /// Orders placed by the logged-in actor, matched by phone or name, most
    /// recent first.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Auth`] when nobody is logged in.
    pub fn my_orders(&self) -> Result<Vec<Order>, StorefrontError> {
        let profile = self.session.require_profile()?;

        Ok(self.orders.orders_for(&profile.name, &profile.phone))
    }

    /// Issues the document for one of the actor's orders in its current status.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::OrderNotFound`] for orders that are not the
    /// actor's and [`InvoiceError::MissingSnapshot`] for orders without cart
    /// lines.
    pub fn download_invoice(&self, order_id: &OrderId) -> Result<RenderedDocument, StorefrontError> {
        let order = self
            .my_orders()?
            .into_iter()
            .find(|order| order.id == *order_id)
            .ok_or_else(|| StorefrontError::OrderNotFound(order_id.clone()))?;

        let document = invoice::generate(&order, self.ports.renderer.as_ref())?;
        self.ports.sink.save(&document)?;

        Ok(document)
    }

    /// Review surface, for admins only.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Auth`] unless an admin is logged in.
    pub fn admin(&self) -> Result<AdminReview, StorefrontError> {
        self.session.require_admin()?;

        Ok(AdminReview::new(
            Arc::clone(&self.orders),
            Arc::clone(&self.ports.renderer),
            Arc::clone(&self.ports.sink),
            Arc::clone(&self.ports.messenger),
        ))
    }

    fn replay_pending_add(&mut self) -> Option<AddOutcome> {
        let selection = self.pending_add.take()?;
        let name = self.session.actor().profile()?.name.clone();

        match self.cart.add(selection) {
            Ok(outcome) => {
                self.notify(
                    NoticeKind::Welcome,
                    format!("Selamat datang {name}, item telah ditambahkan ke keranjang."),
                );

                Some(outcome)
            }
            Err(err) => {
                self.notify(NoticeKind::Duplicate, err.to_string());

                None
            }
        }
    }

    fn validated<T>(&self, result: Result<T, CheckoutError>) -> Result<T, StorefrontError> {
        result.map_err(|err| {
            self.notify(NoticeKind::Validation, err.to_string());
            err.into()
        })
    }

    fn notify(&self, kind: NoticeKind, message: impl Into<String>) {
        let ttl = Duration::from_millis(self.config.notification_ttl_ms);

        self.ports
            .notifier
            .notify(Notification::new(kind, message).with_ttl(ttl));
    }
}

fn remember(history: &SearchHistory, term: &str) {
    if let Err(err) = history.record(term) {
        warn!(?history, error = %err, "search term not remembered");
    }
}
