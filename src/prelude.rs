//! Griya prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    admin::{AdminError, AdminReview, AlwaysConfirm, Confirmation, ReviewSummary, Verification},
    cart::{AddOutcome, Cart, CartError, CartLine, LineId, LineKind, QuantityChange, Selection},
    catalog::{
        Catalog, CatalogError, CatalogGood, GoodsFilter, OfficiantProfile, PriceRange, VenueFilter,
        VenueOffering, VenuePackage, VenueSelection,
    },
    checkout::{Checkout, CheckoutError, CheckoutStep, PaymentProof},
    clock::{Clock, SystemClock},
    config::{ConfigError, StorefrontConfig},
    invoice::{
        DirectorySink, DocumentKind, DocumentRenderer, DocumentSink, InvoiceDocument, InvoiceError,
        RenderedDocument, TableRenderer, TypstRenderer,
    },
    messaging::{LogMessenger, Messenger, WhatsAppMessage},
    notify::{LogNotifier, NoticeKind, Notification, Notifier},
    orders::{Order, OrderId, OrderStatus, OrderStore},
    regions::Region,
    search_history::SearchHistory,
    session::{Actor, AuthError, Credentials, Profile, Session},
    storage::{FileStore, KeyValueStore, MemoryStore, StorageError},
    storefront::{AddResult, Ports, Storefront, StorefrontError},
};
