//! Admin verification over orders placed through the storefront, plus
//! legacy records written before cart lines were embedded.

use std::sync::Arc;

use jiff::civil::{date, time};
use testresult::TestResult;

use griya::{
    admin::{AdminError, ReviewSummary, VERIFY_PROMPT},
    catalog::Catalog,
    checkout::PaymentProof,
    config::StorefrontConfig,
    invoice::DocumentKind,
    orders::{Order, OrderId, OrderStatus},
    regions::Region,
    session::Credentials,
    storage::KeyValueStore,
    storefront::Storefront,
    testing::{Harness, ScriptedConfirmation},
};

const LEGACY_ORDERS: &str = r#"[
  {
    "id": "ORD-000042",
    "purchaser": "Nyoman Lama",
    "phone": "081200000042",
    "total": 250000,
    "status": "Baru",
    "items": ["Banten Pejati Lengkap"],
    "date": "2026-01-05",
    "eventDate": "2026-01-20",
    "eventTime": "07:00:00"
  }
]"#;

fn place_order(store: &mut Storefront) -> Result<Order, Box<dyn std::error::Error>> {
    store.login(Credentials::new("Kadek Dwi", "0813-3700-0999", Region::Gianyar))?;
    store.add_good(1)?;
    store.add_good(1)?;
    let venue = store.catalog().venue(301)?.configure()?;
    store.add_venue(venue)?;
    store.add_officiant(201)?;
    store.set_schedule(date(2026, 12, 1), time(10, 0, 0, 0));
    store.proceed_to_payment()?;
    store.attach_proof(PaymentProof::new("bukti.webp", "", vec![0])?)?;

    let order = store.submit_order()?;
    store.logout();

    Ok(order)
}

fn admin_login() -> Credentials {
    Credentials::new("ADMIN", "", Region::Denpasar)
}

#[test]
fn verifying_twice_leaves_the_order_paid_and_revenue_unchanged() -> TestResult {
    let harness = Harness::default();
    let mut store = Storefront::new(StorefrontConfig::default(), Catalog::bundled()?, harness.ports());
    let order = place_order(&mut store)?;

    store.login(admin_login())?;
    let review = store.admin()?;

    assert_eq!(review.pending().len(), 1);

    let confirmation = ScriptedConfirmation::accepting();
    let first = review.verify(&order.id, &confirmation)?;
    let second = review.verify(&order.id, &confirmation)?;

    assert_eq!(first.order.status, OrderStatus::Paid);
    assert_eq!(second.order.status, OrderStatus::Paid);
    assert_eq!(confirmation.prompts(), [VERIFY_PROMPT, VERIFY_PROMPT]);
    assert!(review.pending().is_empty());
    assert_eq!(review.history().len(), 1);
    assert_eq!(
        review.summary()?,
        ReviewSummary {
            pending: 0,
            orders: 1,
            revenue: 21_550_000,
        }
    );

    let document = first.document.ok_or("paid document missing")?;
    let text = String::from_utf8(document.bytes)?;

    assert_eq!(document.kind, DocumentKind::Paid);
    assert_eq!(document.file_name, format!("Invoice_LUNAS_{}.txt", order.id));
    assert!(text.contains("Dokumen ini sah dan diterbitkan otomatis oleh Griya Banten Online."));
    assert!(!text.contains("belum berlaku"));

    let recipients: Vec<_> = harness
        .messenger
        .sent()
        .into_iter()
        .map(|message| message.recipient)
        .collect();

    assert_eq!(recipients, ["6281234567890", "6281337000999", "6281337000999"]);

    Ok(())
}

#[test]
fn purchaser_download_follows_the_verified_status() -> TestResult {
    let harness = Harness::default();
    let mut store = Storefront::new(StorefrontConfig::default(), Catalog::bundled()?, harness.ports());
    let order = place_order(&mut store)?;

    store.login(admin_login())?;
    store.admin()?.verify(&order.id, &ScriptedConfirmation::accepting())?;
    store.logout();

    store.login(Credentials::new("Kadek Dwi", "0813-3700-0999", Region::Gianyar))?;
    let document = store.download_invoice(&order.id)?;

    assert_eq!(document.kind, DocumentKind::Paid);
    assert_eq!(document.file_name, format!("Invoice_LUNAS_{}.txt", order.id));

    Ok(())
}

#[test]
fn legacy_orders_are_pending_and_settle_without_a_document() -> TestResult {
    let harness = Harness::default();
    harness.storage.write("griya_orders", LEGACY_ORDERS)?;

    let mut store = Storefront::new(StorefrontConfig::default(), Catalog::bundled()?, harness.ports());
    store.login(admin_login())?;
    let review = store.admin()?;
    let id = OrderId::from("ORD-000042");

    assert_eq!(review.summary()?.pending, 1);

    let declined = review.verify(&id, &ScriptedConfirmation::declining());
    assert!(matches!(declined, Err(AdminError::Cancelled)));
    assert_eq!(review.pending().len(), 1);

    let verification = review.verify(&id, &ScriptedConfirmation::accepting())?;

    assert_eq!(verification.document, None);
    assert!(harness.sink.file_names().is_empty());
    assert!(matches!(
        review.resend_invoice(&id),
        Err(AdminError::MissingSnapshot(_))
    ));

    let persisted = harness.storage.read("griya_orders")?.ok_or("orders missing")?;
    assert!(persisted.contains("\"status\":\"LUNAS\""));

    Ok(())
}

#[test]
fn unknown_and_unpaid_orders_are_refused() -> TestResult {
    let harness = Harness::default();
    let mut store = Storefront::new(StorefrontConfig::default(), Catalog::bundled()?, harness.ports());
    let order = place_order(&mut store)?;

    store.login(admin_login())?;
    let review = store.admin()?;

    assert!(matches!(
        review.verify(&OrderId::from("ORD-123456"), &ScriptedConfirmation::accepting()),
        Err(AdminError::NotFound(_))
    ));
    assert!(matches!(
        review.resend_invoice(&order.id),
        Err(AdminError::NotPaid(_))
    ));

    review.verify(&order.id, &ScriptedConfirmation::accepting())?;
    let resent = review.resend_invoice(&order.id)?;

    assert_eq!(resent.kind, DocumentKind::Paid);
    assert_eq!(
        harness.sink.file_names().last().map(String::as_str),
        Some(resent.file_name.as_str())
    );

    Ok(())
}
