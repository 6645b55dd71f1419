//! Checkout
//!
//! Drives the cart through review, payment proof and submission. The order
//! itself is built from the live cart at the moment the proof is finalised,
//! never from an earlier snapshot.

use std::path::Path;

use jiff::civil::{Date, Time};
use thiserror::Error;
use tracing::info;

use crate::{
    cart::{Cart, CartError, CartLine},
    clock::Clock,
    orders::{BANK_TRANSFER, Order, OrderId, OrderStatus},
    pricing::whole_rupiah,
    session::{Actor, AuthError},
};

const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];

/// Checkout errors
#[derive(Debug, Error, PartialEq)]
pub enum CheckoutError {
    /// Wrapped session error
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Nothing to check out
    #[error("Keranjang Anda masih kosong.")]
    EmptyCart,

    /// Ceremony date or time not chosen
    #[error("Mohon lengkapi tanggal dan jam upacara.")]
    MissingSchedule,

    /// Finalising without a payment proof
    #[error("Mohon upload bukti transfer terlebih dahulu.")]
    MissingProof,

    /// Payment proof is not an image
    #[error("Bukti transfer harus berupa gambar: {0}")]
    NotAnImage(String),

    /// Operation not valid in the current step
    #[error("Langkah checkout tidak sesuai (saat ini: {0}).")]
    WrongStep(&'static str),

    /// Wrapped cart error
    #[error(transparent)]
    Cart(#[from] CartError),
}

/// Checkout step.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CheckoutStep {
    /// Reviewing the cart and choosing the ceremony schedule
    #[default]
    Reviewing,

    /// Order id assigned, waiting for the transfer proof
    AwaitingProof {
        /// Id the order will be saved under
        order_id: OrderId,
    },

    /// Order saved
    Submitted {
        /// Id of the saved order
        order_id: OrderId,
    },
}

impl CheckoutStep {
    fn name(&self) -> &'static str {
        match self {
            CheckoutStep::Reviewing => "Reviewing",
            CheckoutStep::AwaitingProof { .. } => "AwaitingProof",
            CheckoutStep::Submitted { .. } => "Submitted",
        }
    }
}

/// An uploaded transfer receipt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentProof {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl PaymentProof {
    /// Accepts an upload when its content type or file extension names an image.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NotAnImage`] otherwise.
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self, CheckoutError> {
        let file_name = file_name.into();
        let content_type = content_type.into();

        let image_type = content_type.to_lowercase().starts_with("image/");
        let image_extension = Path::new(&file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                IMAGE_EXTENSIONS
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext))
            });

        if !image_type && !image_extension {
            return Err(CheckoutError::NotAnImage(file_name));
        }

        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }

    /// Uploaded file name.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Declared content type.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Raw bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Checkout
#[derive(Clone, Debug, Default)]
pub struct Checkout {
    step: CheckoutStep,
    event_date: Option<Date>,
    event_time: Option<Time>,
    proof: Option<PaymentProof>,
}

impl Checkout {
    /// Fresh checkout in [`CheckoutStep::Reviewing`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Current step.
    pub fn step(&self) -> &CheckoutStep {
        &self.step
    }

    /// Chosen ceremony date.
    pub fn event_date(&self) -> Option<Date> {
        self.event_date
    }

    /// Chosen ceremony time.
    pub fn event_time(&self) -> Option<Time> {
        self.event_time
    }

    /// Attached proof.
    pub fn proof(&self) -> Option<&PaymentProof> {
        self.proof.as_ref()
    }

    /// Sets the ceremony date.
    pub fn set_event_date(&mut self, date: Date) {
        self.event_date = Some(date);
    }

    /// Sets the ceremony time.
    pub fn set_event_time(&mut self, time: Time) {
        self.event_time = Some(time);
    }

    /// Reopens the flow from the start. The chosen schedule is kept, the
    /// proof is dropped.
    pub fn open(&mut self) {
        self.step = CheckoutStep::Reviewing;
        self.proof = None;
    }

    /// Goes back from the proof step to review, keeping schedule and proof.
    pub fn back(&mut self) {
        if matches!(self.step, CheckoutStep::AwaitingProof { .. }) {
            self.step = CheckoutStep::Reviewing;
        }
    }

    /// Forgets everything, including the schedule.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Moves from review to the proof step and assigns the order id.
    ///
    /// # Errors
    ///
    /// Fails, without changing the step, when nobody is logged in, the cart
    /// is empty or the ceremony date or time is missing.
    pub fn proceed(
        &mut self,
        actor: &Actor,
        cart: &Cart,
        clock: &dyn Clock,
    ) -> Result<&OrderId, CheckoutError> {
        if !matches!(self.step, CheckoutStep::Reviewing) {
            return Err(CheckoutError::WrongStep(self.step.name()));
        }

        if !actor.is_authenticated() {
            return Err(AuthError::NotAuthenticated.into());
        }

        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        if self.event_date.is_none() || self.event_time.is_none() {
            return Err(CheckoutError::MissingSchedule);
        }

        let order_id = OrderId::from_millis(clock.now().timestamp().as_millisecond());

        info!(order = %order_id, lines = cart.len(), "checkout awaiting payment proof");

        self.step = CheckoutStep::AwaitingProof { order_id };

        match &self.step {
            CheckoutStep::AwaitingProof { order_id } => Ok(order_id),
            step => Err(CheckoutError::WrongStep(step.name())),
        }
    }

    /// Attaches (or replaces) the transfer proof.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::WrongStep`] outside the proof step.
    pub fn attach_proof(&mut self, proof: PaymentProof) -> Result<(), CheckoutError> {
        if !matches!(self.step, CheckoutStep::AwaitingProof { .. }) {
            return Err(CheckoutError::WrongStep(self.step.name()));
        }

        self.proof = Some(proof);

        Ok(())
    }

    /// Builds the order from the live cart. Nothing is persisted here.
    ///
    /// # Errors
    ///
    /// Fails outside the proof step, without a proof, without a logged-in
    /// actor or on a money arithmetic error.
    pub fn build_order(
        &self,
        actor: &Actor,
        cart: &Cart,
        clock: &dyn Clock,
    ) -> Result<Order, CheckoutError> {
        let CheckoutStep::AwaitingProof { order_id } = &self.step else {
            return Err(CheckoutError::WrongStep(self.step.name()));
        };

        if self.proof.is_none() {
            return Err(CheckoutError::MissingProof);
        }

        let profile = actor.profile().ok_or(AuthError::NotAuthenticated)?;

        let (Some(event_date), Some(event_time)) = (self.event_date, self.event_time) else {
            return Err(CheckoutError::MissingSchedule);
        };

        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let snapshot = cart.snapshot();

        Ok(Order {
            id: order_id.clone(),
            purchaser: profile.name.clone(),
            phone: profile.phone.clone(),
            region: Some(profile.region),
            total: whole_rupiah(&cart.total()?),
            status: OrderStatus::AwaitingVerification,
            items: snapshot.iter().map(CartLine::name).collect(),
            cart_items: Some(snapshot),
            date: clock.now().date(),
            event_date,
            event_time,
            payment_method: BANK_TRANSFER.to_string(),
            has_proof: true,
        })
    }

    /// Marks the order as saved. The schedule is kept for the next order.
    pub fn mark_submitted(&mut self, order_id: OrderId) {
        info!(order = %order_id, "checkout submitted");

        self.step = CheckoutStep::Submitted { order_id };
        self.proof = None;
    }
}
