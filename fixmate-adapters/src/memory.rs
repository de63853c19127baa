//! In-memory processor and store.
//!
//! Used for local development without credentials and for HTTP-level tests.
//! Both types are cheap to clone; clones share state, so a caller can keep
//! a handle after moving one into the service.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use fixmate_types::{
    Booking, BookingId, BookingStatus, BookingStore, GatewayError, IntentStatus, NewPaymentIntent,
    Payment, PaymentGateway, PaymentId, PaymentIntent, PaymentStatus, Settlement, StoreError,
};

// ─────────────────────────────────────────────────────────────────────────────
// Gateway
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct InMemoryGateway {
    intents: Arc<Mutex<HashMap<String, PaymentIntent>>>,
    created: Arc<Mutex<Vec<NewPaymentIntent>>>,
    auto_succeed: bool,
}

impl InMemoryGateway {
    /// New intents start in `requires_payment_method`.
    pub fn new() -> Self {
        Self::default()
    }

    /// New intents start `succeeded`, as if the paying client confirmed
    /// them immediately.
    pub fn auto_succeeding() -> Self {
        Self {
            auto_succeed: true,
            ..Self::default()
        }
    }

    /// Simulates the paying client moving an intent to `status`.
    /// Returns false if the intent does not exist.
    pub fn set_status(&self, id: &str, status: IntentStatus) -> bool {
        match lock(&self.intents).get_mut(id) {
            Some(intent) => {
                intent.status = status;
                true
            }
            None => false,
        }
    }

    pub fn intent(&self, id: &str) -> Option<PaymentIntent> {
        lock(&self.intents).get(id).cloned()
    }

    /// Every create request received, in order.
    pub fn created(&self) -> Vec<NewPaymentIntent> {
        lock(&self.created).clone()
    }
}

#[async_trait]
impl PaymentGateway for InMemoryGateway {
    async fn create_intent(&self, req: NewPaymentIntent) -> Result<PaymentIntent, GatewayError> {
        lock(&self.created).push(req.clone());

        if req.amount < 1 {
            return Err(GatewayError::Api {
                status: 400,
                message: "This value must be greater than or equal to 1.".into(),
            });
        }

        let id = format!("pi_{}", Uuid::new_v4().simple());
        let intent = PaymentIntent {
            client_secret: Some(format!("{}_secret_{}", id, Uuid::new_v4().simple())),
            id: id.clone(),
            amount: req.amount,
            currency: req.currency.code().to_string(),
            status: if self.auto_succeed {
                IntentStatus::Succeeded
            } else {
                IntentStatus::RequiresPaymentMethod
            },
            metadata: req.metadata,
        };

        lock(&self.intents).insert(id, intent.clone());
        Ok(intent)
    }

    async fn retrieve_intent(&self, id: &str) -> Result<PaymentIntent, GatewayError> {
        self.intent(id).ok_or_else(|| GatewayError::Api {
            status: 404,
            message: format!("No such payment_intent: '{id}'"),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Store
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct StoreState {
    bookings: HashMap<BookingId, Booking>,
    payments: Vec<(PaymentId, Payment)>,
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a booking.
    pub fn insert_booking(&self, booking: Booking) {
        lock(&self.state)
            .bookings
            .insert(booking.id.clone(), booking);
    }

    pub fn booking(&self, id: &BookingId) -> Option<Booking> {
        lock(&self.state).bookings.get(id).cloned()
    }

    /// Payments recorded against a booking, oldest first.
    pub fn payments_for(&self, booking_id: &BookingId) -> Vec<(PaymentId, Payment)> {
        lock(&self.state)
            .payments
            .iter()
            .filter(|(_, p)| p.booking_id.as_ref() == Some(booking_id))
            .cloned()
            .collect()
    }

    /// Every payment, oldest first.
    pub fn payments(&self) -> Vec<(PaymentId, Payment)> {
        lock(&self.state).payments.clone()
    }
}

#[async_trait]
impl BookingStore for InMemoryStore {
    async fn get_booking(&self, id: &BookingId) -> Result<Option<Booking>, StoreError> {
        Ok(self.booking(id))
    }

    async fn append_payment(&self, payment: &Payment) -> Result<PaymentId, StoreError> {
        let id = PaymentId::new(Uuid::new_v4().simple().to_string());
        lock(&self.state)
            .payments
            .push((id.clone(), payment.clone()));
        Ok(id)
    }

    async fn settle(&self, settlement: Settlement) -> Result<(), StoreError> {
        let mut state = lock(&self.state);
        let StoreState { bookings, payments } = &mut *state;

        // Check everything before writing anything.
        let payment = payments
            .iter_mut()
            .find(|(id, _)| *id == settlement.payment_id)
            .map(|(_, p)| p)
            .ok_or_else(|| StoreError::NotFound(format!("payments/{}", settlement.payment_id)))?;

        let booking = match &settlement.booking {
            Some(completion) => Some((
                bookings.get_mut(&completion.booking_id).ok_or_else(|| {
                    StoreError::NotFound(format!("bookings/{}", completion.booking_id))
                })?,
                completion.completed_at,
            )),
            None => None,
        };

        payment.status = PaymentStatus::Completed;
        if let Some((booking, completed_at)) = booking {
            booking.status = BookingStatus::Completed;
            booking.pricing.payment_status = PaymentStatus::Completed;
            booking.updated_at = Some(completed_at);
        }
        Ok(())
    }
}

/// Locks a mutex, recovering the data if a previous holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
