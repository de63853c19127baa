//! Payment Application Service
//!
//! Orchestrates the payment processor and the booking store through their
//! ports. Contains NO infrastructure logic - pure business orchestration.

use chrono::Utc;

use fixmate_types::{
    AppError, Booking, BookingCompletion, BookingId, BookingStatus, BookingStore,
    CashPaymentRequest, CashPaymentResponse, ConfirmPaymentRequest, ConfirmPaymentResponse,
    CreateIntentRequest, CreateIntentResponse, Currency, DomainError, IntentMetadata,
    LegacyIntentRequest, LegacyIntentResponse, NewPaymentIntent, Payment, PaymentGateway,
    PaymentId, PaymentIntent, PaymentStatus, Settlement,
};

/// Currency used by the legacy intent route.
pub const LEGACY_CURRENCY: Currency = Currency::USD;

/// Settings the service needs from configuration.
#[derive(Debug, Clone)]
pub struct PaymentSettings {
    /// Currency for booking payments
    pub currency: Currency,
    /// Publishable key handed to clients alongside the client secret
    pub publishable_key: String,
}

/// Application service for payment operations.
///
/// Generic over the processor and the store - both adapters are injected
/// at construction. This enables:
/// - Running against the real processor and document store
/// - Testing with in-memory fakes and no network access
pub struct PaymentService<G: PaymentGateway, S: BookingStore> {
    gateway: G,
    store: S,
    settings: PaymentSettings,
}

impl<G: PaymentGateway, S: BookingStore> PaymentService<G, S> {
    /// Creates a new payment service with the given adapters.
    pub fn new(gateway: G, store: S, settings: PaymentSettings) -> Self {
        Self {
            gateway,
            store,
            settings,
        }
    }

    /// Returns a reference to the payment processor adapter.
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Returns a reference to the booking store adapter.
    pub fn store(&self) -> &S {
        &self.store
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Card payments
    // ─────────────────────────────────────────────────────────────────────────────

    /// Creates a payment intent for a booking.
    ///
    /// The processor is not called unless every field is present.
    pub async fn create_intent(
        &self,
        req: CreateIntentRequest,
    ) -> Result<CreateIntentResponse, AppError> {
        let charge = req.validate()?;
        let currency = self.settings.currency;
        let amount = currency.to_minor_units(charge.amount);

        let intent = self
            .gateway
            .create_intent(NewPaymentIntent {
                amount,
                currency,
                metadata: IntentMetadata {
                    booking_id: Some(charge.booking_id.to_string()),
                    customer_id: Some(charge.customer_id),
                    provider_id: Some(charge.provider_id),
                },
                automatic_payment_methods: true,
            })
            .await?;

        tracing::info!(
            intent_id = %intent.id,
            booking_id = %charge.booking_id,
            amount,
            %currency,
            "Payment intent created"
        );

        Ok(CreateIntentResponse {
            client_secret: client_secret(&intent)?,
            payment_intent_id: intent.id,
            publishable_key: self.settings.publishable_key.clone(),
        })
    }

    /// Records a card payment once the processor reports the intent as
    /// succeeded.
    ///
    /// This only reads the intent; confirmation itself happens client-side.
    /// A booking that is already completed is left untouched and no second
    /// payment record is written.
    pub async fn confirm_payment(
        &self,
        req: ConfirmPaymentRequest,
    ) -> Result<ConfirmPaymentResponse, AppError> {
        let (intent_id, booking_id) = req.validate()?;

        let intent = self.gateway.retrieve_intent(&intent_id).await?;
        if !intent.status.is_succeeded() {
            return Err(AppError::PaymentNotSucceeded(intent.status.as_str().into()));
        }

        let tagged_booking = intent.metadata.booking_id.as_deref();
        if let Some(tagged) = tagged_booking.filter(|tagged| *tagged != booking_id.as_str()) {
            tracing::warn!(
                intent_id = %intent.id,
                tagged_booking = tagged,
                booking_id = %booking_id,
                "Intent metadata names a different booking"
            );
        }

        let booking = self.load_booking(&booking_id).await?;
        match booking.status.complete() {
            Ok(_) => {}
            Err(DomainError::AlreadyCompleted) => {
                tracing::info!(booking_id = %booking_id, "Booking already completed, nothing to do");
                return Ok(ConfirmPaymentResponse {
                    success: true,
                    message: "Booking already completed".into(),
                    payment_status: PaymentStatus::Completed,
                    booking_status: BookingStatus::Completed,
                });
            }
            Err(e) => return Err(e.into()),
        }

        let payment = Payment::card(booking_id.clone(), &intent)?;
        let payment_id = self.store.append_payment(&payment).await?;
        self.settle(&payment_id, Some(booking_id)).await?;

        tracing::info!(intent_id = %intent.id, payment_id = %payment_id, "Card payment recorded");

        Ok(ConfirmPaymentResponse {
            success: true,
            message: "Payment confirmed successfully".into(),
            payment_status: PaymentStatus::Completed,
            booking_status: BookingStatus::Completed,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Cash payments
    // ─────────────────────────────────────────────────────────────────────────────

    /// Records a cash payment asserted by the caller.
    ///
    /// Every call appends a new COMPLETED payment. The booking is completed
    /// only if it is not completed already.
    pub async fn record_cash_payment(
        &self,
        req: CashPaymentRequest,
    ) -> Result<CashPaymentResponse, AppError> {
        let charge = req.validate()?;

        let booking = self.load_booking(&charge.booking_id).await?;
        let completes_booking = booking.status.complete().is_ok();

        let payment = Payment::cash(
            charge.booking_id.clone(),
            charge.amount,
            self.settings.currency,
            charge.customer_id,
            charge.provider_id,
        );
        let payment_id = self.store.append_payment(&payment).await?;
        self.settle(&payment_id, completes_booking.then_some(charge.booking_id))
            .await?;

        tracing::info!(payment_id = %payment_id, amount = charge.amount, "Cash payment recorded");

        let message = if completes_booking {
            "Cash payment recorded successfully"
        } else {
            "Cash payment recorded; booking was already completed"
        };

        Ok(CashPaymentResponse {
            success: true,
            message: message.into(),
            payment_id,
            booking_status: BookingStatus::Completed,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Legacy
    // ─────────────────────────────────────────────────────────────────────────────

    /// Creates an intent for a raw smallest-unit amount and logs a pending
    /// payment for the user.
    pub async fn create_legacy_intent(
        &self,
        req: LegacyIntentRequest,
    ) -> Result<LegacyIntentResponse, AppError> {
        let amount = req
            .amount
            .ok_or_else(|| DomainError::MissingFields(vec!["amount"]))?;

        let intent = self
            .gateway
            .create_intent(NewPaymentIntent {
                amount,
                currency: LEGACY_CURRENCY,
                metadata: IntentMetadata::default(),
                automatic_payment_methods: false,
            })
            .await?;

        self.store
            .append_payment(&Payment::legacy(req.user_id, LEGACY_CURRENCY, &intent))
            .await?;

        Ok(LegacyIntentResponse {
            client_secret: client_secret(&intent)?,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────────────

    async fn load_booking(&self, id: &BookingId) -> Result<Booking, AppError> {
        self.store
            .get_booking(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking {}", id)))
    }

    async fn settle(
        &self,
        payment_id: &PaymentId,
        complete: Option<BookingId>,
    ) -> Result<(), AppError> {
        let settlement = Settlement {
            payment_id: payment_id.clone(),
            booking: complete.map(|booking_id| BookingCompletion {
                booking_id,
                completed_at: Utc::now(),
            }),
        };

        self.store.settle(settlement).await.map_err(|e| {
            tracing::warn!(payment_id = %payment_id, error = %e, "Settlement failed, payment left PENDING");
            e.into()
        })
    }
}

fn client_secret(intent: &PaymentIntent) -> Result<String, AppError> {
    intent
        .client_secret
        .clone()
        .ok_or_else(|| AppError::Internal(format!("Payment intent {} has no client secret", intent.id)))
}
