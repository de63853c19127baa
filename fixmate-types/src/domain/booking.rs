//! Booking domain model.
//!
//! Bookings are owned by the booking application; this service only ever
//! reads them and completes them after a payment event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de::IgnoredAny};

use super::payment::PaymentStatus;
use crate::error::DomainError;

/// Identifier of a Booking document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(String);

impl BookingId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for BookingId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for BookingId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for BookingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle status of a booking.
///
/// The lifecycle is one-way: `Pending -> Completed`. Statuses written by
/// other parts of the booking application read as `Unrecognized`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    #[default]
    Pending,
    Completed,
    #[serde(other)]
    Unrecognized,
}

impl BookingStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, BookingStatus::Completed)
    }

    /// Transitions to `Completed`.
    ///
    /// Re-completing a completed booking is rejected so callers can turn it
    /// into an explicit no-op instead of overwriting the same fields.
    pub fn complete(self) -> Result<BookingStatus, DomainError> {
        match self {
            BookingStatus::Completed => Err(DomainError::AlreadyCompleted),
            _ => Ok(BookingStatus::Completed),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Completed => "COMPLETED",
            BookingStatus::Unrecognized => "UNRECOGNIZED",
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pricing block nested in a booking document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    #[serde(default, deserialize_with = "null_as_default")]
    pub payment_status: PaymentStatus,
}

/// The subset of a booking document this service reads and writes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(default)]
    pub id: BookingId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: BookingStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pricing: Pricing,
    /// Read leniently: the booking application may store epoch millis, and
    /// anything unreadable decodes as `None`.
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Text(String),
    Millis(i64),
    Other(IgnoredAny),
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawTimestamp::deserialize(deserializer)? {
        RawTimestamp::Text(text) => DateTime::parse_from_rfc3339(&text)
            .ok()
            .map(|at| at.with_timezone(&Utc)),
        RawTimestamp::Millis(millis) => DateTime::from_timestamp_millis(millis),
        RawTimestamp::Other(_) => None,
    })
}

impl Booking {
    /// Creates a pending booking.
    pub fn pending(id: impl Into<BookingId>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Applies the completion transition: `status` and
    /// `pricing.paymentStatus` become COMPLETED and `updatedAt` is stamped.
    pub fn complete(&mut self, at: DateTime<Utc>) -> Result<(), DomainError> {
        self.status = self.status.complete()?;
        self.pricing.payment_status = PaymentStatus::Completed;
        self.updated_at = Some(at);
        Ok(())
    }
}
