//! Tipping a seller.
//!
//! A donation is a two-step exchange around an external payment step:
//! the backend creates a payment intent, a [`PaymentConfirmer`] confirms it
//! with the payment provider, and the backend records the result. A declined
//! payment never reaches the second call.

use std::future::Future;

use bazaar_core::models::DonationRequest;
use bazaar_core::types::DonationId;
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::{Method, Transport};
use crate::error::SyncError;
use crate::store::{EntityKey, EntityKind};
use crate::sync::{SyncCoordinator, encode};

/// A payment intent issued by the backend.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    /// Handed to the payment provider only.
    pub client_secret: SecretString,
    pub payment_intent_id: String,
}

impl std::fmt::Debug for PaymentIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentIntent")
            .field("client_secret", &"[REDACTED]")
            .field("payment_intent_id", &self.payment_intent_id)
            .finish()
    }
}

/// The payment provider refused or failed to confirm an intent.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct PaymentDeclined(pub String);

/// Confirms a payment intent with the payment provider.
pub trait PaymentConfirmer: Send + Sync {
    /// # Errors
    ///
    /// Returns [`PaymentDeclined`] if the provider did not accept the payment.
    fn confirm(
        &self,
        intent: &PaymentIntent,
    ) -> impl Future<Output = Result<(), PaymentDeclined>> + Send;
}

/// What the backend recorded for a processed donation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DonationReceipt {
    #[serde(rename = "_id", alias = "id")]
    pub id: Option<DonationId>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub amount: Option<Decimal>,
    pub status: Option<String>,
    pub payment_intent_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProcessDonation<'a> {
    #[serde(flatten)]
    request: &'a DonationRequest,
    payment_intent_id: &'a str,
}

impl<T: Transport> SyncCoordinator<T> {
    /// Send a tip to a seller.
    ///
    /// One donation per seller may be outstanding at a time.
    ///
    /// # Errors
    ///
    /// [`SyncError::Validation`] for an invalid request, [`SyncError::Payment`]
    /// if the confirmer declines, otherwise whatever a request failed with.
    #[tracing::instrument(skip_all, fields(seller_id = %request.seller_id))]
    pub async fn donate<C: PaymentConfirmer>(
        &self,
        request: &DonationRequest,
        confirmer: &C,
    ) -> Result<DonationReceipt, SyncError> {
        self.check(request)?;
        let key = EntityKey::new(EntityKind::Donation, request.seller_id.as_str());
        self.guarded(key, self.run_donation(request, confirmer)).await
    }

    async fn run_donation<C: PaymentConfirmer>(
        &self,
        request: &DonationRequest,
        confirmer: &C,
    ) -> Result<DonationReceipt, SyncError> {
        let body = encode(request)?;
        let intent: PaymentIntent = self
            .send_authed(Method::Post, "/donations/create-intent", Some(body))
            .await?;
        tracing::debug!(payment_intent_id = %intent.payment_intent_id, "payment intent created");

        if let Err(declined) = confirmer.confirm(&intent).await {
            tracing::warn!(
                payment_intent_id = %intent.payment_intent_id,
                reason = %declined,
                "payment declined"
            );
            return Err(SyncError::Payment(declined.0));
        }

        let body = encode(&ProcessDonation {
            request,
            payment_intent_id: &intent.payment_intent_id,
        })?;
        let receipt: Option<DonationReceipt> = self
            .send_authed(Method::Post, "/donations/process", Some(body))
            .await?;
        tracing::info!(amount = %request.amount, "donation processed");
        Ok(receipt.unwrap_or_default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::store::{Action, Session, Store};
    use crate::testing::FakeTransport;
    use bazaar_core::types::UserId;
    use bazaar_core::validation::LocalePatterns;
    use rust_decimal_macros::dec;
    use secrecy::ExposeSecret;
    use serde_json::json;

    struct Approve;

    impl PaymentConfirmer for Approve {
        async fn confirm(&self, intent: &PaymentIntent) -> Result<(), PaymentDeclined> {
            assert_eq!(intent.client_secret.expose_secret(), "pi_1_secret");
            Ok(())
        }
    }

    struct Decline;

    impl PaymentConfirmer for Decline {
        async fn confirm(&self, _intent: &PaymentIntent) -> Result<(), PaymentDeclined> {
            Err(PaymentDeclined("Your card was declined.".into()))
        }
    }

    fn coordinator() -> (SyncCoordinator<FakeTransport>, FakeTransport) {
        let transport = FakeTransport::new();
        transport.route(
            Method::Post,
            "/donations/create-intent",
            200,
            json!({
                "success": true,
                "data": {"clientSecret": "pi_1_secret", "paymentIntentId": "pi_1"}
            }),
        );
        let store = Store::new();
        store.dispatch(Action::SessionStarted(Session::new(SecretString::from("token-123"))));
        (
            SyncCoordinator::new(transport.clone(), store, LocalePatterns::default()),
            transport,
        )
    }

    fn request() -> DonationRequest {
        DonationRequest {
            amount: dec!(250),
            message: "Lovely glaze".into(),
            buyer_id: UserId::new("u1"),
            seller_id: UserId::new("u2"),
        }
    }

    #[tokio::test]
    async fn test_donation_flow() {
        let (sync, transport) = coordinator();
        transport.route(
            Method::Post,
            "/donations/process",
            200,
            json!({"success": true, "data": {"_id": "d1", "amount": 250, "status": "completed"}}),
        );

        let receipt = sync.donate(&request(), &Approve).await.unwrap();

        assert_eq!(receipt.id, Some(DonationId::new("d1")));
        assert_eq!(receipt.amount, Some(dec!(250)));
        assert_eq!(
            transport.calls(),
            ["POST /donations/create-intent", "POST /donations/process"]
        );
        let requests = transport.requests();
        let body = requests[1].body.as_ref().unwrap();
        assert_eq!(body["paymentIntentId"], "pi_1");
        assert_eq!(body["sellerId"], "u2");
        assert!(sync.store().snapshot().in_flight.is_empty());
    }

    #[tokio::test]
    async fn test_declined_payment_skips_processing() {
        let (sync, transport) = coordinator();

        let err = sync.donate(&request(), &Decline).await.unwrap_err();

        assert!(matches!(
            err,
            SyncError::Payment(ref reason) if reason == "Your card was declined."
        ));
        assert_eq!(transport.calls(), ["POST /donations/create-intent"]);
    }

    #[tokio::test]
    async fn test_self_donation_rejected_locally() {
        let (sync, transport) = coordinator();
        let mut request = request();
        request.seller_id = UserId::new("u1");

        let err = sync.donate(&request, &Approve).await.unwrap_err();

        assert!(err.field_errors().unwrap().get("sellerId").is_some());
        assert!(transport.requests().is_empty());
    }
}
