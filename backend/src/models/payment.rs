use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::property::MONEY_SCALE;
use super::validate::{non_negative_numeric, optional, required};
use super::{nullable, Entity, Lifecycle, PaymentStatus, PaymentType};
use crate::error::ValidationError;

pub const DEFAULT_CURRENCY: &str = "TRY";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payment {
    pub id: i64,
    pub amount: Decimal,
    pub payment_type: PaymentType,
    pub payment_method: String,
    pub currency: String,
    pub status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub user_id: i64,
    /// Cleared when the listing is deleted; the payment itself survives.
    pub property_id: Option<i64>,
    #[serde(flatten)]
    pub lifecycle: Lifecycle,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPayment {
    pub amount: Decimal,
    pub payment_type: PaymentType,
    pub payment_method: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub user_id: i64,
    pub property_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PaymentPatch {
    pub status: Option<PaymentStatus>,
    #[serde(deserialize_with = "nullable")]
    pub transaction_id: Option<Option<String>>,
    pub payment_method: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PaymentQuery {
    pub user_id: Option<i64>,
    pub property_id: Option<i64>,
    pub status: Option<PaymentStatus>,
    pub transaction_id: Option<String>,
}

impl Entity for Payment {
    const NAME: &'static str = "Payment";

    type New = NewPayment;
    type Patch = PaymentPatch;
    type Query = PaymentQuery;

    fn from_new(new: NewPayment) -> Self {
        Self {
            id: 0,
            amount: new.amount,
            payment_type: new.payment_type,
            payment_method: new.payment_method,
            currency: new.currency,
            status: new.status,
            transaction_id: new.transaction_id,
            user_id: new.user_id,
            property_id: new.property_id,
            lifecycle: Lifecycle::default(),
        }
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.lifecycle
    }

    fn apply_patch(&mut self, patch: PaymentPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(transaction_id) = patch.transaction_id {
            self.transaction_id = transaction_id;
        }
        if let Some(payment_method) = patch.payment_method {
            self.payment_method = payment_method;
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        non_negative_numeric("amount", self.amount, 18, MONEY_SCALE)?;
        required("payment_method", &self.payment_method, 50)?;
        required("currency", &self.currency, 3)?;
        optional("transaction_id", self.transaction_id.as_deref(), 100)
    }
}
