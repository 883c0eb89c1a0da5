//! Refunds.

use crate::fields;
use crate::payment::{self, Payment};
use stancer_core::{Entity, Field, Result, Schema};

static FIELDS: [Field; 6] = [
    fields::AMOUNT,
    fields::CURRENCY,
    Field::entity("payment", payment::schema).by_reference(),
    Field::text("status").read_only(),
    Field::datetime("date_bank").read_only(),
    Field::datetime("date_refund").read_only(),
];

pub static SCHEMA: Schema = Schema::new("Refund", &FIELDS).endpoint("refunds");

pub fn schema() -> &'static Schema {
    &SCHEMA
}

resource! {
    /// A refund of a payment, full or partial.
    ///
    /// Refunds are made with [`Payment::refund`]; they are sent with the
    /// identifier of the refunded payment.
    Refund => SCHEMA
}

impl Refund {
    getters! {
        amount: int,
        currency: text,
        /// Date the refund reached the bank.
        date_bank: date,
        /// Date the refund was processed.
        date_refund: date,
        /// Refunded payment. It is not fetched until one of its fields is read.
        payment: (Payment),
        status: text,
    }

    /// A new refund of `payment`, on the client of the payment. Without an
    /// amount, everything left is refunded.
    pub(crate) fn for_payment(payment: &Payment, amount: Option<i64>) -> Result<Self> {
        let refund = match payment.client() {
            Some(client) => Self::new(&client),
            None => Self::detached(),
        };

        // A bare handle keeps the payment from owning a refund that owns it.
        if let Some(id) = payment.id() {
            let target = Entity::with_id(payment::schema(), id);
            if let Some(client) = payment.client() {
                target.attach(&client);
            }
            refund.set("payment", target)?;
        }

        if let Some(amount) = amount {
            refund.set("amount", amount)?;
        }
        Ok(refund)
    }
}
