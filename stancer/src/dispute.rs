//! Disputes opened by customers on payments.

use crate::payment::{self, Payment};
use stancer_core::{Field, Schema, Searchable};

static FIELDS: [Field; 5] = [
    Field::integer("amount").read_only(),
    Field::text("currency").read_only(),
    Field::text("order_id").read_only(),
    Field::entity("payment", payment::schema).read_only(),
    Field::text("response").read_only(),
];

pub static SCHEMA: Schema = Schema::new("Dispute", &FIELDS).endpoint("disputes");

pub fn schema() -> &'static Schema {
    &SCHEMA
}

resource! {
    /// A dispute. Disputes are read-only.
    Dispute => SCHEMA
}

impl Dispute {
    getters! {
        amount: int,
        currency: text,
        order_id: text,
        /// Disputed payment.
        payment: (Payment),
        /// Response code of the dispute.
        response: text,
    }
}

impl Searchable for Dispute {}
