//! Payments.
//!
//! A payment is paid with a [`Card`] or a [`Sepa`] account. Besides the
//! usual create/retrieve/update calls it can be refunded (in full or in
//! part), authenticated with 3-D Secure, and paid on the hosted payment page.

use crate::auth::{self, Auth};
use crate::card::{self, Card};
use crate::customer::{self, Customer};
use crate::device::{self, Device};
use crate::fields;
use crate::refund::{self, Refund};
use crate::sepa::{self, Sepa};
use reqwest::Url;
use stancer_core::{
    Derived, Error, Fault, Field, ListParams, Resource, Result, Rule, Schema, Searchable, TypeKind,
    Value, ValueKind, filter_error,
};
use stancer_types::{PaymentStatus, RefundStatus};
use tracing::{debug, info};

const ORDER_ID_MAX_LEN: i64 = 36;
const UNIQUE_ID_MAX_LEN: i64 = 36;

static FIELDS: [Field; 19] = [
    fields::AMOUNT,
    fields::CURRENCY,
    Field::boolean("capture").rule(Rule::new().throws(Fault::Type(TypeKind::PaymentCapture))),
    Field::text("description").rule(
        Rule::new()
            .between(3, 64)
            .throws(Fault::Value(ValueKind::PaymentDescription)),
    ),
    Field::text("order_id").rule(
        Rule::new()
            .max(ORDER_ID_MAX_LEN)
            .label("Order id")
            .throws(Fault::Value(ValueKind::PaymentOrderId)),
    ),
    Field::text("unique_id").rule(
        Rule::new()
            .max(UNIQUE_ID_MAX_LEN)
            .label("Unique ID")
            .throws(Fault::Value(ValueKind::PaymentUniqueId)),
    ),
    Field::text("return_url").rule(
        Rule::new()
            .label("Return URL")
            .check(https_return_url)
            .throws(Fault::Value(ValueKind::Url)),
    ),
    Field::text("status").rule(Rule::new().throws(Fault::Value(ValueKind::Status))),
    Field::entity("card", card::schema).rule(
        Rule::new()
            .derive(paid_by_card)
            .throws(Fault::Value(ValueKind::Card)),
    ),
    Field::entity("sepa", sepa::schema).rule(
        Rule::new()
            .derive(paid_by_sepa)
            .throws(Fault::Value(ValueKind::Sepa)),
    ),
    Field::entity("customer", customer::schema)
        .rule(Rule::new().throws(Fault::Value(ValueKind::Customer))),
    Field::entity("auth", auth::schema).rule(
        Rule::new()
            .coerce(Auth::coerce)
            .throws(Fault::Value(ValueKind::Auth)),
    ),
    Field::entity("device", device::schema)
        .rule(Rule::new().throws(Fault::Value(ValueKind::Device))),
    Field::text("method").read_only(),
    Field::text("response").read_only(),
    Field::integer("fee").read_only(),
    Field::datetime("date_bank").read_only(),
    Field::text("country").read_only(),
    Field::list("refunds", refund::schema).read_only(),
];

pub static SCHEMA: Schema = Schema::new("Payment", &FIELDS).endpoint("checkout");

pub fn schema() -> &'static Schema {
    &SCHEMA
}

/// Meaning of the most common API response codes.
const RESPONSES: [(&str, &str); 5] = [
    ("00", "OK"),
    ("05", "Do not honor"),
    ("41", "Lost card"),
    ("42", "Stolen card"),
    ("51", "Insufficient funds"),
];

fn https_return_url(value: &Value) -> Option<String> {
    fields::https_only(value, "Return URL must use HTTPS protocol.")
}

fn paid_by_card(_: &Value, derived: &mut Derived) {
    derived.push(("method", Value::from("card")));
}

fn paid_by_sepa(_: &Value, derived: &mut Derived) {
    derived.push(("method", Value::from("sepa")));
}

resource! {
    /// A payment.
    ///
    /// ```no_run
    /// # use stancer::{Card, Client, Config, Payment};
    /// # fn main() -> stancer::Result<()> {
    /// let client = Client::new(Config::with_keys(["stest_1234567890abcdefghijklmn"])?)?;
    ///
    /// let card = Card::detached();
    /// card.set_number("4111 1111 1111 1111")?;
    /// card.set_exp_month(12)?;
    /// card.set_exp_year(2030)?;
    /// card.set_cvc("123")?;
    ///
    /// let payment = Payment::new(&client);
    /// payment.set_amount(1000)?;
    /// payment.set_currency("eur")?;
    /// payment.set_card(&card)?;
    /// payment.send()?;
    /// # Ok(())
    /// # }
    /// ```
    Payment => SCHEMA
}

impl Payment {
    getters! {
        /// Amount in the smallest currency unit (cents).
        amount: int,
        auth: (Auth),
        capture: bool,
        card: (Card),
        country: text,
        currency: text,
        customer: (Customer),
        date_bank: date,
        description: text,
        device: (Device),
        /// Fee taken by Stancer, in cents.
        fee: int,
        /// "card" or "sepa", depending on the payment method.
        method: text,
        order_id: text,
        /// Response code of the bank (see [`Payment::response_message`]).
        response: text,
        return_url: text,
        sepa: (Sepa),
        status: text,
        unique_id: text,
    }

    setters! {
        set_amount(amount: int),
        /// Set to `false` to only authorize the payment.
        set_capture(capture: bool),
        set_card(card: (Card)),
        set_currency(currency: text),
        set_customer(customer: (Customer)),
        set_description(description: text),
        set_device(device: (Device)),
        set_order_id(order_id: ident),
        /// Page the customer goes back to after the payment page or the
        /// authentication. Must be an HTTPS URL.
        set_return_url(return_url: text),
        set_sepa(sepa: (Sepa)),
        set_unique_id(unique_id: ident),
    }

    pub fn set_status(&self, status: PaymentStatus) -> Result<()> {
        self.set("status", status.as_str())
    }

    /// Asks for a 3-D Secure authentication.
    ///
    /// Accepts an [`Auth`], a return URL, or `true` for a bare request.
    /// `false` leaves the payment as it is.
    pub fn set_auth(&self, auth: impl Into<Value>) -> Result<()> {
        self.set("auth", auth)
    }

    /// Refunds already made on this payment.
    pub fn refunds(&self) -> Result<Vec<Refund>> {
        Ok(self
            .read("refunds")?
            .entities()
            .cloned()
            .map(Refund::from_entity)
            .collect())
    }

    /// Meaning of the bank response code, when it is a well known one.
    pub fn response_message(&self) -> Result<Option<&'static str>> {
        Ok(self.response()?.and_then(|code| {
            RESPONSES
                .iter()
                .find(|(known, _)| *known == code)
                .map(|(_, message)| *message)
        }))
    }

    /// Returns true for a captured payment (or on its way to be), or an
    /// authorization asked without capture.
    pub fn is_success(&self) -> Result<bool> {
        let Some(status) = self.status()? else {
            return Ok(false);
        };

        Ok(match status.parse::<PaymentStatus>() {
            Ok(PaymentStatus::Authorized) => !self.capture()?.unwrap_or(false),
            Ok(PaymentStatus::Captured | PaymentStatus::ToCapture) => true,
            _ => false,
        })
    }

    /// Returns true when the payment has a status that is not a success.
    pub fn is_error(&self) -> Result<bool> {
        Ok(self.status()?.is_some() && !self.is_success()?)
    }

    // ── Remote operations ────────────────────────────────────────

    /// Creates or updates the payment.
    ///
    /// A new payment needs an amount, a currency and, if one is given, a
    /// complete payment method. Device information is collected from the
    /// environment for new payments with a payment method.
    pub fn send(&self) -> Result<()> {
        if !self.has_id() {
            self.check_before_create()?;
            self.attach_device()?;
        }

        self.0.send()
    }

    /// Payments cannot be deleted; refund them instead.
    pub fn delete(&self) -> Result<()> {
        Err(Error::NotImplemented(
            "You are not allowed to delete a payment, you need to refund it instead.".to_string(),
        ))
    }

    fn check_before_create(&self) -> Result<()> {
        if self.get("amount").is_null() {
            return Err(Error::value(
                ValueKind::Amount,
                "You must provide an amount before sending a payment.",
            ));
        }

        if self.get("currency").is_null() {
            return Err(Error::value(
                ValueKind::Currency,
                "You must provide a currency before sending a payment.",
            ));
        }

        let card = self.get("card").as_entity().cloned().map(Card::from_entity);
        if card.is_some_and(|card| !card.is_complete()) {
            return Err(Error::value(ValueKind::MissingPaymentMethod, "Your card is incomplete."));
        }

        let sepa = self.get("sepa").as_entity().cloned().map(Sepa::from_entity);
        if sepa.is_some_and(|sepa| !sepa.is_complete()) {
            return Err(Error::value(
                ValueKind::MissingPaymentMethod,
                "Your SEPA account is incomplete.",
            ));
        }

        Ok(())
    }

    /// Describes the device of the customer from the environment.
    ///
    /// Mandatory when an authentication is asked with a return URL,
    /// best-effort otherwise.
    fn attach_device(&self) -> Result<()> {
        if self.get("method").is_null() {
            return Ok(());
        }

        if let Some(device) = self.get("device").as_entity().cloned() {
            return Device::from_entity(device).hydrate_from_env();
        }

        let needs_device = self
            .get("auth")
            .as_entity()
            .is_some_and(|auth| !auth.get("return_url").is_null());

        let device = Device::detached();
        match device.hydrate_from_env() {
            Ok(()) => self.set_device(&device),
            Err(err) if needs_device => Err(err),
            Err(err) => {
                debug!(error = %err, "no device information available");
                Ok(())
            }
        }
    }

    // ── Payment page ─────────────────────────────────────────────

    /// Address of the hosted payment page for this payment.
    ///
    /// The payment must be sent first, with a return URL, and the client
    /// needs a public key. `lang` asks for a page language ("fr", "en").
    pub fn payment_page_url(&self, lang: Option<&str>) -> Result<String> {
        if self.return_url()?.is_none() {
            return Err(Error::value(
                ValueKind::MissingReturnUrl,
                "You must provide a return URL before going to the payment page.",
            ));
        }

        let Some(id) = self.id() else {
            return Err(Error::value(
                ValueKind::MissingPaymentId,
                "A payment ID is mandatory to obtain a payment page URL. Maybe you forgot to send the payment.",
            ));
        };

        let client = self.client().ok_or(Error::Detached)?;
        let config = client.config();
        let Some(public_key) = config.public_key() else {
            return Err(Error::value(
                ValueKind::MissingApiKey,
                "A public API key is needed to obtain a payment page URL.",
            ));
        };

        let host = config.host().replace("api", "payment");
        let address = match config.port() {
            Some(port) => format!("https://{host}:{port}/{public_key}/{id}"),
            None => format!("https://{host}/{public_key}/{id}"),
        };

        let mut url = Url::parse(&address).map_err(|e| {
            Error::value(ValueKind::Url, format!("Invalid payment page URL \"{address}\": {e}"))
        })?;
        if let Some(lang) = lang {
            url.query_pairs_mut().append_pair("lang", lang);
        }

        Ok(url.into())
    }

    // ── Refunds ──────────────────────────────────────────────────

    /// Sum of the refunds already made.
    pub fn refunded_amount(&self) -> Result<i64> {
        let mut total = 0;
        for refund in self.refunds()? {
            total += refund.amount()?.unwrap_or(0);
        }
        Ok(total)
    }

    /// Amount that can still be refunded.
    pub fn refundable_amount(&self) -> Result<i64> {
        Ok(self.amount()?.unwrap_or(0) - self.refunded_amount()?)
    }

    /// Refunds the payment, fully when `amount` is `None`.
    ///
    /// The new refund is appended to [`Payment::refunds`]. When the API
    /// does not answer with a pending refund, the payment is fetched again
    /// to pick up its new status.
    pub fn refund(&self, amount: Option<i64>) -> Result<Refund> {
        if !self.has_id() {
            return Err(Error::value(
                ValueKind::MissingPaymentId,
                "A payment ID is mandatory to refund a payment. Maybe you forgot to send the payment.",
            ));
        }

        if let Some(amount) = amount {
            if amount < 50 {
                return Err(Error::value(
                    ValueKind::Amount,
                    "Amount must be greater than or equal to 50.",
                ));
            }

            let refundable = self.refundable_amount()?;
            if amount > refundable {
                let currency = self.currency()?.unwrap_or_default().to_uppercase();
                return Err(Error::value(
                    ValueKind::Amount,
                    format!(
                        "You are trying to refund ({:.2} {currency}) more than possible ({:.2} {currency}).",
                        amount as f64 / 100.0,
                        refundable as f64 / 100.0,
                    ),
                ));
            }
        }

        let refund = Refund::for_payment(self, amount)?;
        refund.send()?;
        info!(payment = ?self.id(), refund = ?refund.id(), "payment refunded");

        self.hydrate([("refunds", Value::List(vec![refund.clone().into()]))])?;

        let pending = refund
            .status()?
            .is_some_and(|status| status == RefundStatus::ToRefund.as_str());
        if !pending {
            self.set_populated(false);
            self.populate()?;
        }

        Ok(refund)
    }
}

impl Searchable for Payment {
    fn filter_params(params: &ListParams) -> Result<Vec<(String, String)>> {
        let mut query = Vec::new();
        let filters = [
            ("order_id", "order ID", ORDER_ID_MAX_LEN, &params.order_id),
            ("unique_id", "unique ID", UNIQUE_ID_MAX_LEN, &params.unique_id),
        ];

        for (name, label, max, value) in filters {
            let Some(value) = value else {
                continue;
            };
            let length = value.chars().count() as i64;
            if !(1..=max).contains(&length) {
                return Err(filter_error(format!(
                    "A valid {label} must be between 1 and {max} characters."
                )));
            }
            query.push((name.to_string(), value.clone()));
        }

        Ok(query)
    }
}
