//! Client library for the Stancer payment API.
//!
//! Every API object is a typed handle ([`Payment`], [`Card`], [`Refund`]...)
//! over a shared [`Entity`]. Handles are cheap to clone; clones see the same
//! data. Existing objects are fetched lazily, on the first read of a field
//! that is not known yet, and only modified fields are sent back.
//!
//! ```no_run
//! use stancer::{Client, Config, ListParams, Payment, Resource, Searchable};
//!
//! # fn main() -> stancer::Result<()> {
//! let client = Client::new(Config::with_keys(["stest_1234567890abcdefghijklmn"])?)?;
//!
//! let payment = Payment::retrieve(&client, "paym_KIVaaHi7G8QAYMQpQOYBrUQE");
//! println!("{:?}", payment.amount()?);
//!
//! for payment in Payment::list(&client, &ListParams::new().order_id("815730837"))? {
//!     println!("{:?}", payment?.status()?);
//! }
//! # Ok(())
//! # }
//! ```

#[macro_use]
mod macros;
mod fields;

pub mod auth;
pub mod card;
pub mod customer;
pub mod device;
pub mod dispute;
pub mod payment;
pub mod refund;
pub mod sepa;

pub use auth::Auth;
pub use card::Card;
pub use customer::Customer;
pub use device::Device;
pub use dispute::Dispute;
pub use payment::Payment;
pub use refund::Refund;
pub use sepa::Sepa;

pub use stancer_core::{
    Client, Entity, Error, HttpClient, HttpError, HttpErrorKind, List, ListParams, Method,
    ReqwestClient, Resource, Result, Searchable, TypeKind, Value, ValueKind,
};
pub use stancer_types::{AuthStatus, Config, KeyChain, KeySlot, Mode, PaymentStatus, RefundStatus};
