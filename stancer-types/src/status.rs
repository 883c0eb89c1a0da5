//! Statuses reported by the API.
//!
//! Entities store statuses as plain strings (that is what goes on the wire);
//! these enums give them a typed view.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! api_status {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $value:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $value)]
                $variant,
            )+
        }

        impl $name {
            /// Every known status.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Returns the string form used by the API.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $value,)+
                }
            }

            /// Returns true if `value` is the string form of a known status.
            #[must_use]
            pub fn has_value(value: &str) -> bool {
                Self::ALL.iter().any(|status| status.as_str() == value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    $($value => Ok($name::$variant),)+
                    other => Err(Error::UnknownStatus(other.to_string())),
                }
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.as_str() == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.as_str() == *other
            }
        }
    };
}

api_status! {
    /// Lifecycle of a payment.
    PaymentStatus {
        Authorize => "authorize",
        Authorized => "authorized",
        Canceled => "canceled",
        Capture => "capture",
        Captured => "captured",
        Disputed => "disputed",
        Expired => "expired",
        Failed => "failed",
        ToCapture => "to_capture",
    }
}

api_status! {
    /// Lifecycle of a refund.
    RefundStatus {
        NotHonored => "not_honored",
        PaymentCanceled => "payment_canceled",
        RefundSent => "refund_sent",
        Refunded => "refunded",
        ToRefund => "to_refund",
    }
}

api_status! {
    /// State of a 3-D Secure authentication.
    AuthStatus {
        Attempted => "attempted",
        Available => "available",
        Declined => "declined",
        Expired => "expired",
        Failed => "failed",
        Request => "request",
        Requested => "requested",
        Success => "success",
        Unavailable => "unavailable",
    }
}
