//! Method-specific details entered by the shopper.

use serde::{Deserialize, Serialize};

use crate::method::PaymentMethod;

/// Card fields as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDetails {
    pub number: String,
    pub expiry: String,
    pub cvv: String,
    pub name: String,
}

impl CardDetails {
    pub fn new(
        number: impl Into<String>,
        expiry: impl Into<String>,
        cvv: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            number: number.into(),
            expiry: expiry.into(),
            cvv: cvv.into(),
            name: name.into(),
        }
    }

    /// Returns the card number with only its last four digits visible.
    pub fn masked_number(&self) -> String {
        let digits: Vec<char> = self.number.chars().filter(char::is_ascii_digit).collect();
        let visible = digits.len().saturating_sub(4);
        digits
            .iter()
            .enumerate()
            .map(|(i, d)| if i < visible { '*' } else { *d })
            .collect()
    }
}

/// What the shopper submits with a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum PaymentDetails {
    Upi {
        upi_id: String,
    },
    Card(CardDetails),
    NetBanking {
        #[serde(default)]
        bank: Option<String>,
    },
    Wallet {
        #[serde(default)]
        provider: Option<String>,
    },
    Cod,
}

impl PaymentDetails {
    pub fn upi(upi_id: impl Into<String>) -> Self {
        PaymentDetails::Upi {
            upi_id: upi_id.into(),
        }
    }

    pub fn card(card: CardDetails) -> Self {
        PaymentDetails::Card(card)
    }

    /// Returns the method these details belong to.
    pub fn method(&self) -> PaymentMethod {
        match self {
            PaymentDetails::Upi { .. } => PaymentMethod::Upi,
            PaymentDetails::Card(_) => PaymentMethod::Card,
            PaymentDetails::NetBanking { .. } => PaymentMethod::NetBanking,
            PaymentDetails::Wallet { .. } => PaymentMethod::Wallet,
            PaymentDetails::Cod => PaymentMethod::Cod,
        }
    }

    /// Details for methods that need no input.
    pub fn empty_for(method: PaymentMethod) -> Option<Self> {
        match method {
            PaymentMethod::NetBanking => Some(PaymentDetails::NetBanking { bank: None }),
            PaymentMethod::Wallet => Some(PaymentDetails::Wallet { provider: None }),
            PaymentMethod::Cod => Some(PaymentDetails::Cod),
            PaymentMethod::Upi | PaymentMethod::Card => None,
        }
    }
}
