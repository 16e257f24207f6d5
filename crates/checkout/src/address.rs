//! Delivery addresses and the shopper's address book.

use std::sync::LazyLock;

use cart::{KeyValueStore, StorageError};
use common::FieldErrors;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Storage key of the saved address book.
pub const DEFAULT_ADDRESS_KEY: &str = "user_addresses";

static PINCODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[1-9][0-9]{5}$").expect("valid pincode pattern"));

/// Unique identifier for a saved address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddressId(Uuid);

impl AddressId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AddressId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AddressId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AddressKind {
    #[default]
    Home,
    Office,
    Other,
}

/// A saved delivery address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    pub name: String,
    pub phone: String,
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: Option<String>,
    pub city: String,
    #[serde(default)]
    pub state: Option<String>,
    pub pincode: String,
    #[serde(rename = "type", default)]
    pub kind: AddressKind,
}

impl Address {
    /// Returns a single-line rendering for order summaries.
    pub fn one_line(&self) -> String {
        let mut parts = vec![self.address_line1.as_str()];
        if let Some(line2) = self.address_line2.as_deref().filter(|l| !l.is_empty()) {
            parts.push(line2);
        }
        parts.push(self.city.as_str());
        if let Some(state) = self.state.as_deref().filter(|s| !s.is_empty()) {
            parts.push(state);
        }
        format!("{} - {}", parts.join(", "), self.pincode)
    }
}

/// Address form input, validated before it joins the book.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAddress {
    pub name: String,
    pub phone: String,
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: Option<String>,
    pub city: String,
    #[serde(default)]
    pub state: Option<String>,
    pub pincode: String,
    #[serde(rename = "type", default)]
    pub kind: AddressKind,
}

impl NewAddress {
    /// Checks the required fields and the pincode format.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        let required = [
            ("name", &self.name),
            ("phone", &self.phone),
            ("addressLine1", &self.address_line1),
            ("city", &self.city),
            ("pincode", &self.pincode),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                errors.insert(field, "This field is required");
            }
        }

        if !errors.contains("pincode") && !PINCODE.is_match(self.pincode.trim()) {
            errors.insert("pincode", "Pincode must be 6 digits and cannot start with 0");
        }

        errors.into_result()
    }

    /// Validates and assigns a fresh ID.
    pub fn into_address(self) -> Result<Address, FieldErrors> {
        self.validate()?;
        Ok(Address {
            id: AddressId::new(),
            name: self.name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            address_line1: self.address_line1.trim().to_string(),
            address_line2: self.address_line2,
            city: self.city.trim().to_string(),
            state: self.state,
            pincode: self.pincode.trim().to_string(),
            kind: self.kind,
        })
    }
}

/// Saved addresses in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddressBook {
    addresses: Vec<Address>,
}

impl AddressBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    pub fn get(&self, id: AddressId) -> Option<&Address> {
        self.addresses.iter().find(|a| a.id == id)
    }

    pub fn first(&self) -> Option<&Address> {
        self.addresses.first()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn push(&mut self, address: Address) {
        self.addresses.push(address);
    }

    /// Reads the book from a store. A missing entry is an empty book.
    pub async fn load<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Result<Self, StorageError> {
        match store.get(key).await? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Self::new()),
        }
    }

    pub async fn save<S: KeyValueStore + ?Sized>(&self, store: &S, key: &str) -> Result<(), StorageError> {
        let json = serde_json::to_string(self)?;
        store.set(key, &json).await
    }
}

impl From<Vec<Address>> for AddressBook {
    fn from(addresses: Vec<Address>) -> Self {
        Self { addresses }
    }
}
