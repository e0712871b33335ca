//! Customer and address types as returned by the commerce backend.
//!
//! A [`Customer`] is the backend payload itself. It is stored, cached and
//! dispatched exactly as received, so nulls, empty lists and fields the
//! account layer knows nothing about all survive a round trip through the
//! local snapshot cache. Typed accessors read from it without rewriting it.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::id::{AddressId, CustomerId};

/// A customer account payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Customer(Value);

impl Customer {
    /// The customer's backend ID, if the payload carries a numeric one.
    #[must_use]
    pub fn id(&self) -> Option<CustomerId> {
        self.0.get("id").and_then(Value::as_i64).map(CustomerId::new)
    }

    /// Whether this value identifies a customer.
    ///
    /// A snapshot without an ID is treated as empty and never rendered.
    #[must_use]
    pub fn is_identified(&self) -> bool {
        self.id().is_some()
    }

    /// A top-level payload field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The customer's email address, if the profile carries one.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.profile_str("email")
    }

    /// Get the customer's full name.
    #[must_use]
    pub fn full_name(&self) -> String {
        match (self.profile_str("firstname"), self.profile_str("lastname")) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first.to_string(),
            (None, Some(last)) => last.to_string(),
            (None, None) => String::new(),
        }
    }

    /// Saved addresses. Entries that are null or not address-shaped are
    /// skipped.
    #[must_use]
    pub fn addresses(&self) -> Vec<Address> {
        self.0
            .get("addresses")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|entry| entry.is_object())
                    .filter_map(|entry| Address::deserialize(entry).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The address flagged as default for shipping.
    #[must_use]
    pub fn default_shipping_address(&self) -> Option<Address> {
        self.addresses().into_iter().find(|a| a.default_shipping)
    }

    /// The address flagged as default for billing.
    #[must_use]
    pub fn default_billing_address(&self) -> Option<Address> {
        self.addresses().into_iter().find(|a| a.default_billing)
    }

    /// The payload as received.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consume into the payload.
    #[must_use]
    pub fn into_value(self) -> Value {
        self.0
    }

    fn profile_str(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

impl From<Value> for Customer {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<Customer> for Value {
    fn from(customer: Customer) -> Self {
        customer.0
    }
}

/// Read-only view of a saved customer address.
///
/// Every field tolerates `null`, as GraphQL allows for all of them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Address {
    /// The address ID.
    #[serde(default)]
    pub id: Option<AddressId>,
    /// First name.
    #[serde(default)]
    pub firstname: Option<String>,
    /// Last name.
    #[serde(default)]
    pub lastname: Option<String>,
    /// Street lines.
    #[serde(default, deserialize_with = "null_as_default")]
    pub street: Vec<Option<String>>,
    /// City.
    #[serde(default)]
    pub city: Option<String>,
    /// Postal/ZIP code.
    #[serde(default)]
    pub postcode: Option<String>,
    /// ISO country code.
    #[serde(default)]
    pub country_code: Option<String>,
    /// Phone number.
    #[serde(default)]
    pub telephone: Option<String>,
    /// Default shipping address flag.
    #[serde(default, deserialize_with = "null_as_default")]
    pub default_shipping: bool,
    /// Default billing address flag.
    #[serde(default, deserialize_with = "null_as_default")]
    pub default_billing: bool,
    /// Remaining address fields (region, company, VAT ID, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Address {
    /// Format the address as a single line.
    #[must_use]
    pub fn formatted_single_line(&self) -> String {
        self.street
            .iter()
            .filter_map(Option::as_deref)
            .chain(self.city.as_deref())
            .chain(self.postcode.as_deref())
            .chain(self.country_code.as_deref())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_customer_round_trips_payload_verbatim() {
        let payloads = [
            json!({ "id": 1, "name": "A" }),
            json!({ "id": 9, "email": "a@b.com", "addresses": [] }),
            json!({ "id": 9, "addresses": null }),
            json!({ "id": 9, "addresses": [{ "id": 1, "city": "X" }] }),
            json!({ "id": 9, "addresses": [{ "street": ["a", null] }, null] }),
            json!({ "id": 9, "custom_attributes": [{ "code": "tier", "value": { "n": 2 } }] }),
        ];

        for raw in payloads {
            let customer: Customer = serde_json::from_value(raw.clone()).unwrap();
            assert_eq!(serde_json::to_value(&customer).unwrap(), raw);
            assert_eq!(customer.as_value(), &raw);
        }
    }

    #[test]
    fn test_customer_without_id_is_not_identified() {
        assert!(!Customer::from(json!({})).is_identified());
        assert!(!Customer::from(json!({ "id": null })).is_identified());
        assert!(!Customer::from(Value::Null).is_identified());
        assert!(!Customer::default().is_identified());

        let customer = Customer::from(json!({ "id": 4 }));
        assert_eq!(customer.id(), Some(CustomerId::new(4)));
    }

    #[test]
    fn test_customer_profile_accessors() {
        let customer = Customer::from(json!({
            "id": 3,
            "email": "a@b.com",
            "firstname": "Ada",
            "lastname": "Lovelace",
            "addresses": [
                { "id": 10, "city": "London", "default_billing": true },
                { "id": 11, "city": "Paris", "default_shipping": true }
            ]
        }));

        assert_eq!(customer.email(), Some("a@b.com"));
        assert_eq!(customer.full_name(), "Ada Lovelace");
        assert_eq!(
            customer.default_shipping_address().unwrap().id,
            Some(AddressId::new(11))
        );
        assert_eq!(
            customer.default_billing_address().unwrap().city.as_deref(),
            Some("London")
        );
    }

    #[test]
    fn test_addresses_tolerate_nulls() {
        let customer = Customer::from(json!({
            "addresses": [
                null,
                { "id": 1, "street": null, "default_shipping": null },
                { "id": 2, "street": ["a", null] }
            ]
        }));

        let addresses = customer.addresses();
        assert_eq!(addresses.len(), 2);
        assert!(addresses[0].street.is_empty());
        assert!(!addresses[0].default_shipping);
        assert_eq!(addresses[1].street, vec![Some("a".to_string()), None]);

        assert!(Customer::from(json!({ "addresses": null })).addresses().is_empty());
    }

    #[test]
    fn test_full_name_partial() {
        let customer = Customer::from(json!({ "lastname": "Hopper" }));
        assert_eq!(customer.full_name(), "Hopper");
        assert_eq!(Customer::default().full_name(), "");
    }

    #[test]
    fn test_address_single_line() {
        let address: Address = serde_json::from_value(json!({
            "street": ["1 Main St", "", null],
            "city": "Springfield",
            "postcode": "12345",
            "country_code": "US",
            "region": { "region_code": "IL" }
        }))
        .unwrap();

        assert_eq!(
            address.formatted_single_line(),
            "1 Main St, Springfield, 12345, US"
        );
        assert!(address.extra.contains_key("region"));
    }
}
