//! Typed identifiers and money for the checkout flow.

/// Identifier of an order row, generated by the store at insert time.
///
/// Wraps the raw `BIGSERIAL` value to prevent mixing it up with other
/// integer identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrderId(i64);

impl OrderId {
    /// Creates an order ID from a store-generated value.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the underlying integer value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for OrderId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<OrderId> for i64 {
    fn from(id: OrderId) -> Self {
        id.0
    }
}

/// Identifier of a product in the inventory table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProductId(i32);

impl ProductId {
    /// Creates a product ID from its integer value.
    pub fn new(id: i32) -> Self {
        Self(id)
    }

    /// Returns the underlying integer value.
    pub fn as_i32(&self) -> i32 {
        self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for ProductId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

/// Money amount represented in cents to avoid floating point issues.
///
/// No sign or range validation is performed; any value a caller supplies
/// is recorded as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money {
    /// Amount in cents (e.g., 10000 = $100.00)
    cents: i64,
}

impl Money {
    /// Creates a new Money amount from cents.
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Creates a new Money amount from a whole dollar value.
    pub fn from_dollars(dollars: i64) -> Self {
        Self {
            cents: dollars * 100,
        }
    }

    /// Returns the amount in cents.
    pub fn as_cents(&self) -> i64 {
        self.cents
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.cents < 0 { "-" } else { "" };
        let abs = self.cents.abs();
        write!(f, "{sign}${}.{:02}", abs / 100, abs % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_id_roundtrip() {
        let id = OrderId::new(42);
        assert_eq!(id.as_i64(), 42);
        assert_eq!(i64::from(id), 42);
        assert_eq!(OrderId::from(42), id);
    }

    #[test]
    fn money_from_dollars() {
        assert_eq!(Money::from_dollars(100), Money::from_cents(10000));
    }

    #[test]
    fn money_display() {
        assert_eq!(Money::from_cents(10000).to_string(), "$100.00");
        assert_eq!(Money::from_cents(105).to_string(), "$1.05");
        assert_eq!(Money::from_cents(-250).to_string(), "-$2.50");
    }

    #[test]
    fn ids_display_as_plain_integers() {
        assert_eq!(OrderId::new(7).to_string(), "7");
        assert_eq!(ProductId::new(3).to_string(), "3");
    }
}
