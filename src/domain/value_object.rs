//! Value Objects for domain models.
//!
//! Value Objects are immutable objects that represent values in the domain.
//! They are compared by their value, not by identity.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::ValueObjectError;

/// Shopper identifier value object.
///
/// Represents a unique identifier for a shopper waiting in the call queue.
/// Identifiers are self-declared by clients; validation is structural only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShopperId(String);

impl ShopperId {
    /// Create a new ShopperId.
    ///
    /// # Arguments
    ///
    /// * `id` - The shopper identifier string
    ///
    /// # Returns
    ///
    /// A Result containing the ShopperId or an error if validation fails
    pub fn new(id: String) -> Result<Self, ValueObjectError> {
        if id.is_empty() {
            return Err(ValueObjectError::ShopperIdEmpty);
        }
        let len = id.len();
        if len > 100 {
            return Err(ValueObjectError::ShopperIdTooLong {
                max: 100,
                actual: len,
            });
        }
        Ok(Self(id))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to owned String.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ShopperId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sales representative identifier value object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepId(String);

impl RepId {
    /// Create a new RepId.
    ///
    /// # Arguments
    ///
    /// * `id` - The representative identifier string
    ///
    /// # Returns
    ///
    /// A Result containing the RepId or an error if validation fails
    pub fn new(id: String) -> Result<Self, ValueObjectError> {
        if id.is_empty() {
            return Err(ValueObjectError::RepIdEmpty);
        }
        let len = id.len();
        if len > 100 {
            return Err(ValueObjectError::RepIdTooLong {
                max: 100,
                actual: len,
            });
        }
        Ok(Self(id))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to owned String.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for RepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Timestamp value object.
///
/// Represents a Unix timestamp in milliseconds (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Create a new Timestamp.
    ///
    /// # Arguments
    ///
    /// * `value` - Unix timestamp in milliseconds
    ///
    /// # Returns
    ///
    /// A Timestamp instance
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Get the inner i64 value.
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Milliseconds elapsed from `self` until `now`. Negative if `now` is earlier.
    pub fn elapsed_ms(&self, now: Timestamp) -> i64 {
        now.0 - self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shopper_id_new_success() {
        // テスト項目: 有効な shopper ID を作成できる
        // given (前提条件):
        let id = "shopper-1".to_string();

        // when (操作):
        let result = ShopperId::new(id);

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(result.unwrap().as_str(), "shopper-1");
    }

    #[test]
    fn test_shopper_id_new_empty_fails() {
        // テスト項目: 空の shopper ID は作成できない
        // given (前提条件):
        let id = "".to_string();

        // when (操作):
        let result = ShopperId::new(id);

        // then (期待する結果):
        assert!(result.is_err());
        assert_eq!(result.unwrap_err(), ValueObjectError::ShopperIdEmpty);
    }

    #[test]
    fn test_shopper_id_new_too_long_fails() {
        // テスト項目: 101 文字以上の shopper ID は作成できない
        // given (前提条件):
        let id = "a".repeat(101);

        // when (操作):
        let result = ShopperId::new(id);

        // then (期待する結果):
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err(),
            ValueObjectError::ShopperIdTooLong {
                max: 100,
                actual: 101
            }
        );
    }

    #[test]
    fn test_rep_id_new_success() {
        // テスト項目: 有効な rep ID を作成できる
        // given (前提条件):
        let id = "rep-1".to_string();

        // when (操作):
        let result = RepId::new(id);

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(result.unwrap().as_str(), "rep-1");
    }

    #[test]
    fn test_rep_id_new_empty_fails() {
        // テスト項目: 空の rep ID は作成できない
        // given (前提条件):
        let id = "".to_string();

        // when (操作):
        let result = RepId::new(id);

        // then (期待する結果):
        assert!(result.is_err());
        assert_eq!(result.unwrap_err(), ValueObjectError::RepIdEmpty);
    }

    #[test]
    fn test_id_equality() {
        // テスト項目: 同じ値を持つ ID は等価
        // given (前提条件):
        let id1 = ShopperId::new("s1".to_string()).unwrap();
        let id2 = ShopperId::new("s1".to_string()).unwrap();
        let id3 = ShopperId::new("s2".to_string()).unwrap();

        // then (期待する結果):
        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
    }

    #[test]
    fn test_timestamp_ordering() {
        // テスト項目: タイムスタンプは順序付けできる
        // given (前提条件):
        let ts1 = Timestamp::new(1000);
        let ts2 = Timestamp::new(2000);

        // then (期待する結果):
        assert!(ts1 < ts2);
        assert!(ts2 > ts1);
    }

    #[test]
    fn test_timestamp_elapsed_ms() {
        // テスト項目: 経過ミリ秒を計算できる
        // given (前提条件):
        let ts = Timestamp::new(1000);

        // then (期待する結果):
        assert_eq!(ts.elapsed_ms(Timestamp::new(4500)), 3500);
        assert_eq!(ts.elapsed_ms(Timestamp::new(500)), -500);
    }
}
