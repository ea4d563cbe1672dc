//! Shared test infrastructure for the domain crates.
//!
//! - `TestDatabase`: throwaway PostgreSQL container with the schema migrated (feature: "postgres")
//! - `TestDataBuilder`: deterministic, collision-free usernames and emails
//!
//! ```rust,no_run
//! use test_utils::{TestDatabase, TestDataBuilder};
//!
//! #[tokio::test]
//! #[ignore = "requires Docker"]
//! async fn my_postgres_test() {
//!     let db = TestDatabase::new().await;
//!     let data = TestDataBuilder::from_test_name("my_postgres_test");
//!
//!     let email = data.email("owner");
//! }
//! ```

#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "postgres")]
pub use postgres::TestDatabase;

/// Seeded generator for unique-per-test identities.
///
/// Two tests with different names never produce the same username or email,
/// so they can share one database.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed from the test name, the usual way to create one.
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let data = TestDataBuilder::from_test_name("test_create_user");
    /// assert!(data.username("alice").starts_with("alice_"));
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// `<label>_<seed>`, kept within the 50-character username limit.
    pub fn username(&self, label: &str) -> String {
        let mut name = format!("{}_{:x}", label, self.seed);
        name.truncate(50);
        name
    }

    pub fn email(&self, label: &str) -> String {
        format!("{}.{:x}@example.com", label, self.seed)
    }

    /// A password that satisfies the length rules.
    pub fn password(&self) -> String {
        format!("pw-{:016x}", self.seed)
    }
}
