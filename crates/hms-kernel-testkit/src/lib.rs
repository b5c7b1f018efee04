//! # HMS Kernel Testkit
//!
//! Testing utilities for the HMS kernel.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: A ledger over an in-memory store with a manual clock and
//!   deterministic parties
//! - **Generators**: Proptest strategies for keys, bitmasks, records, grants
//! - **Address vectors**: Pinned inputs for deterministic address derivation
//!
//! ## Test Fixtures
//!
//! ```rust
//! use hms_kernel_testkit::fixtures::{block_on, TestFixture, DAY};
//! use hms_kernel_core::Permissions;
//!
//! block_on(async {
//!     let fx = TestFixture::seeded(1).await.unwrap();
//!     fx.ledger
//!         .grant_access(fx.owner, fx.grantee, DAY, Permissions::READ)
//!         .await
//!         .unwrap();
//!     fx.ledger.read_record(fx.grantee, fx.owner, 0, None).await.unwrap();
//! });
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use hms_kernel_testkit::generators::GrantParams;
//!
//! proptest! {
//!     #[test]
//!     fn grant_window(params: GrantParams) {
//!         // issue, advance the clock by params.check_after, authorize
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{block_on, multi_party, party, sample_record, TestFixture};
pub use generators::GrantParams;
pub use vectors::{all_vectors, check_vector, derive_vector, verify_all_vectors, AddressVector};
