//! Card access layer for the badgegate terminal.
//!
//! This crate covers everything between the physical reader and the domain
//! logic:
//!
//! - [`codec`] - pure conversions between 16-byte card blocks and domain
//!   values (identity text, credit counter)
//! - [`keyring`] - the sector key ring with its working-key cache
//! - [`transport`] - authenticated single-block read/write with trailer
//!   protection and guaranteed session release
//! - [`service`] - the identity/counter convenience layer on top of the
//!   transport
//! - [`traits`] / [`mock`] - the `CardReader` hardware abstraction and a
//!   programmable mock for tests and development
//!
//! All device traits use native `async fn` methods (Edition 2024 RPITIT),
//! so no `async_trait` macro is required.

#![allow(async_fn_in_trait)]

pub mod codec;
pub mod error;
pub mod keyring;
pub mod mock;
pub mod service;
pub mod traits;
pub mod transport;

pub use codec::{Block, decode_int, decode_text, encode_int, encode_text};
pub use error::{CardError, Result};
pub use keyring::{FACTORY_KEYS, Key, KeyRing};
pub use mock::{MockReader, MockReaderHandle};
pub use service::CardService;
pub use traits::CardReader;
pub use transport::{CardTransport, is_trailer_block};
