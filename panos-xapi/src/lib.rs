//! PAN-OS and Panorama XML API client.
//!
//! The XML API addresses every configuration object by an XPath into the
//! device configuration tree. Where an object lives depends on what kind of
//! object it is and on how the device is managed: a standalone firewall keeps
//! objects under a virtual system, while a Panorama manager keeps them in
//! `shared` or in a device group, and has no firewall network configuration at
//! all. [`xpath::resolve`] computes that path from the object kind, the
//! requested placement and a session snapshot, without any I/O.
//!
//! # Architecture
//!
//! ## Addressing
//!
//! - [`kind`]: Object kinds and their placement classes
//! - [`scope`]: Placement choices (local, shared, device group, rulebase)
//! - [`xpath`]: The address resolver
//! - [`name`]: Naming rules checked before a name reaches an XPath
//! - [`session`]: Session state and the snapshots routing reads
//!
//! ## Payloads and responses
//!
//! - [`payload`]: Element bodies for `set`/`edit`
//! - [`outcome`]: Status code classification
//! - [`response`]: Response envelope decoding
//! - [`records`]: Typed views of returned entries
//! - [`detect`]: Management mode detection
//! - [`report`]: Terminal rendering of outcomes and records
//!
//! ## Transport
//!
//! - [`request`]: Typed request parameters and URL encoding
//! - [`transport`]: The HTTP boundary
//! - [`client`]: Operations tying the above together
//! - [`profile`]: TOML connection profiles
//!
//! # Examples
//!
//! ```ignore
//! use panos_xapi::payload::{Address, Payload};
//! use panos_xapi::scope::ScopeOptions;
//! use panos_xapi::session::SessionSnapshot;
//! use panos_xapi::kind::ObjectKind;
//! use panos_xapi::xpath::locate;
//!
//! let snapshot = SessionSnapshot::manager(false);
//! let path = locate(&snapshot, ObjectKind::Address, &ScopeOptions::device_group("DG1"), "web1")?;
//! let body = Address::from_parts("ip-netmask", "10.1.1.1/32")?.build()?;
//! println!("{path}\n{body}");
//! ```
//!
//! # Built on xml-fragment-core
//!
//! Element trees, parsing and serialization come from `xml-fragment-core`.
//! Everything PAN-OS specific is in this crate.

pub mod client;
pub mod detect;
pub mod error;
pub mod kind;
pub mod name;
pub mod outcome;
pub mod payload;
pub mod profile;
pub mod records;
pub mod report;
pub mod request;
pub mod response;
pub mod scope;
pub mod session;
pub mod transport;
pub mod xpath;

pub use error::{Error, Result};
pub use xml_fragment_core::Fragment as ConfigFragment;
