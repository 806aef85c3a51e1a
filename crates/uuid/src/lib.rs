//! Clock and identifier capabilities.
//!
//! Every identifier and timestamp minted during care orchestration flows through one of two
//! small traits defined here:
//!
//! - [`Clock`] answers "what time is it now?"
//! - [`IdGenerator`] mints opaque unique identifiers (care-gap ids, event envelope ids)
//!
//! Production code uses [`SystemClock`] and [`UuidGenerator`]. Tests inject [`FixedClock`] and
//! [`SequentialIdGenerator`] so that resource ids, due dates and envelope ids can be asserted
//! exactly.
//!
//! ## Identifier form
//! [`UuidGenerator`] emits RFC 4122 version 4 UUIDs in their hyphenated lowercase form, e.g.
//! `550e8400-e29b-41d4-a716-446655440000`. This is the form downstream dashboards expect in the
//! `id` field of care gaps and event envelopes.

mod service;

pub use service::{
    Clock, FixedClock, IdGenerator, SequentialIdGenerator, SystemClock, Uuid, UuidGenerator,
};
