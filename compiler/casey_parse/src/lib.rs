//! Loading and saving of Casey documents.
//!
//! A document is a versionless JSON tree of items. Loading runs in two
//! explicit phases:
//!
//! 1. **Instantiate**: a depth-first walk creates every item from its
//!    `name`/`item`/`comments`/`children` fields and stashes all remaining
//!    fields raw, uninterpreted.
//! 2. **Apply**: the stashed fields are interpreted, **first for every
//!    variable and parameter, then for everything else**. Function blocks
//!    reference variable types during this step (assignment values are
//!    coerced against the declared type), so the variables-first order is
//!    load-bearing: apply in document order instead and an assignment
//!    listed before its variable's `type` field silently loses its value.
//!
//! Document-level problems (malformed JSON, unknown item kinds, missing
//! required fields) fail the whole load; problems inside one function's
//! blocks (unresolved references, bad wiring) only mark that function as
//! broken so its siblings still load. Either way every diagnostic is
//! accumulated and reported together.

mod load;
mod save;

pub use load::{load, LoadedProject};
pub use save::save;
