//! Record abstraction shared by every diff and merge operation.
//!
//! A [`Record`] is any structurally typed entity with a fixed, named set of
//! fields: it can list its declared fields (with primary-key flags and
//! declared defaults), read a field by name, and write a field by name. The
//! diff engine calls only this surface — persistence, schema discovery, and
//! query generation belong to the caller's data-access layer.

mod traits;
mod value;

pub use traits::{FieldDef, Record};
pub use value::{FieldState, Value};
