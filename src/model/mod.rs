//! In-memory object model of a database schema.
//!
//! Ownership is strictly top-down: a [`Schema`] owns its databases, a
//! [`Database`] its tables, a [`Table`] its columns, keys, indices and
//! behaviors. The only back edges are referrer lists and the
//! `contains_foreign_pk` flag, both derived during finalization and keyed
//! by [`ForeignKeyId`].

mod behavior;
mod column;
mod database;
mod domain;
mod foreign_key;
mod id_method;
mod index;
mod inheritance;
mod schema;
mod table;
mod vendor;

pub use behavior::Behavior;
pub use column::Column;
pub use database::Database;
pub use domain::{ColumnDefault, Domain};
pub use foreign_key::{ForeignKey, ForeignKeyId, Reference, ReferentialAction};
pub use id_method::{IdMethod, IdMethodParameter, StringFormat, Visibility};
pub use index::{Index, IndexColumn, Unique};
pub use inheritance::Inheritance;
pub use schema::{ExternalSchema, Schema};
pub use table::Table;
pub use vendor::{VendorInfo, vendor_parameter};
