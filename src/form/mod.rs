//! Form field resolution and presentation
//!
//! Pipeline, one direction only:
//! - `table`: raw field arena as exposed by the document parser
//! - `resolve`: qualified names + inherited values (bounded parent walks)
//! - `token`: canonical values, boolean vocabulary folded into Yes/No
//! - `group`: checkbox/detail pairing and summary lines for the LLM
//! - `structured`: the same data as serializable maps

pub mod group;
pub mod resolve;
pub mod structured;
pub mod table;
pub mod token;

pub use group::{format_fields, group_fields, FieldGroup, GroupingPolicy, DEFAULT_DETAIL_SUFFIX};
pub use resolve::{ResolvedField, ResolvedTable, Resolver, StatePrecedence, DEFAULT_MAX_DEPTH};
pub use structured::{interpreted_fields, suffix_groups, InterpretedField};
pub use table::{FieldId, FieldTable, FieldType, RawField};
pub use token::{normalize, CheckState, Token};
