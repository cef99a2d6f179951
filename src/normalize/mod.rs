//! Value-level normalization of raw LCA fields.
//!
//! Everything here is total: unparseable input becomes `None` (a null in
//! column form) instead of an error.

pub mod soc;
pub mod wage;

pub use soc::{SocTitleLookup, canonical_soc_code, canonicalize_soc_column};
pub use wage::{
    WageInput, WageUnit, annualize, annualize_column, clean_wage, clean_wage_column,
    wage_ratio, wage_ratio_column,
};
