//! Column roles in the tabular export.
//!
//! The export uses generic positional keys; which column means what is
//! fixed by convention and has to be mirrored here exactly.

pub const COL_ORDINAL: &str = "Column1";
pub const COL_NAME: &str = "Column2";
pub const COL_PURCHASE_PRICE: &str = "Column3";
pub const COL_QUANTITY: &str = "Column4";
pub const COL_EXCHANGE_CODE: &str = "Column7";
pub const COL_FALLBACK_CMP: &str = "Column8";
pub const COL_FALLBACK_PE: &str = "Column13";
pub const COL_FALLBACK_EARNINGS: &str = "Column14";
pub const COL_STATUS: &str = "Column35";
