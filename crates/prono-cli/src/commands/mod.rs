//! Command implementations.

pub(crate) mod inspect;
pub(crate) mod predict;
pub(crate) mod validate;
