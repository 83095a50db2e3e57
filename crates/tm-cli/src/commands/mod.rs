//! CLI command implementations

pub(crate) mod common;
pub(crate) mod current;
pub(crate) mod down;
pub(crate) mod latest;
pub(crate) mod new;
pub(crate) mod present;
pub(crate) mod to;
pub(crate) mod up;
