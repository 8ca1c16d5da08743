#![doc(hidden)]

pub(crate) mod dptree_ext;
pub(crate) mod format;
