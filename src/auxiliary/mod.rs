//! Helper items to assist the unfolding machinery.

pub mod arithmetic;
pub mod crystal;
