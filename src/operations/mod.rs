pub mod query;
pub mod reference;
pub mod split;
