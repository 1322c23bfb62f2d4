//! Yes/no question gates that must be passed before a document may be signed and exported.

pub mod flow;
pub mod inline;
pub mod question;
