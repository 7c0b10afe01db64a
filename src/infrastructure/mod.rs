pub mod arxiv;
pub mod corpus;
pub mod embedding;
pub mod index;
pub mod model;
pub mod output;
