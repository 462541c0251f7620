//! Node entity — a file or folder in a user's tree.

pub mod model;

pub use model::{CreateNode, Node};
