pub mod backend;
pub mod resolver;
pub mod shell;
pub mod tree;

pub use backend::{select_backend, CwdBackend, CwdError};
pub use resolver::CwdResolver;
pub use tree::{collect_tree, ProcessNode, ProcessSource, MAX_TREE_NODES};
