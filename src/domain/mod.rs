pub mod artifact;
pub mod matrix;
pub mod method;
pub mod response;
pub mod status;
pub mod tableau;
pub mod tree;
