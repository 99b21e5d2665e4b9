// Core error modeling shared by every boundary path.
pub mod error;
