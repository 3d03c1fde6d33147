//! Random-forest regression model
//!
//! A forest is an ordered feature-name list plus a set of CART regression
//! trees. The prediction for a row is the mean of the tree outputs.
//!
//! # Model Format
//!
//! The JSON form (canonical, sorted keys) looks like:
//!
//! ```json
//! {
//!   "feature_names": ["Source", "Destination", "Route"],
//!   "metadata": {"created_at": 1723708800, "max_depth": 25, "...": "..."},
//!   "trees": [
//!     {"nodes": [
//!       {"feature_idx":2,"leaf":null,"left":1,"right":2,"threshold":14.5},
//!       {"feature_idx":-1,"leaf":4210.0,"left":-1,"right":-1,"threshold":0.0},
//!       {"feature_idx":-1,"leaf":6875.5,"left":-1,"right":-1,"threshold":0.0}
//!     ]}
//!   ],
//!   "version": 1
//! }
//! ```
//!
//! Deployed artifacts use the compact binary form, see [`crate::artifact`].

pub mod model;
pub mod tree;

pub use model::{ForestModel, ModelError, ModelMetadata, FORMAT_VERSION};
pub use tree::{Node, Tree};
