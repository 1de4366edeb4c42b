//! # Atlas - structural queries over a connectomics dataset
//!
//! Answers "which synapses of this neuron lie in this 3-D region?" by
//! combining coarse per-entity bounding boxes from a relational store with a
//! remote voxel-indexed id enumeration service, calling the remote service
//! only for boxes that straddle the region border.
//!
//! ## Feature Flags
//!
//! - **`server`** (default): the Axum REST transport and logging setup
//!
//! ## Usage
//!
//! ```rust,no_run
//! use atlas::prelude::*;
//! use atlas::config::load_config;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config(None, None)?;
//! let context = AtlasContext::from_config(&config)?;
//!
//! let region = Region::parse("pinky/pinky100/segmentation", 0, "0,1000", "0,1000", "0,100")?;
//! let children = context
//!     .structural_service
//!     .neuron_children(EntityId::new(648518346349539437), &region, MembershipMode::BoundingBox)
//!     .await?;
//! println!("{} synapses in region", children.len());
//! # Ok(())
//! # }
//! ```

// Re-export foundation
pub use atlas_config as config;
pub use atlas_structures as structures;

// Re-export service layer
pub use atlas_services as services;

// Re-export transport
#[cfg(feature = "server")]
pub use atlas_api as api;

#[cfg(feature = "server")]
pub use atlas_observability as observability;

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::structures::{AxisRange, BBox, EntityId, Region, Vector3};

    pub use crate::services::{
        AtlasContext, ChildSynapse, MembershipMode, PartialFailure, Polarity, ServiceError,
        StructuralService,
    };

    #[cfg(feature = "server")]
    pub use crate::api::{create_http_server, ApiState};
}
