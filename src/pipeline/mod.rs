//! Anomaly-result post-processing pipeline
//!
//! normalize -> detect -> composite -> publish -> assemble. Everything
//! here is request-scoped; the image transforms are pure functions and
//! the only side effect is the publish step's durable write.

pub mod assemble;
pub mod composite;
pub mod normalize;
pub mod publish;

pub use assemble::assemble;
pub use composite::{composite, COMPOSITE_MIME};
pub use normalize::{normalize, NormalizedImage};
pub use publish::{publish, StoredArtifact};
