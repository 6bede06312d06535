//! Viewpoint data structures
//!
//! Just data. The provider trait and conversions live in camera_operations.rs

use cgmath::Point3;
use parking_lot::RwLock;
use std::sync::Arc;

/// Viewpoint position shared between the thread that moves it and the
/// scheduler that streams around it
#[derive(Debug, Clone)]
pub struct SharedViewpoint {
    /// World space, voxel units
    pub position: Arc<RwLock<Point3<f32>>>,
}
