//! **Mathematical Foundation: Wall Shadow Projection**
//!
//! A vertical wall from `P₁` to `P₂` of height `h` lit by a sun at azimuth `A`
//! and altitude `α` casts a shadow whose far edge is the wall top projected
//! onto the ground:
//! ```text
//! d  = h / tan α
//! Δ  = d · (sin A, cos A)
//! P₁' = P₁ + Δ,   P₂' = P₂ + Δ
//! ```
//! The shadow is the quadrilateral `P₁ → P₂ → P₂' → P₁' → P₁`: the wall, then
//! the far edge walked in reverse, which keeps the ring free of
//! self-intersection.
//!
//! ## **Batch evaluation**
//! All walls are processed at once as `(N, 2, 2)` arrays. The direction
//! `(sin A, cos A) / tan α` is shared by every wall of the call; only the
//! height-dependent scale varies per row, so the offset is one `(N,)` column
//! per axis broadcast over both endpoints.
//!
//! Coordinates must be metric (see [`crate::projection`]); the result stays in
//! the same frame.

use crate::errors::Result;
use crate::float_types::Real;
use crate::sun::SunPosition;
use ndarray::{Array3, ArrayView1, ArrayView3, Axis, s};

/// Cast one shadow quadrilateral per wall.
///
/// `walls` has shape `(N, 2, 2)` and `heights` shape `(N,)`. The result has
/// shape `(N, 5, 2)`, row `i` being the closed ring of wall `i`'s shadow.
///
/// Fails with [`crate::errors::ShadowError::SunBelowHorizon`] when the sun
/// altitude is not positive.
///
/// # Panics
/// If `heights` does not have one entry per wall.
pub fn cast_shadows(walls: ArrayView3<Real>, heights: ArrayView1<Real>, sun: &SunPosition) -> Result<Array3<Real>> {
    let direction = sun.shadow_direction()?;
    let n = walls.len_of(Axis(0));
    assert_eq!(heights.len(), n, "one height per wall");

    let dx = (&heights * direction.x).insert_axis(Axis(1));
    let dy = (&heights * direction.y).insert_axis(Axis(1));

    let mut shadow = Array3::<Real>::zeros((n, 5, 2));
    shadow.slice_mut(s![.., 0..2, ..]).assign(&walls);
    {
        let mut far = shadow.slice_mut(s![.., 2..4, ..]);
        far.assign(&walls.slice(s![.., ..;-1, ..]));
        let mut far_x = far.slice_mut(s![.., .., 0]);
        far_x += &dx;
        let mut far_y = far.slice_mut(s![.., .., 1]);
        far_y += &dy;
    }
    let first = shadow.slice(s![.., 0, ..]).to_owned();
    shadow.slice_mut(s![.., 4, ..]).assign(&first);

    Ok(shadow)
}
