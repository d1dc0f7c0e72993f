use crate::content::{ResourceKey, Resources, Sprite, Spritesheet};
use crate::error::ContractViolation;
use crate::geometry::{Aabb, IVec2};

/// A sprite placed in the world: `position` is where its origin lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionSubject {
    pub position: IVec2,
    pub sheet: ResourceKey,
    pub sprite: usize,
}

impl CollisionSubject {
    pub fn new(position: IVec2, sheet: ResourceKey, sprite: usize) -> Self {
        Self {
            position,
            sheet,
            sprite,
        }
    }
}

/// Outcome of a pixel test. Overlap rectangles and pixel lists are in each
/// subject's own sprite-local space, so `a_overlap` and `b_overlap` describe
/// the same world region.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollisionResult {
    pub is_collision: bool,
    pub a_bounds: Aabb,
    pub b_bounds: Aabb,
    pub a_overlap: Option<Aabb>,
    pub b_overlap: Option<Aabb>,
    pub a_pixels: Vec<IVec2>,
    pub b_pixels: Vec<IVec2>,
}

impl CollisionResult {
    /// Intersecting pixels recorded. Zero unless the full list was requested.
    pub fn collision_count(&self) -> usize {
        self.a_pixels.len()
    }

    fn reset(&mut self) {
        self.is_collision = false;
        self.a_bounds = Aabb::default();
        self.b_bounds = Aabb::default();
        self.a_overlap = None;
        self.b_overlap = None;
        self.a_pixels.clear();
        self.b_pixels.clear();
    }
}

/// Inclusive bounds test: boxes sharing an edge pixel intersect.
pub fn is_aabb_intersection(a: &Aabb, b: &Aabb) -> bool {
    a.intersects(b)
}

pub fn test_collision(
    resources: &Resources,
    a: &CollisionSubject,
    b: &CollisionSubject,
    want_full_pixel_list: bool,
) -> Result<CollisionResult, ContractViolation> {
    let mut result = CollisionResult::default();
    test_collision_into(resources, a, b, want_full_pixel_list, &mut result)?;
    Ok(result)
}

/// Same as [`test_collision`], reusing `out`'s allocations. `out` is cleared
/// first and only valid until the next call that reuses it.
pub fn test_collision_into(
    resources: &Resources,
    a: &CollisionSubject,
    b: &CollisionSubject,
    want_full_pixel_list: bool,
    out: &mut CollisionResult,
) -> Result<(), ContractViolation> {
    out.reset();
    let (sheet_a, sprite_a) = resolve(resources, a)?;
    let (sheet_b, sprite_b) = resolve(resources, b)?;

    let min_a = a.position - sprite_a.origin;
    let min_b = b.position - sprite_b.origin;
    out.a_bounds = Aabb::from_min_size(min_a, sprite_a.size);
    out.b_bounds = Aabb::from_min_size(min_b, sprite_b.size);

    if !is_aabb_intersection(&out.a_bounds, &out.b_bounds) {
        return Ok(());
    }
    let Some(overlap) = out.a_bounds.overlap(&out.b_bounds) else {
        return Ok(());
    };
    let local_a = overlap.translated(IVec2::ZERO - min_a);
    let local_b = overlap.translated(IVec2::ZERO - min_b);
    out.a_overlap = Some(local_a);
    out.b_overlap = Some(local_b);

    let bitmap_a = sheet_a.bitmap();
    let bitmap_b = sheet_b.bitmap();
    for dy in 0..overlap.height() {
        for dx in 0..overlap.width() {
            let pixel_a = local_a.min() + IVec2::new(dx, dy);
            let pixel_b = local_b.min() + IVec2::new(dx, dy);
            let sheet_pixel_a = sprite_a.position + pixel_a;
            let sheet_pixel_b = sprite_b.position + pixel_b;
            let opaque_a = bitmap_a
                .get(sheet_pixel_a.x as u32, sheet_pixel_a.y as u32)
                .is_some_and(|px| !px.is_transparent());
            let opaque_b = bitmap_b
                .get(sheet_pixel_b.x as u32, sheet_pixel_b.y as u32)
                .is_some_and(|px| !px.is_transparent());
            if !(opaque_a && opaque_b) {
                continue;
            }
            out.is_collision = true;
            if !want_full_pixel_list {
                return Ok(());
            }
            out.a_pixels.push(pixel_a);
            out.b_pixels.push(pixel_b);
        }
    }
    Ok(())
}

fn resolve<'a>(
    resources: &'a Resources,
    subject: &CollisionSubject,
) -> Result<(&'a Spritesheet, Sprite), ContractViolation> {
    let sheet = resources.spritesheet(subject.sheet)?;
    let sprite = *resources.sprite(subject.sheet, subject.sprite)?;
    Ok((sheet, sprite))
}
