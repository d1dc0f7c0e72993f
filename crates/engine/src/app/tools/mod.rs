mod overlay;

pub(crate) use overlay::{OverlayData, PerfOverlay};
