//! Choosing and ordering the zones a run generates
//!
//! Zone indices, and through them every family and person id, follow the
//! order produced here: province, then area, then input row.

use rand::seq::index;
use rand::Rng;
use tracing::info;

use super::zone::Zone;
use crate::core::types::ProvinceId;

/// Filter to one province, subsample a fraction, then order
pub fn select_zones<R: Rng + ?Sized>(
    zones: &[Zone],
    province: Option<ProvinceId>,
    fraction: f64,
    rng: &mut R,
) -> Vec<Zone> {
    let candidates: Vec<&Zone> = zones
        .iter()
        .filter(|z| province.map_or(true, |p| z.province_id == p))
        .collect();

    let keep = ((candidates.len() as f64) * fraction).round() as usize;
    let mut chosen: Vec<&Zone> = if keep >= candidates.len() {
        candidates.clone()
    } else {
        let mut picked = index::sample(rng, candidates.len(), keep).into_vec();
        picked.sort_unstable();
        picked.into_iter().map(|i| candidates[i]).collect()
    };

    chosen.sort_by_key(|z| (z.province_id, z.area_id));

    info!(
        input = zones.len(),
        in_province = candidates.len(),
        selected = chosen.len(),
        "Zones selected"
    );
    chosen.into_iter().cloned().collect()
}
