/// Lays `weights` out back to back over `[start, end]`, each slot sized in
/// proportion to its weight. An inverted range collapses to `start`.
pub fn split_proportional(start: f64, end: f64, weights: &[usize]) -> Vec<(f64, f64)> {
    let total: usize = weights.iter().map(|&w| w.max(1)).sum();
    if total == 0 {
        return Vec::new();
    }
    let span = (end - start).max(0.0);
    let mut offset = 0usize;
    weights
        .iter()
        .map(|&w| {
            let w = w.max(1);
            let s = start + span * offset as f64 / total as f64;
            offset += w;
            let e = start + span * offset as f64 / total as f64;
            (s, e)
        })
        .collect()
}

/// How unmatched runs at the edges are placed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Extent {
    /// No outer bounds: edge runs are extrapolated at a fixed pace.
    Open { sec_per_unit: f64 },
    /// Edge runs stretch to the given bounds.
    Bounded { start: f64, end: f64 },
}

/// Fills `None` entries from their matched neighbours. Interior runs share the
/// gap between the neighbours by weight; edge runs follow `extent`.
///
/// With no matched entry at all, an open extent yields nothing and a bounded
/// one is split proportionally.
pub(crate) fn fill_unmatched(
    raw: &[Option<(f64, f64)>],
    weights: &[usize],
    extent: Extent,
) -> Option<Vec<(f64, f64)>> {
    debug_assert_eq!(raw.len(), weights.len());
    if raw.iter().all(Option::is_none) {
        return match extent {
            Extent::Open { .. } => None,
            Extent::Bounded { start, end } => Some(split_proportional(start, end, weights)),
        };
    }

    let mut out: Vec<(f64, f64)> = Vec::with_capacity(raw.len());
    let mut i = 0usize;
    while i < raw.len() {
        if let Some(span) = raw[i] {
            out.push(span);
            i += 1;
            continue;
        }
        let run_start = i;
        while i < raw.len() && raw[i].is_none() {
            i += 1;
        }
        let run_weights = &weights[run_start..i];
        let prev_end = out.last().map(|&(_, e)| e);
        let next_start = raw.get(i).copied().flatten().map(|(s, _)| s);
        let run_units: usize = run_weights.iter().map(|&w| w.max(1)).sum();

        let (lo, hi) = match (prev_end, next_start, extent) {
            (Some(p), Some(n), _) => (p, n.max(p)),
            (None, Some(n), Extent::Bounded { start, .. }) => (start.min(n), n),
            (Some(p), None, Extent::Bounded { end, .. }) => (p, end.max(p)),
            (None, Some(n), Extent::Open { sec_per_unit }) => {
                ((n - run_units as f64 * sec_per_unit).max(0.0), n)
            }
            (Some(p), None, Extent::Open { sec_per_unit }) => {
                (p, p + run_units as f64 * sec_per_unit)
            }
            (None, None, _) => unreachable!("at least one entry is matched"),
        };
        out.extend(split_proportional(lo, hi, run_weights));
    }
    Some(out)
}

/// Mean seconds per unit over matched entries, clamped to `[min, max]`.
pub(crate) fn matched_pace(
    raw: &[Option<(f64, f64)>],
    weights: &[usize],
    min: f64,
    max: f64,
) -> f64 {
    let paces: Vec<f64> = raw
        .iter()
        .zip(weights)
        .filter_map(|(span, &w)| span.map(|(s, e)| (e - s).max(0.0) / w.max(1) as f64))
        .collect();
    if paces.is_empty() {
        return min;
    }
    (paces.iter().sum::<f64>() / paces.len() as f64).clamp(min, max)
}
