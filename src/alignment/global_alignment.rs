use crate::config::ReconcileConfig;

/// Reference-side symbol for the syllable alignment. Line breaks may only be
/// skipped, never paired with a timed syllable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefSymbol<'a> {
    LineBreak,
    Unit(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignmentScores {
    pub match_score: f32,
    pub mismatch: f32,
    pub gap: f32,
    pub line_break_skip: f32,
}

impl Default for AlignmentScores {
    fn default() -> Self {
        Self::from(&ReconcileConfig::default())
    }
}

impl From<&ReconcileConfig> for AlignmentScores {
    fn from(config: &ReconcileConfig) -> Self {
        Self {
            match_score: config.match_score,
            mismatch: config.mismatch_score,
            gap: config.gap_score,
            line_break_skip: config.line_break_skip_score,
        }
    }
}

const STEP_DIAG: u8 = 0;
const STEP_SKIP_REF: u8 = 1;
const STEP_SKIP_TIMED: u8 = 2;

/// Global (Needleman–Wunsch) alignment of reference symbols against timed
/// syllables.
///
/// Returns, per reference symbol, the index of the identical timed syllable
/// it was aligned with. Substitutions shape the path but are reported as
/// `None`, as are line breaks. Ties prefer the diagonal, then skipping the
/// reference symbol.
pub fn needleman_wunsch(
    reference: &[RefSymbol<'_>],
    timed: &[&str],
    scores: &AlignmentScores,
) -> Vec<Option<usize>> {
    let n = reference.len();
    let m = timed.len();
    let mut paired = vec![None; n];
    if n == 0 || m == 0 {
        return paired;
    }

    let width = m + 1;
    let mut prev = vec![f32::NEG_INFINITY; width];
    let mut curr = vec![f32::NEG_INFINITY; width];
    let mut bp = vec![STEP_DIAG; (n + 1) * width];

    prev[0] = 0.0;
    for j in 1..=m {
        prev[j] = prev[j - 1] + scores.gap;
        bp[j] = STEP_SKIP_TIMED;
    }

    for i in 1..=n {
        let symbol = reference[i - 1];
        let skip_ref = skip_cost(symbol, scores);
        let row = i * width;

        curr[0] = prev[0] + skip_ref;
        bp[row] = STEP_SKIP_REF;
        for j in 1..=m {
            let (best, step) = best_transition(
                prev[j - 1] + pair_score(symbol, timed[j - 1], scores),
                prev[j] + skip_ref,
                curr[j - 1] + scores.gap,
            );
            curr[j] = best;
            bp[row + j] = step;
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    let (mut i, mut j) = (n, m);
    while i > 0 || j > 0 {
        let step = if i == 0 {
            STEP_SKIP_TIMED
        } else if j == 0 {
            STEP_SKIP_REF
        } else {
            bp[i * width + j]
        };
        match step {
            STEP_DIAG => {
                if reference[i - 1] == RefSymbol::Unit(timed[j - 1]) {
                    paired[i - 1] = Some(j - 1);
                }
                i -= 1;
                j -= 1;
            }
            STEP_SKIP_REF => i -= 1,
            _ => j -= 1,
        }
    }

    tracing::debug!(
        reference = n,
        timed = m,
        score = format!("{:.1}", prev[m]),
        paired = paired.iter().filter(|p| p.is_some()).count(),
        "global alignment: complete"
    );
    paired
}

#[inline(always)]
fn pair_score(symbol: RefSymbol<'_>, timed: &str, scores: &AlignmentScores) -> f32 {
    match symbol {
        RefSymbol::LineBreak => f32::NEG_INFINITY,
        RefSymbol::Unit(unit) if unit == timed => scores.match_score,
        RefSymbol::Unit(_) => scores.mismatch,
    }
}

#[inline(always)]
fn skip_cost(symbol: RefSymbol<'_>, scores: &AlignmentScores) -> f32 {
    match symbol {
        RefSymbol::LineBreak => scores.line_break_skip,
        RefSymbol::Unit(_) => scores.gap,
    }
}

#[inline(always)]
fn best_transition(diag: f32, skip_ref: f32, skip_timed: f32) -> (f32, u8) {
    let mut best = diag;
    let mut step = STEP_DIAG;
    if skip_ref > best {
        best = skip_ref;
        step = STEP_SKIP_REF;
    }
    if skip_timed > best {
        best = skip_timed;
        step = STEP_SKIP_TIMED;
    }
    (best, step)
}
