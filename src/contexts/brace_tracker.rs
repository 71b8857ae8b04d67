/// Brace nesting counter for accumulated fragments.
///
/// Every `{` and `}` counts, including ones inside string literals and
/// comments. Excess closing braces clamp the depth at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BraceTracker {
    depth: usize,
}

impl BraceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Folds `fragment` into the depth and returns the new depth.
    pub fn update(&mut self, fragment: &str) -> usize {
        self.depth = next_depth(self.depth, fragment);
        self.depth
    }

    /// True when the current top-level construct is closed.
    pub fn is_closed(&self) -> bool {
        self.depth == 0
    }

    pub fn reset(&mut self) {
        self.depth = 0;
    }
}

/// `depth + opens - closes`, clamped at zero.
pub fn next_depth(depth: usize, fragment: &str) -> usize {
    let opens = fragment.matches('{').count();
    let closes = fragment.matches('}').count();
    (depth + opens).saturating_sub(closes)
}
