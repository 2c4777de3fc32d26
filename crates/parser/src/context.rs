use bitflags::bitflags;

bitflags! {
    /// Syntactic context.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct Context: u8 {
        /// `return` is allowed.
        const IN_FUNCTION = 1 << 0;
        /// Unlabeled `break` and `continue` are allowed.
        const IN_ITERATION = 1 << 1;
        /// `in` is not treated as a binary operator, so that the head of a
        /// `for-in` loop can be recognized.
        const EXCLUDE_IN = 1 << 2;
    }
}
