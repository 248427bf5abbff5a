/// What the runtime should do after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; the next refresh renders normally.
    Reconfigured,
    /// Transient; drop this refresh.
    SkipFrame,
    /// Unrecoverable (out of memory). Exit.
    Fatal,
}

impl SurfaceErrorAction {
    #[inline]
    pub fn is_fatal(self) -> bool {
        matches!(self, SurfaceErrorAction::Fatal)
    }
}
