pub mod constant;
pub mod sinewave;

/// A track produces stereo audio frames (L, R)
pub trait Track
where
    Self: Send,
{
    /// Mix this track's next frames into `next_samples`.
    fn fill_next_samples(&mut self, next_samples: &mut [(f32, f32)]);

    /// A finished track produces only silence and can be dropped.
    fn is_finished(&self) -> bool {
        false
    }
}
