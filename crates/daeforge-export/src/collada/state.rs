//! Document writer state machine

/// Where a [`DocumentWriter`](super::DocumentWriter) is in the document.
///
/// States only move forward. The image, material and effect sections come
/// together or not at all; joints are optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    Created,
    AssetWritten,
    ImagesWritten,
    MaterialsWritten,
    EffectsWritten,
    JointsWritten,
    GeometrySectionOpen,
    GeometryOpen,
    GeometrySourcesWritten,
    GeometryClosed,
    GeometrySectionClosed,
    Finalized,
}

impl WriterState {
    /// Whether `next` may directly follow `self`
    pub fn can_advance_to(self, next: WriterState) -> bool {
        use WriterState::*;

        matches!(
            (self, next),
            (Created, AssetWritten)
                | (AssetWritten, ImagesWritten)
                | (ImagesWritten, MaterialsWritten)
                | (MaterialsWritten, EffectsWritten)
                | (AssetWritten | EffectsWritten, JointsWritten)
                | (AssetWritten | EffectsWritten | JointsWritten, GeometrySectionOpen)
                | (GeometrySectionOpen | GeometryClosed, GeometryOpen)
                | (GeometryOpen | GeometrySourcesWritten, GeometrySourcesWritten)
                | (GeometrySourcesWritten, GeometryClosed)
                | (GeometrySectionOpen | GeometryClosed, GeometrySectionClosed)
                | (GeometrySectionClosed, Finalized)
        )
    }
}
