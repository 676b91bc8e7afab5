/// Accepts finished command batches.
pub(crate) trait CommandSink {
    type Encoder;

    fn create_encoder(&self) -> Self::Encoder;

    fn submit(&self, encoder: Self::Encoder);
}

/// Immediate-mode ordering on top of deferred command encoders.
///
/// Draws are recorded into a pending encoder. A parameter write that follows
/// a draw submits the pending encoder first, so every draw observes the
/// values written before it and none written after it.
pub(crate) struct FrameRecorder<E> {
    encoder: Option<E>,
    draws_pending: bool,
}

impl<E> FrameRecorder<E> {
    pub(crate) fn new() -> Self {
        Self {
            encoder: None,
            draws_pending: false,
        }
    }

    /// Starts a frame on `encoder`. Unsubmitted work of a previous frame is
    /// dropped.
    pub(crate) fn begin(&mut self, encoder: E) {
        self.encoder = Some(encoder);
        self.draws_pending = false;
    }

    /// Encoder for the next draw; `None` outside of a frame.
    pub(crate) fn draw_encoder(&mut self) -> Option<&mut E> {
        let encoder = self.encoder.as_mut()?;
        self.draws_pending = true;
        Some(encoder)
    }

    /// Submits recorded draws through `sink` ahead of a parameter write.
    pub(crate) fn before_write<S>(&mut self, sink: &S)
    where
        S: CommandSink<Encoder = E>,
    {
        if !self.draws_pending {
            return;
        }
        if let Some(encoder) = self.encoder.take() {
            sink.submit(encoder);
            self.encoder = Some(sink.create_encoder());
        }
        self.draws_pending = false;
    }

    /// Ends the frame, handing back the encoder with unsubmitted work.
    pub(crate) fn finish(&mut self) -> Option<E> {
        self.draws_pending = false;
        self.encoder.take()
    }
}
