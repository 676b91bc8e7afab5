use std::cell::RefCell;
use std::rc::Rc;

use crate::device::SurfaceSize;
use crate::error::Result;
use crate::resources::{PsParams, StructuredBufferDesc, VsParams, Wave, DEFAULT_WAVES};
use crate::scene::Viewport;
use crate::shader::Pass;

use super::RenderBackend;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Resize(SurfaceSize),
    Begin(wgpu::Color),
    UpdateVs(VsParams),
    UpdatePs(PsParams),
    Draw(Pass, u32),
    Present,
    Teardown,
}

impl Call {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Call::Resize(_) => "resize",
            Call::Begin(_) => "begin",
            Call::UpdateVs(_) => "vs",
            Call::UpdatePs(_) => "ps",
            Call::Draw(..) => "draw",
            Call::Present => "present",
            Call::Teardown => "teardown",
        }
    }
}

/// Backend that records every call instead of touching a GPU.
pub(crate) struct RecordingBackend {
    size: SurfaceSize,
    water_index_count: u32,
    waves: StructuredBufferDesc,
    log: Rc<RefCell<Vec<Call>>>,
}

impl RecordingBackend {
    pub(crate) fn new(size: SurfaceSize, water_index_count: u32) -> Self {
        Self {
            size,
            water_index_count,
            waves: StructuredBufferDesc::of::<Wave>(DEFAULT_WAVES.len()),
            log: Rc::default(),
        }
    }

    /// Describes a wave buffer holding `waves` instead of the default set.
    pub(crate) fn with_waves(mut self, waves: &[Wave]) -> Self {
        self.waves = StructuredBufferDesc::of::<Wave>(waves.len());
        self
    }

    /// Shared handle to the call log; survives `teardown`.
    pub(crate) fn log(&self) -> Rc<RefCell<Vec<Call>>> {
        Rc::clone(&self.log)
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.log.borrow().clone()
    }

    pub(crate) fn clear(&self) {
        self.log.borrow_mut().clear();
    }

    pub(crate) fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.log.borrow().iter().filter(|c| pred(c)).count()
    }

    pub(crate) fn draws(&self) -> Vec<(Pass, u32)> {
        self.log
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::Draw(pass, n) => Some((*pass, *n)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.log.borrow_mut().push(call);
    }
}

impl RenderBackend for RecordingBackend {
    fn surface_size(&self) -> SurfaceSize {
        self.size
    }

    fn resize(&mut self, size: SurfaceSize) -> Result<()> {
        self.size = size;
        self.record(Call::Resize(size));
        Ok(())
    }

    fn begin_frame(&mut self, clear: wgpu::Color, _viewport: Viewport) -> Result<()> {
        self.record(Call::Begin(clear));
        Ok(())
    }

    fn update_vs_params(&mut self, params: &VsParams) -> Result<()> {
        self.record(Call::UpdateVs(*params));
        Ok(())
    }

    fn update_ps_params(&mut self, params: &PsParams) -> Result<()> {
        self.record(Call::UpdatePs(*params));
        Ok(())
    }

    fn draw(&mut self, pass: Pass, index_count: u32) -> Result<()> {
        self.record(Call::Draw(pass, index_count));
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        self.record(Call::Present);
        Ok(())
    }

    fn index_count(&self, pass: Pass) -> u32 {
        match pass {
            Pass::Sky => 36,
            Pass::Water => self.water_index_count,
        }
    }

    fn wave_count(&self) -> u32 {
        self.waves.element_count
    }

    fn teardown(self) {
        self.record(Call::Teardown);
    }
}
