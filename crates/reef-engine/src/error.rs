use std::fmt;

/// Category of a fatal failure.
///
/// Every category maps to a stable 32-bit status code so the top-level handler
/// can report `status + message` regardless of which backend produced the
/// underlying error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ErrorCode {
    /// Event loop or window creation.
    Window,
    /// No adapter/device could be created for any driver preference.
    Device,
    /// Surface creation, capability negotiation or configuration.
    Surface,
    /// Shader source read, compile or validation.
    Shader,
    /// Mesh data does not match the program input layout.
    Geometry,
    /// External asset (cubemap) read or decode.
    Asset,
    /// GPU resource creation (attachments, buffers, textures).
    Resource,
    /// Failure while recording or presenting a frame.
    Frame,
}

impl ErrorCode {
    /// Returns the 32-bit status code reported to the user.
    pub fn status(self) -> u32 {
        match self {
            ErrorCode::Window => 0x8000_0001,
            ErrorCode::Device => 0x8000_0002,
            ErrorCode::Surface => 0x8000_0003,
            ErrorCode::Shader => 0x8000_0004,
            ErrorCode::Geometry => 0x8000_0005,
            ErrorCode::Asset => 0x8000_0006,
            ErrorCode::Resource => 0x8000_0007,
            ErrorCode::Frame => 0x8000_0008,
        }
    }
}

/// The single error kind of the renderer.
///
/// Carries a status code and a human-readable context naming the operation
/// that failed. The optional source keeps the backend error chain for logs.
#[derive(Debug)]
pub struct FatalError {
    code: ErrorCode,
    context: String,
    source: Option<anyhow::Error>,
}

pub type Result<T> = std::result::Result<T, FatalError>;

impl FatalError {
    pub fn new(code: ErrorCode, context: impl Into<String>) -> Self {
        Self {
            code,
            context: context.into(),
            source: None,
        }
    }

    pub fn with_source(code: ErrorCode, context: impl Into<String>, source: anyhow::Error) -> Self {
        Self {
            code,
            context: context.into(),
            source: Some(source),
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn status(&self) -> u32 {
        self.code.status()
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    /// Replaces the context with a more specific one, keeping the previous
    /// context in the source chain.
    pub fn while_doing(self, context: impl Into<String>) -> Self {
        let inner = match self.source {
            Some(src) => src.context(self.context),
            None => anyhow::anyhow!(self.context),
        };
        Self {
            code: self.code,
            context: context.into(),
            source: Some(inner),
        }
    }

    /// Formats the message the way the top-level handler presents it.
    pub fn report(&self) -> String {
        format!("status: 0x{:08X}\n{}", self.status(), self)
    }
}

impl fmt::Display for FatalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(src) => write!(f, "{}: {:#}", self.context, src),
            None => f.write_str(&self.context),
        }
    }
}

impl std::error::Error for FatalError {}

/// Converts fallible values into [`FatalError`]s with a code and context.
pub trait OrFatal<T> {
    fn or_fatal(self, code: ErrorCode, context: impl Into<String>) -> Result<T>;
}

impl<T, E> OrFatal<T> for std::result::Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn or_fatal(self, code: ErrorCode, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| FatalError::with_source(code, context, e.into()))
    }
}

impl<T> OrFatal<T> for Option<T> {
    fn or_fatal(self, code: ErrorCode, context: impl Into<String>) -> Result<T> {
        self.ok_or_else(|| FatalError::new(code, context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_carries_status_and_context() {
        let err = FatalError::new(ErrorCode::Resource, "unable to create depth-stencil view");
        assert_eq!(
            err.report(),
            "status: 0x80000007\nunable to create depth-stencil view"
        );
    }

    #[test]
    fn or_fatal_keeps_source_chain() {
        let res: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"));
        let err = res.or_fatal(ErrorCode::Asset, "unable to load skybox texture").unwrap_err();
        assert_eq!(err.code(), ErrorCode::Asset);
        assert_eq!(err.context(), "unable to load skybox texture");
        assert_eq!(err.to_string(), "unable to load skybox texture: no such file");
    }

    #[test]
    fn option_or_fatal_has_no_source() {
        let err = None::<u32>.or_fatal(ErrorCode::Surface, "no supported surface formats").unwrap_err();
        assert_eq!(err.to_string(), "no supported surface formats");
    }

    #[test]
    fn while_doing_replaces_context() {
        let err = FatalError::new(ErrorCode::Resource, "size exceeds limit")
            .while_doing("unable to recreate attachments after resize");
        assert_eq!(err.context(), "unable to recreate attachments after resize");
        assert_eq!(
            err.to_string(),
            "unable to recreate attachments after resize: size exceeds limit"
        );
        assert_eq!(err.code(), ErrorCode::Resource);
    }
}
