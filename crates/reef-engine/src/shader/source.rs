use std::path::{Path, PathBuf};

use crate::error::{ErrorCode, FatalError, OrFatal, Result};

use super::layout::InputLayout;

/// Pipeline stage of a program.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ProgramStage {
    Vertex,
    Pixel,
}

impl ProgramStage {
    fn naga_stage(self) -> naga::ShaderStage {
        match self {
            ProgramStage::Vertex => naga::ShaderStage::Vertex,
            ProgramStage::Pixel => naga::ShaderStage::Fragment,
        }
    }

    fn profile(self) -> &'static str {
        match self {
            ProgramStage::Vertex => "vertex",
            ProgramStage::Pixel => "fragment",
        }
    }
}

/// Entry point names of the four programs in the shader source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoints {
    pub water_vs: String,
    pub sky_vs: String,
    pub water_ps: String,
    pub sky_ps: String,
}

impl Default for EntryPoints {
    fn default() -> Self {
        Self {
            water_vs: "water_vs".into(),
            sky_vs: "sky_vs".into(),
            water_ps: "water_ps".into(),
            sky_ps: "sky_ps".into(),
        }
    }
}

/// A validated entry point of the shader source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderProgram {
    stage: ProgramStage,
    entry_point: String,
}

impl ShaderProgram {
    pub fn stage(&self) -> ProgramStage {
        self.stage
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }
}

/// Parsed and validated WGSL source.
#[derive(Debug)]
pub struct ProgramSource {
    origin: PathBuf,
    text: String,
    module: naga::Module,
}

impl ProgramSource {
    /// Reads and compiles the shader source at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .or_fatal(ErrorCode::Shader, format!("unable to read shader source {}", path.display()))?;
        Self::compile(path, text)
    }

    /// Parses and validates `text`. `origin` is only used in messages.
    ///
    /// Parse errors are reported with the compiler's own annotated output.
    pub fn compile(origin: &Path, text: String) -> Result<Self> {
        let module = naga::front::wgsl::parse_str(&text).map_err(|e| {
            FatalError::new(
                ErrorCode::Shader,
                format!(
                    "unable to compile shader source {}:\n{}",
                    origin.display(),
                    e.emit_to_string(&text)
                ),
            )
        })?;

        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        .or_fatal(
            ErrorCode::Shader,
            format!("unable to validate shader source {}", origin.display()),
        )?;

        log::debug!(
            "shader source {} compiled ({} entry points)",
            origin.display(),
            module.entry_points.len()
        );

        Ok(Self {
            origin: origin.to_path_buf(),
            text,
            module,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Looks up `name` as a program of `stage`.
    pub fn program(&self, name: &str, stage: ProgramStage) -> Result<ShaderProgram> {
        let entry = self.entry_point(name, stage)?;
        Ok(ShaderProgram {
            stage,
            entry_point: entry.name.clone(),
        })
    }

    /// Derives the vertex input layout from the signature of `name`.
    pub fn input_layout(&self, name: &str) -> Result<InputLayout> {
        let entry = self.entry_point(name, ProgramStage::Vertex)?;
        InputLayout::from_entry_point(&self.module, entry)
            .map_err(|e| e.while_doing(format!("unable to create input layout for `{name}`")))
    }

    fn entry_point(&self, name: &str, stage: ProgramStage) -> Result<&naga::EntryPoint> {
        let missing = || {
            FatalError::new(
                ErrorCode::Shader,
                format!(
                    "unable to compile {} program `{name}` from {}",
                    stage.profile(),
                    self.origin.display()
                ),
            )
        };

        self.module
            .entry_points
            .iter()
            .find(|ep| ep.name == name && ep.stage == stage.naga_stage())
            .ok_or_else(missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SRC: &str = "
        @vertex fn water_vs(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
            return vec4<f32>(position, 1.0);
        }
        @fragment fn water_ps() -> @location(0) vec4<f32> {
            return vec4<f32>(0.0, 0.5, 1.0, 1.0);
        }
    ";

    fn compile(src: &str) -> Result<ProgramSource> {
        ProgramSource::compile(Path::new("test.wgsl"), src.to_string())
    }

    #[test]
    fn finds_programs_by_stage() {
        let source = compile(SRC).unwrap();
        let vs = source.program("water_vs", ProgramStage::Vertex).unwrap();
        assert_eq!(vs.entry_point(), "water_vs");
        assert_eq!(vs.stage(), ProgramStage::Vertex);
        assert!(source.program("water_ps", ProgramStage::Pixel).is_ok());
    }

    #[test]
    fn missing_entry_point_gets_generic_message() {
        let source = compile(SRC).unwrap();
        let err = source.program("sky_ps", ProgramStage::Pixel).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Shader);
        assert_eq!(
            err.to_string(),
            "unable to compile fragment program `sky_ps` from test.wgsl"
        );

        // Right name, wrong stage.
        assert!(source.program("water_vs", ProgramStage::Pixel).is_err());
    }

    #[test]
    fn parse_errors_are_reported_verbatim() {
        let bad = "@vertex fn water_vs( -> @builtin(position) vec4<f32> {}";
        let expected = naga::front::wgsl::parse_str(bad)
            .unwrap_err()
            .emit_to_string(bad);

        let err = compile(bad).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Shader);
        assert!(err.to_string().ends_with(&expected));
    }

    #[test]
    fn validation_errors_are_fatal() {
        // Parses, but a vertex program must output a clip-space position.
        let bad = "@vertex fn water_vs() -> @location(0) vec4<f32> { return vec4<f32>(0.0); }";
        let err = compile(bad).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Shader);
        assert!(err.to_string().starts_with("unable to validate shader source test.wgsl: "));
    }

    #[test]
    fn input_layout_from_water_vs() {
        let source = compile(SRC).unwrap();
        let layout = source.input_layout("water_vs").unwrap();
        assert_eq!(layout.stride(), 12);
        assert_eq!(layout.attributes()[0].semantic, "position");
    }

    #[test]
    fn shipped_shader_provides_every_program() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/reef.wgsl");
        let source = ProgramSource::load(&path).unwrap();
        let entry_points = EntryPoints::default();

        for (name, stage) in [
            (&entry_points.water_vs, ProgramStage::Vertex),
            (&entry_points.sky_vs, ProgramStage::Vertex),
            (&entry_points.water_ps, ProgramStage::Pixel),
            (&entry_points.sky_ps, ProgramStage::Pixel),
        ] {
            source.program(name, stage).unwrap();
        }

        let layout = source.input_layout(&entry_points.water_vs).unwrap();
        layout
            .ensure_matches(crate::geometry::Vertex::STRIDE, &crate::geometry::Vertex::ATTRS)
            .unwrap();
    }
}
