use naga::valid::{Capabilities, ValidationFlags, Validator};
use thiserror::Error;

/// Failure modes of a shader source submitted through the reload path.
///
/// None of these are fatal to the viewer: the sample that reported one keeps
/// its previously working pipeline.
#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("WGSL parse error in shader '{name}':\n{detail}")]
    Parse { name: String, detail: String },
    #[error("WGSL validation error in shader '{name}':\n{detail}")]
    Validate { name: String, detail: String },
    #[error("shader '{name}' has no entry point '{entry_point}'")]
    MissingEntryPoint { name: String, entry_point: String },
}

/// A WGSL module that parsed and validated on the CPU.
///
/// Running the `naga` front end before handing a source to the device keeps a
/// bad reload from raising an uncapturable device error: only sources that
/// passed here may become `wgpu` shader modules.
#[derive(Debug)]
pub struct ValidatedWgsl {
    module: naga::Module,
}

pub fn validate_wgsl(name: &str, source: &str) -> Result<ValidatedWgsl, ShaderError> {
    let module = naga::front::wgsl::parse_str(source).map_err(|err| ShaderError::Parse {
        name: name.to_owned(),
        detail: err.emit_to_string(source),
    })?;
    Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .map_err(|err| ShaderError::Validate {
            name: name.to_owned(),
            detail: err.to_string(),
        })?;
    Ok(ValidatedWgsl { module })
}

impl ValidatedWgsl {
    /// Entry points named in pipeline descriptors must exist before pipeline
    /// creation, which would otherwise raise a device-level validation error.
    pub fn require_entry_point(
        &self,
        shader_name: &str,
        entry_point: &str,
    ) -> Result<(), ShaderError> {
        if self
            .module
            .entry_points
            .iter()
            .any(|ep| ep.name == entry_point)
        {
            Ok(())
        } else {
            Err(ShaderError::MissingEntryPoint {
                name: shader_name.to_owned(),
                entry_point: entry_point.to_owned(),
            })
        }
    }
}
