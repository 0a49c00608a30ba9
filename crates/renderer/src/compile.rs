use std::borrow::Cow;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::types::CHANNEL_COUNT;

/// Uniform names injected by [`HEADER`]; user code must not redeclare them.
const RESERVED_UNIFORMS: [&str; 13] = [
    "iResolution",
    "iTime",
    "iTimeDelta",
    "iFrame",
    "iMouse",
    "iDate",
    "iSampleRate",
    "iChannelTime",
    "iChannelResolution",
    "iChannel0",
    "iChannel1",
    "iChannel2",
    "iChannel3",
];

/// Pipeline stage a shader module belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

impl From<ShaderStage> for naga::ShaderStage {
    fn from(stage: ShaderStage) -> Self {
        match stage {
            ShaderStage::Vertex => naga::ShaderStage::Vertex,
            ShaderStage::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

/// Failures while turning a shader file into a usable GPU program.
#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("couldn't load shader file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("error compiling {stage} shader:\n{log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("error linking shader:\n{log}")]
    Link { log: String },
}

/// Reads a `mainImage` body from disk.
pub fn load_fragment(path: &Path) -> Result<String, ShaderError> {
    std::fs::read_to_string(path).map_err(|source| ShaderError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Produces a complete fragment shader from a ShaderToy-style body.
///
/// The first `#version` directive and any `uniform` line redeclaring an
/// injected name are removed, then the body is sandwiched between [`HEADER`]
/// and [`FOOTER`].
pub fn wrap_fragment(body: &str) -> String {
    let mut sanitized = String::with_capacity(body.len());
    let mut skipped_version = false;
    for line in body.lines() {
        let trimmed = line.trim_start();
        if !skipped_version && trimmed.starts_with("#version") {
            skipped_version = true;
            continue;
        }
        if declares_reserved_uniform(trimmed) {
            continue;
        }
        sanitized.push_str(line);
        sanitized.push('\n');
    }

    let mut wrapped = String::with_capacity(HEADER.len() + sanitized.len() + FOOTER.len() + 1);
    wrapped.push_str(HEADER);
    wrapped.push_str(&sanitized);
    wrapped.push('\n');
    wrapped.push_str(FOOTER);
    wrapped
}

fn declares_reserved_uniform(line: &str) -> bool {
    let Some(rest) = line.strip_prefix("uniform") else {
        return false;
    };
    if !rest.starts_with(char::is_whitespace) {
        return false;
    }
    let code = rest.split("//").next().unwrap_or_default();
    let declaration = code.split(';').next().unwrap_or_default();
    declaration
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .any(|ident| RESERVED_UNIFORMS.contains(&ident))
}

/// Parses and validates GLSL without touching a GPU.
///
/// On failure the returned log is the rendered naga diagnostic, including the
/// offending source line.
pub fn validate(stage: ShaderStage, source: &str) -> Result<(), ShaderError> {
    let mut frontend = naga::front::glsl::Frontend::default();
    let options = naga::front::glsl::Options::from(naga::ShaderStage::from(stage));
    let module = frontend
        .parse(&options, source)
        .map_err(|errors| ShaderError::Compile {
            stage,
            log: errors.emit_to_string(source),
        })?;

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    )
    .validate(&module)
    .map_err(|error| ShaderError::Compile {
        stage,
        log: error.emit_to_string(source),
    })?;
    Ok(())
}

/// Compiles the static full-screen quad vertex shader.
pub(crate) fn compile_vertex_shader(
    device: &wgpu::Device,
) -> Result<wgpu::ShaderModule, ShaderError> {
    validate(ShaderStage::Vertex, VERTEX_SHADER_GLSL)?;
    create_module(
        device,
        "fullscreen quad vertex",
        Cow::Borrowed(VERTEX_SHADER_GLSL),
        ShaderStage::Vertex,
    )
}

/// Wraps the user body and compiles it as a fragment module.
pub(crate) fn compile_fragment_shader(
    device: &wgpu::Device,
    body: &str,
) -> Result<wgpu::ShaderModule, ShaderError> {
    let wrapped = wrap_fragment(body);
    validate(ShaderStage::Fragment, &wrapped)?;
    create_module(
        device,
        "fragrun fragment",
        Cow::Owned(wrapped),
        ShaderStage::Fragment,
    )
}

fn create_module(
    device: &wgpu::Device,
    label: &str,
    source: Cow<'static, str>,
    stage: ShaderStage,
) -> Result<wgpu::ShaderModule, ShaderError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Glsl {
            shader: source,
            stage: stage.into(),
            defines: &[],
        },
    });
    match pollster::block_on(device.pop_error_scope()) {
        Some(error) => Err(ShaderError::Compile {
            stage,
            log: error.to_string(),
        }),
        None => Ok(module),
    }
}

/// GLSL prologue injected ahead of every fragment body.
///
/// The uniform block layout must match [`crate::gpu`]'s `ShadertoyUniforms`.
/// Channel samplers are separate texture/sampler pairs combined through
/// macros because wgpu has no combined image samplers.
const HEADER: &str = r"#version 450
layout(location = 0) out vec4 fragrun_color;

layout(std140, set = 0, binding = 0) uniform ShadertoyParams {
    vec3 _iResolution;
    float _iTime;
    float _iTimeDelta;
    int _iFrame;
    float _iSampleRate;
    float _padding0;
    vec4 _iMouse;
    vec4 _iDate;
    float _iChannelTime[4];
    vec3 _iChannelResolution[4];
} fragrun_params;

#define iResolution fragrun_params._iResolution
#define iTime fragrun_params._iTime
#define iTimeDelta fragrun_params._iTimeDelta
#define iFrame fragrun_params._iFrame
#define iSampleRate fragrun_params._iSampleRate
#define iMouse fragrun_params._iMouse
#define iDate fragrun_params._iDate
#define iChannelTime fragrun_params._iChannelTime
#define iChannelResolution fragrun_params._iChannelResolution

layout(set = 1, binding = 0) uniform texture2D fragrun_channel0_texture;
layout(set = 1, binding = 1) uniform sampler fragrun_channel0_sampler;
layout(set = 1, binding = 2) uniform texture2D fragrun_channel1_texture;
layout(set = 1, binding = 3) uniform sampler fragrun_channel1_sampler;
layout(set = 1, binding = 4) uniform texture2D fragrun_channel2_texture;
layout(set = 1, binding = 5) uniform sampler fragrun_channel2_sampler;
layout(set = 1, binding = 6) uniform texture2D fragrun_channel3_texture;
layout(set = 1, binding = 7) uniform sampler fragrun_channel3_sampler;

#define iChannel0 sampler2D(fragrun_channel0_texture, fragrun_channel0_sampler)
#define iChannel1 sampler2D(fragrun_channel1_texture, fragrun_channel1_sampler)
#define iChannel2 sampler2D(fragrun_channel2_texture, fragrun_channel2_sampler)
#define iChannel3 sampler2D(fragrun_channel3_texture, fragrun_channel3_sampler)

";

/// GLSL epilogue: flips `gl_FragCoord` to a bottom-left origin and calls `mainImage`.
const FOOTER: &str = r"void main() {
    vec2 fragCoord = vec2(gl_FragCoord.x, iResolution.y - gl_FragCoord.y);
    vec4 color = vec4(0.0);
    mainImage(color, fragCoord);
    fragrun_color = vec4(color.rgb, 1.0);
}
";

const VERTEX_SHADER_GLSL: &str = r"#version 450
layout(location = 0) in vec2 position;

void main() {
    gl_Position = vec4(position, 0.0, 1.0);
}
";

// The header binds exactly one texture/sampler pair per channel.
const _: () = assert!(CHANNEL_COUNT == 4);

#[cfg(test)]
mod tests {
    use super::*;

    const GRADIENT: &str = r"
void mainImage(out vec4 fragColor, in vec2 fragCoord) {
    vec2 uv = fragCoord / iResolution.xy;
    fragColor = vec4(uv, 0.5 + 0.5 * sin(iTime), 1.0);
}
";

    #[test]
    fn wrap_strips_shadertoy_uniforms() {
        let source = r#"
            #version 300 es
            uniform float iTime;
            uniform vec3 iResolution;
            uniform sampler2D iChannel0;
            void mainImage(out vec4 fragColor, in vec2 fragCoord) {
                fragColor = vec4(fragCoord, 0.0, 1.0);
            }
        "#;

        let wrapped = wrap_fragment(source);
        assert!(!wrapped.contains("uniform float iTime"));
        assert!(!wrapped.contains("uniform vec3 iResolution"));
        assert!(!wrapped.contains("uniform sampler2D iChannel0"));
        assert!(!wrapped.contains("#version 300 es"));
        assert!(wrapped.starts_with("#version 450"));
        assert!(wrapped.contains("mainImage(color, fragCoord)"));
    }

    #[test]
    fn wrap_keeps_user_uniforms_with_similar_names() {
        let wrapped = wrap_fragment("uniform float iTimeScale;\nuniforms_are_fine();\n");
        assert!(wrapped.contains("uniform float iTimeScale;"));
        assert!(wrapped.contains("uniforms_are_fine();"));
    }

    #[test]
    fn wrap_ignores_reserved_names_in_trailing_comments() {
        let wrapped = wrap_fragment(
            "uniform float speed; // scales iTime\nuniform float iTime; // pasted\n",
        );
        assert!(wrapped.contains("uniform float speed; // scales iTime"));
        assert!(!wrapped.contains("uniform float iTime; // pasted"));
    }

    #[test]
    fn wrap_only_drops_first_version_directive() {
        let wrapped = wrap_fragment("#version 330 core\n#version 450\n");
        assert!(!wrapped.contains("#version 330 core"));
        assert_eq!(wrapped.matches("#version 450").count(), 2);
    }

    #[test]
    fn body_sits_between_header_and_footer() {
        let wrapped = wrap_fragment(GRADIENT);
        let header_end = wrapped.find("#define iChannel3").unwrap();
        let body = wrapped.find("void mainImage").unwrap();
        let footer = wrapped.find("void main()").unwrap();
        assert!(header_end < body);
        assert!(body < footer);
    }

    #[test]
    fn vertex_shader_validates() {
        validate(ShaderStage::Vertex, VERTEX_SHADER_GLSL).unwrap();
    }

    #[test]
    fn wrapped_gradient_validates() {
        validate(ShaderStage::Fragment, &wrap_fragment(GRADIENT)).unwrap();
    }

    #[test]
    fn wrapped_shader_may_sample_channels_and_read_every_uniform() {
        let body = r"
void mainImage(out vec4 fragColor, in vec2 fragCoord) {
    vec2 uv = fragCoord / iResolution.xy;
    vec4 tex = texture(iChannel0, uv) + texture(iChannel3, uv);
    float t = iTime + iTimeDelta + float(iFrame) + iSampleRate * 0.0;
    t += iMouse.x + iDate.w + iChannelTime[1] + iChannelResolution[2].x;
    fragColor = tex + vec4(fract(t));
}
";
        validate(ShaderStage::Fragment, &wrap_fragment(body)).unwrap();
    }

    #[test]
    fn missing_main_image_is_a_compile_error() {
        let err = validate(
            ShaderStage::Fragment,
            &wrap_fragment("float helper() { return 1.0; }\n"),
        )
        .unwrap_err();
        match err {
            ShaderError::Compile { stage, ref log } => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert!(!log.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_body_fails_for_lack_of_main_image() {
        let wrapped = wrap_fragment("");
        assert!(wrapped.contains("void main()"));
        let err = validate(ShaderStage::Fragment, &wrapped).unwrap_err();
        assert!(matches!(
            err,
            ShaderError::Compile {
                stage: ShaderStage::Fragment,
                ..
            }
        ));
    }

    #[test]
    fn syntax_error_reports_log() {
        let err = validate(
            ShaderStage::Fragment,
            &wrap_fragment("void mainImage(out vec4 c, in vec2 p) { c = vec4(1.0) }\n"),
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("error compiling fragment shader:"));
        assert!(matches!(err, ShaderError::Compile { ref log, .. } if !log.is_empty()));
    }

    #[test]
    fn load_fragment_reports_missing_file() {
        let err = load_fragment(Path::new("/definitely/not/here.frag")).unwrap_err();
        assert!(matches!(err, ShaderError::Read { .. }));
        assert!(err.to_string().starts_with("couldn't load shader file"));
    }
}
