//! Render error types

/// Render error types
#[derive(Debug)]
pub enum RenderError {
    /// No GPU adapter compatible with the window surface
    NoAdapter,
    /// Device request failed
    Device(String),
    /// Surface could not be created or configured
    Surface(String),
    /// Surface was lost (window resized, minimized, etc.)
    SurfaceLost,
    /// GPU out of memory
    OutOfMemory,
    /// Other surface error
    Other(String),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::NoAdapter => write!(f, "No suitable GPU adapter"),
            RenderError::Device(msg) => write!(f, "Device error: {}", msg),
            RenderError::Surface(msg) => write!(f, "Surface error: {}", msg),
            RenderError::SurfaceLost => write!(f, "Surface lost"),
            RenderError::OutOfMemory => write!(f, "Out of memory"),
            RenderError::Other(msg) => write!(f, "Render error: {}", msg),
        }
    }
}

impl std::error::Error for RenderError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_error_display() {
        assert_eq!(format!("{}", RenderError::SurfaceLost), "Surface lost");
        assert_eq!(format!("{}", RenderError::OutOfMemory), "Out of memory");
        assert_eq!(
            format!("{}", RenderError::Other("test".to_string())),
            "Render error: test"
        );
        assert_eq!(
            format!("{}", RenderError::Device("lost".to_string())),
            "Device error: lost"
        );
    }
}
