use thiserror::Error;

#[derive(Error, Debug)]
pub enum StencilError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {reason}")]
    Format { line: usize, reason: String },

    #[error("line {line}: aperture {name} is not defined")]
    UnknownAperture { line: usize, name: String },
}

impl StencilError {
    pub fn format(line: usize, reason: impl Into<String>) -> Self {
        StencilError::Format {
            line,
            reason: reason.into(),
        }
    }
}
