pub mod apertures;
pub mod commands;
pub mod coord;
pub mod interpreter;
pub mod lexer;

use log::info;

use crate::error::StencilError;

pub use self::interpreter::GerberOutput;

/// Parse a Gerber paste/copper layer into size-sorted pad apertures.
pub fn parse(content: &str, mirror_x: bool) -> Result<GerberOutput, StencilError> {
    let output = interpreter::interpret(content, mirror_x)?;
    info!(
        "Gerber: {} apertures, {} pad positions, {} duplicates dropped",
        output.apertures.len(),
        output.position_count(),
        output.duplicates
    );
    Ok(output)
}
