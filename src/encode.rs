//! Emisión de texto 1#.
//!
//! Cada instrucción se escribe como una secuencia de `1` seguida de una
//! secuencia de `#` (ver [`Op::word()`](crate::ir::Op::word)). Los comentarios se escriben en
//! líneas propias que inician con `;`, y cualquier `1` o `#` en su texto
//! se reemplaza por `¹` o `♯`, de modo que un intérprete que ignore todo
//! carácter ajeno al alfabeto nunca los confunda con código.

use std::io::{self, Write};

use bitflags::bitflags;
use tracing::debug;

use crate::{
    error::Error,
    ir::{Instruction, Program, HASH, ONE},
    resolve::resolve,
};

/// Inicio de una línea de comentario.
pub const COMMENT_PREFIX: char = ';';

bitflags! {
    /// Opciones de emisión.
    pub struct EncodeOptions: u32 {
        /// Emitir comentarios.
        const COMMENTS = 0x01;

        /// Emitir todas las instrucciones en una sola línea, sin
        /// separadores. Implica descartar comentarios.
        const COMPACT = 0x02;
    }
}

impl Default for EncodeOptions {
    fn default() -> Self {
        EncodeOptions::COMMENTS
    }
}

/// Escribe un programa resuelto.
pub fn encode<W: Write>(program: &Program, options: EncodeOptions, output: &mut W) -> io::Result<()> {
    if options.contains(EncodeOptions::COMPACT) {
        for op in &program.ops {
            write!(output, "{}", op)?;
        }

        return writeln!(output);
    }

    let comments = options.contains(EncodeOptions::COMMENTS);
    for index in 0..=program.ops.len() {
        if comments {
            for comment in program.comments_at(index) {
                write_comment(output, comment)?;
            }
        }

        if let Some(op) = program.ops.get(index) {
            writeln!(output, "{}", op)?;
        }
    }

    Ok(())
}

/// Resuelve y escribe un flujo de construcción terminado.
///
/// Si la resolución falla no se escribe nada.
pub fn assemble<W: Write>(
    code: &[Instruction],
    options: EncodeOptions,
    output: &mut W,
) -> Result<(), Error> {
    let program = resolve(code)?;
    debug!(instructions = program.len(), ?options, "encoding");

    encode(&program, options, output)?;
    Ok(())
}

/// Texto de un programa resuelto.
pub fn to_text(program: &Program, options: EncodeOptions) -> String {
    let mut buffer = Vec::new();
    encode(program, options, &mut buffer).expect("writes to a Vec never fail");

    // Op y los comentarios saneados solo producen UTF-8 válido
    String::from_utf8(buffer).expect("encoder produced invalid UTF-8")
}

fn write_comment<W: Write>(output: &mut W, comment: &str) -> io::Result<()> {
    for line in comment.lines() {
        let line: String = line
            .chars()
            .map(|c| match c {
                ONE => '¹',
                HASH => '♯',
                c => c,
            })
            .collect();

        if line.is_empty() {
            writeln!(output, "{}", COMMENT_PREFIX)?;
        } else {
            writeln!(output, "{} {}", COMMENT_PREFIX, line)?;
        }
    }

    Ok(())
}

/// Verdadero si la línea es código 1# ejecutable.
pub fn is_code(line: &str) -> bool {
    !line.is_empty() && line.chars().all(|c| c == ONE || c == HASH)
}
