//! Errores de las distintas fases.
//!
//! Ninguna condición de error es transitoria: todas señalan un defecto
//! estructural en la lógica que genera el programa, por lo cual ninguna
//! operación se reintenta.

use crate::ir::Reg;
use thiserror::Error;

/// Error durante la construcción de un programa.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// Se intentó definir por segunda vez una etiqueta.
    #[error("Label `{0}` is already bound")]
    DuplicateLabel(String),

    /// Los registros se numeran a partir de 1.
    #[error("Invalid register index {0}, registers are numbered from 1")]
    RegisterIndex(u32),

    /// Una rutina recibió el mismo registro en dos operandos.
    #[error("Register {0} passed twice, operands must be distinct")]
    Aliased(u32),

    /// El registro pertenece al rango de temporales pero no fue reservado.
    #[error("Register {0} lies in the temporary range and was not allocated")]
    Reserved(u32),

    /// Una rutina recibió una cantidad incorrecta de registros.
    #[error("`{routine}` takes {expected} register(s), got {found}")]
    Arity {
        routine: String,
        expected: usize,
        found: usize,
    },
}

/// Error de resolución de etiquetas.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Un salto hace referencia a una etiqueta que nunca se definió.
    #[error("Jump to unbound label `{0}`")]
    UnresolvedLabel(String),

    /// Una etiqueta aparece definida más de una vez en el flujo.
    #[error("Label `{0}` is bound more than once")]
    DuplicateLabel(String),

    /// El salto tendría distancia cero, lo cual no se puede codificar.
    #[error("Jump to `{0}` targets its own position")]
    SelfJump(String),

    /// Registro inválido en un flujo ensamblado a mano.
    #[error("Invalid register index {0}, registers are numbered from 1")]
    RegisterIndex(u32),

    /// Un salto en la posición indicada cae fuera del programa.
    #[error("Jump at {0} lands outside the program")]
    OutOfRange(usize),
}

/// Error de la secuencia completa de resolución y codificación.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    #[error("Label resolution failed")]
    Resolve(#[from] ResolveError),

    #[error("I/O error")]
    Io(#[from] std::io::Error),
}

/// Valida que un registro exista.
pub(crate) fn check_reg(reg: Reg) -> Result<Reg, BuildError> {
    match reg {
        Reg(0) => Err(BuildError::RegisterIndex(0)),
        reg => Ok(reg),
    }
}
