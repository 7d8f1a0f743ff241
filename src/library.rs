//! Rutinas de uso común.
//!
//! Todas se construyen con los combinadores de [`Flow`] y dejan vacíos
//! los temporales que usan. Ninguna acepta el mismo registro dos veces,
//! ya que por ejemplo mover un registro sobre sí mismo nunca termina.
//! Los operandos se validan antes de emitir cualquier instrucción.

use std::{
    fmt::{self, Display},
    str::FromStr,
};

use crate::{
    builder::Sink,
    error::BuildError,
    flow::{Build, Flow},
    ir::Reg,
};

/// Agrega los contenidos de `from` al final de `to`, vaciando `from`.
pub fn move_reg<S: Flow>(sink: &mut S, from: Reg, to: Reg) -> Build {
    operands(sink, &[from, to])?;

    sink.repeat_on(from, |this| this.write_one(to), |this| this.write_hash(to))
}

/// Agrega los contenidos de `from` al final de `to`, preservando `from`.
pub fn copy_reg<S: Flow>(sink: &mut S, from: Reg, to: Reg) -> Build {
    operands(sink, &[from, to])?;

    sink.with_temp(|this, temp| {
        this.repeat_on(
            from,
            |this| {
                this.write_one(to)?;
                this.write_one(temp)
            },
            |this| {
                this.write_hash(to)?;
                this.write_hash(temp)
            },
        )?;

        move_reg(this, temp, from)
    })
}

/// Vacía un registro.
pub fn clear<S: Flow>(sink: &mut S, reg: Reg) -> Build {
    operands(sink, &[reg])?;

    sink.while_nonempty(reg, |_| Ok(()))
}

/// Intercambia los contenidos de dos registros.
pub fn swap<S: Flow>(sink: &mut S, a: Reg, b: Reg) -> Build {
    operands(sink, &[a, b])?;

    sink.with_temp(|this, temp| {
        move_reg(this, a, temp)?;
        move_reg(this, b, a)?;
        move_reg(this, temp, b)
    })
}

/// Antepone a `to` los contenidos de `from` en orden inverso, vaciando `from`.
pub fn reverse<S: Flow>(sink: &mut S, from: Reg, to: Reg) -> Build {
    operands(sink, &[from, to])?;

    sink.repeat_on(
        from,
        |this| prepend(this, to, |this, reg| this.write_one(reg)),
        |this| prepend(this, to, |this, reg| this.write_hash(reg)),
    )
}

/// Antepone un símbolo a `to`.
///
/// El símbolo se escribe en un temporal vacío, se le agrega `to` y el
/// resultado regresa a `to`.
fn prepend<S: Flow>(sink: &mut S, to: Reg, symbol: fn(&mut S, Reg) -> Build) -> Build {
    sink.with_temp(|this, temp| {
        symbol(this, temp)?;
        move_reg(this, to, temp)?;
        move_reg(this, temp, to)
    })
}

fn operands<S: Sink>(sink: &S, regs: &[Reg]) -> Result<(), BuildError> {
    for (i, reg) in regs.iter().enumerate() {
        sink.check(*reg)?;
        if regs[i + 1..].contains(reg) {
            return Err(BuildError::Aliased(reg.0));
        }
    }

    Ok(())
}

/// Rutina seleccionable por nombre.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Routine {
    Move,
    Copy,
    Clear,
    Swap,
    Reverse,
}

impl Routine {
    pub const ALL: [Routine; 5] = [
        Routine::Move,
        Routine::Copy,
        Routine::Clear,
        Routine::Swap,
        Routine::Reverse,
    ];

    /// Cantidad de registros que recibe.
    pub fn arity(self) -> usize {
        match self {
            Routine::Clear => 1,
            _ => 2,
        }
    }

    /// Emite la rutina sobre `regs`, que debe tener exactamente
    /// [`Routine::arity()`] elementos.
    pub fn build<S: Flow>(self, sink: &mut S, regs: &[Reg]) -> Build {
        if regs.len() != self.arity() {
            return Err(self.mismatch(regs.len()));
        }

        let listed = regs
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");

        sink.comment(format!("{}({})", self, listed));

        match (self, regs) {
            (Routine::Move, &[from, to]) => move_reg(sink, from, to),
            (Routine::Copy, &[from, to]) => copy_reg(sink, from, to),
            (Routine::Clear, &[reg]) => clear(sink, reg),
            (Routine::Swap, &[a, b]) => swap(sink, a, b),
            (Routine::Reverse, &[from, to]) => reverse(sink, from, to),
            _ => Err(self.mismatch(regs.len())),
        }
    }

    fn mismatch(self, found: usize) -> BuildError {
        BuildError::Arity {
            routine: self.to_string(),
            expected: self.arity(),
            found,
        }
    }
}

impl Display for Routine {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Routine::Move => "move",
            Routine::Copy => "copy",
            Routine::Clear => "clear",
            Routine::Swap => "swap",
            Routine::Reverse => "reverse",
        };

        fmt.write_str(name)
    }
}

impl FromStr for Routine {
    type Err = ();

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        Routine::ALL
            .iter()
            .copied()
            .find(|routine| routine.to_string() == string)
            .ok_or(())
    }
}
