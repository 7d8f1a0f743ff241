//! Representación de programas 1#.
//!
//! Existen dos niveles: las [`Instruction`] que acumula un
//! [`Builder`](crate::builder::Builder) durante la construcción, con
//! etiquetas simbólicas, y las [`Op`] de un [`Program`] ya resuelto, donde
//! cada salto lleva una distancia relativa concreta.

use std::{
    collections::BTreeMap,
    fmt::{self, Display},
    rc::Rc,
};

use crate::error::ResolveError;

/// Símbolo `1` del alfabeto de la máquina.
pub const ONE: char = '1';

/// Símbolo `#` del alfabeto de la máquina.
pub const HASH: char = '#';

/// Un registro de la máquina.
///
/// Los registros se numeran a partir de 1. El registro 0 no existe y
/// las operaciones de construcción lo rechazan.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Reg(pub u32);

impl Display for Reg {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "r{}", self.0)
    }
}

/// Una etiqueta simbólica.
///
/// Solo el builder crea etiquetas, por lo cual cada nombre es único
/// dentro de una misma sesión de construcción.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Label(Rc<str>);

impl Label {
    pub(crate) fn new(name: String) -> Self {
        Label(Rc::from(name))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Display for Label {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(self.name())
    }
}

/// Instrucción en tiempo de construcción.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    WriteOne(Reg),
    WriteHash(Reg),

    /// Ocurrencia de definición de una etiqueta. No ocupa posición.
    SetLabel(Label),

    /// Salto no resuelto a una etiqueta.
    Jump(Label),

    Case(Reg),

    /// Anotación no ejecutable.
    Comment(String),

    /// Relleno estructural, se descarta al resolver.
    Nop,
}

/// Instrucción concreta de la máquina.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Op {
    /// Agrega `1` al final de un registro.
    WriteOne(Reg),

    /// Agrega `#` al final de un registro.
    WriteHash(Reg),

    /// Avanza el contador de programa.
    Forward(u32),

    /// Retrocede el contador de programa.
    Backward(u32),

    /// Consume el primer símbolo de un registro y salta 1, 2 o 3
    /// posiciones según el registro esté vacío, inicie con `1` o con `#`.
    Case(Reg),
}

impl Op {
    /// Cantidad de `1` y de `#` que codifican a esta instrucción.
    pub fn word(self) -> (u32, u32) {
        match self {
            Op::WriteOne(Reg(reg)) => (reg, 1),
            Op::WriteHash(Reg(reg)) => (reg, 2),
            Op::Forward(distance) => (distance, 3),
            Op::Backward(distance) => (distance, 4),
            Op::Case(Reg(reg)) => (reg, 5),
        }
    }

    /// Longitud en símbolos de la codificación.
    pub fn encoded_len(self) -> usize {
        let (ones, hashes) = self.word();
        ones as usize + hashes as usize
    }
}

impl Display for Op {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (ones, hashes) = self.word();
        for _ in 0..ones {
            write!(fmt, "{}", ONE)?;
        }

        for _ in 0..hashes {
            write!(fmt, "{}", HASH)?;
        }

        Ok(())
    }
}

/// Programa resuelto.
///
/// Los comentarios se conservan aparte, indexados por la posición de la
/// instrucción que anteceden. Un índice igual a `ops.len()` corresponde
/// a comentarios al final del programa.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Program {
    pub ops: Vec<Op>,
    pub comments: BTreeMap<usize, Vec<String>>,
}

impl Program {
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Comentarios que anteceden a la instrucción en `index`.
    pub fn comments_at(&self, index: usize) -> &[String] {
        self.comments
            .get(&index)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Reconstruye un flujo de instrucciones simbólicas equivalente.
    ///
    /// Cada destino de salto recibe una etiqueta sintética `@{índice}`.
    /// Resolver el resultado produce de nuevo exactamente este programa.
    /// Falla si algún salto cae antes del inicio, después del final o
    /// sobre sí mismo, ya que ninguna etiqueta puede expresarlo.
    pub fn to_code(&self) -> Result<Vec<Instruction>, ResolveError> {
        let mut targets = BTreeMap::new();
        for (index, op) in self.ops.iter().enumerate() {
            let at = match *op {
                Op::Forward(distance) => index.checked_add(distance as usize),
                Op::Backward(distance) => index.checked_sub(distance as usize),
                _ => continue,
            };

            match at {
                Some(at) if at == index => {
                    return Err(ResolveError::SelfJump(format!("@{}", at)));
                }

                Some(at) if at <= self.ops.len() => {
                    targets
                        .entry(at)
                        .or_insert_with(|| Label::new(format!("@{}", at)));
                }

                _ => return Err(ResolveError::OutOfRange(index)),
            }
        }

        let jump = |at: usize| Instruction::Jump(targets[&at].clone());

        let mut code = Vec::new();
        for index in 0..=self.ops.len() {
            for comment in self.comments_at(index) {
                code.push(Instruction::Comment(comment.clone()));
            }

            if let Some(label) = targets.get(&index) {
                code.push(Instruction::SetLabel(label.clone()));
            }

            let op = match self.ops.get(index) {
                Some(op) => *op,
                None => break,
            };

            code.push(match op {
                Op::WriteOne(reg) => Instruction::WriteOne(reg),
                Op::WriteHash(reg) => Instruction::WriteHash(reg),
                Op::Case(reg) => Instruction::Case(reg),
                Op::Forward(distance) => jump(index + distance as usize),
                Op::Backward(distance) => jump(index - distance as usize),
            });
        }

        Ok(code)
    }
}
