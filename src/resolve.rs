//! Resolución de etiquetas.
//!
//! Convierte un flujo de construcción en un [`Program`] con distancias
//! relativas concretas. Es una función pura: el mismo flujo siempre
//! produce el mismo programa o el mismo error, nunca un resultado parcial.
//!
//! Las posiciones se cuentan en la numeración final, donde definiciones
//! de etiqueta, comentarios y `Nop` no ocupan lugar. Una etiqueta apunta
//! a la primera instrucción real que la sigue, o al final del programa si
//! no hay ninguna.

use std::collections::{hash_map::Entry, HashMap};

use tracing::debug;

use crate::{
    error::ResolveError,
    ir::{Instruction, Op, Program, Reg},
};

pub fn resolve(code: &[Instruction]) -> Result<Program, ResolveError> {
    let labels = positions(code)?;

    let mut program = Program::default();
    for instruction in code {
        let here = program.ops.len();

        let op = match instruction {
            Instruction::SetLabel(_) | Instruction::Nop => continue,

            Instruction::Comment(text) => {
                program.comments.entry(here).or_default().push(text.clone());
                continue;
            }

            Instruction::WriteOne(reg) => Op::WriteOne(check_reg(*reg)?),
            Instruction::WriteHash(reg) => Op::WriteHash(check_reg(*reg)?),
            Instruction::Case(reg) => Op::Case(check_reg(*reg)?),

            Instruction::Jump(label) => {
                let target = *labels
                    .get(label.name())
                    .ok_or_else(|| ResolveError::UnresolvedLabel(label.name().to_owned()))?;

                if target > here {
                    Op::Forward(distance(target - here))
                } else if target < here {
                    Op::Backward(distance(here - target))
                } else {
                    return Err(ResolveError::SelfJump(label.name().to_owned()));
                }
            }
        };

        program.ops.push(op);
    }

    debug!(
        instructions = program.ops.len(),
        labels = labels.len(),
        "resolved program"
    );

    Ok(program)
}

/// Primera pasada: posición final de cada etiqueta.
fn positions(code: &[Instruction]) -> Result<HashMap<&str, usize>, ResolveError> {
    let mut labels = HashMap::new();
    let mut position = 0;

    for instruction in code {
        match instruction {
            Instruction::SetLabel(label) => match labels.entry(label.name()) {
                Entry::Vacant(entry) => {
                    entry.insert(position);
                }

                Entry::Occupied(_) => {
                    return Err(ResolveError::DuplicateLabel(label.name().to_owned()))
                }
            },

            Instruction::Comment(_) | Instruction::Nop => (),
            _ => position += 1,
        }
    }

    Ok(labels)
}

fn check_reg(reg: Reg) -> Result<Reg, ResolveError> {
    match reg {
        Reg(0) => Err(ResolveError::RegisterIndex(0)),
        reg => Ok(reg),
    }
}

fn distance(offset: usize) -> u32 {
    u32::try_from(offset).expect("program too large")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        builder::{Builder, Sink},
        ir::Instruction::*,
    };

    #[test]
    fn markers_take_no_position() {
        let mut builder = Builder::new();
        let top = builder.fresh_label("top");
        let out = builder.fresh_label("out");

        builder.comment("head");
        builder.bind(&top).unwrap();
        builder.nop();
        builder.write_one(Reg(1)).unwrap();
        builder.jump(&out);
        builder.write_hash(Reg(1)).unwrap();
        builder.nop();
        builder.jump(&top);
        builder.bind(&out).unwrap();
        builder.comment("tail");

        let program = resolve(&builder.finish()).unwrap();
        assert_eq!(
            program.ops,
            vec![
                Op::WriteOne(Reg(1)),
                Op::Forward(3),
                Op::WriteHash(Reg(1)),
                Op::Backward(3),
            ]
        );

        assert_eq!(program.comments_at(0), &[String::from("head")]);
        assert_eq!(program.comments_at(4), &[String::from("tail")]);
        assert!(program.comments_at(1).is_empty());
    }

    #[test]
    fn jump_to_next_instruction_has_distance_one() {
        let mut builder = Builder::new();
        let next = builder.fresh_label("next");

        builder.jump(&next);
        builder.bind(&next).unwrap();
        builder.write_one(Reg(2)).unwrap();

        let program = resolve(&builder.finish()).unwrap();
        assert_eq!(program.ops, vec![Op::Forward(1), Op::WriteOne(Reg(2))]);
    }

    #[test]
    fn unbound_label_is_an_error() {
        let mut builder = Builder::new();
        let nowhere = builder.fresh_label("nowhere");
        builder.write_one(Reg(1)).unwrap();
        builder.jump(&nowhere);

        assert_eq!(
            resolve(&builder.finish()),
            Err(ResolveError::UnresolvedLabel(String::from("nowhere0")))
        );
    }

    #[test]
    fn self_jump_is_an_error() {
        let mut builder = Builder::new();
        let spin = builder.fresh_label("spin");
        builder.bind(&spin).unwrap();
        builder.jump(&spin);

        assert_eq!(
            resolve(&builder.finish()),
            Err(ResolveError::SelfJump(String::from("spin0")))
        );
    }

    #[test]
    fn hand_assembled_duplicates_are_caught() {
        let mut builder = Builder::new();
        let label = builder.fresh_label("twice");

        let code = vec![
            SetLabel(label.clone()),
            WriteOne(Reg(1)),
            SetLabel(label.clone()),
            Jump(label),
        ];

        assert_eq!(
            resolve(&code),
            Err(ResolveError::DuplicateLabel(String::from("twice0")))
        );
    }

    #[test]
    fn hand_assembled_register_zero_is_caught() {
        assert_eq!(
            resolve(&[WriteHash(Reg(0))]),
            Err(ResolveError::RegisterIndex(0))
        );
    }
}
